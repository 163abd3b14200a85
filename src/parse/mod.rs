//! Parsers that project each discovery source into [`SocketRecord`]s.
//!
//! All parsers are pure and skip lines they cannot understand instead of
//! failing the whole batch.
//!
//! [`SocketRecord`]: crate::model::SocketRecord

pub mod library;
pub mod lsof;
pub mod netstat;
pub mod ss;

use crate::model::AddressFamily;

/// Splits an `ADDR:PORT` endpoint into a normalised IP literal and port.
///
/// Accepts `1.2.3.4:80`, `[::1]:80`, `:::80`, `*:80` and scoped forms such as
/// `127.0.0.53%lo:53`. The `*` wildcard becomes the all-interfaces literal for
/// the family inferred from the token itself. Returns `None` when there is no
/// separator, the port is not a number, or the address part is empty.
pub fn split_endpoint(endpoint: &str) -> Option<(String, u16)> {
    let (ip, port) = endpoint.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;

    let ip = ip.trim_start_matches('[').trim_end_matches(']');
    let ip = ip.split_once('%').map_or(ip, |(base, _scope)| base);
    if ip.is_empty() {
        return None;
    }

    if ip == "*" {
        return Some((AddressFamily::of(ip).wildcard().to_string(), port));
    }
    Some((ip.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ipv4() {
        assert_eq!(
            split_endpoint("127.0.0.1:5432"),
            Some(("127.0.0.1".to_string(), 5432))
        );
    }

    #[test]
    fn test_split_bracketed_ipv6() {
        assert_eq!(split_endpoint("[::1]:8000"), Some(("::1".to_string(), 8000)));
        assert_eq!(split_endpoint("[::]:22"), Some(("::".to_string(), 22)));
    }

    #[test]
    fn test_split_bare_ipv6() {
        assert_eq!(split_endpoint(":::80"), Some(("::".to_string(), 80)));
    }

    #[test]
    fn test_split_wildcard() {
        assert_eq!(split_endpoint("*:7000"), Some(("0.0.0.0".to_string(), 7000)));
    }

    #[test]
    fn test_split_strips_scope() {
        assert_eq!(
            split_endpoint("127.0.0.53%lo:53"),
            Some(("127.0.0.53".to_string(), 53))
        );
        assert_eq!(
            split_endpoint("[fe80::1%en0]:5353"),
            Some(("fe80::1".to_string(), 5353))
        );
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert_eq!(split_endpoint("no-separator"), None);
        assert_eq!(split_endpoint("*:*"), None);
        assert_eq!(split_endpoint("10.0.0.1:http"), None);
        assert_eq!(split_endpoint("10.0.0.1:70000"), None);
        assert_eq!(split_endpoint(":80"), None);
    }
}
