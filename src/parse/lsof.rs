//! Parser for `lsof -nP -i...` output.
//!
//! ```text
//! COMMAND   PID USER   FD   TYPE  DEVICE SIZE/OFF NODE NAME
//! nginx     123 root    6u  IPv4  0x1234      0t0  TCP *:80 (LISTEN)
//! mDNSRespo 456 _mdns  10u  IPv6  0x5678      0t0  UDP [::1]:5353
//! ```

use log::trace;

use super::split_endpoint;
use crate::model::{Protocol, SocketRecord};

/// Columns in the header; shorter data lines are truncated or foreign.
const MIN_FIELDS: usize = 9;

/// Parses lsof output for one protocol.
///
/// `protocol` comes from how lsof was invoked since the per-line TYPE and NODE
/// columns are not consulted.
pub fn parse_output(output: &str, protocol: Protocol) -> Vec<SocketRecord> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let record = parse_line(line, protocol);
            if record.is_none() && !line.trim().is_empty() {
                trace!("lsof: skipping line {line:?}");
            }
            record
        })
        .collect()
}

fn parse_line(line: &str, protocol: Protocol) -> Option<SocketRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let command = parts.first()?;
    let pid = parts.get(1).and_then(|p| p.parse::<u32>().ok());
    let user = parts.get(2)?;

    // NAME may be followed by a state such as "(LISTEN)".
    let name = parts
        .iter()
        .rev()
        .find(|p| !(p.starts_with('(') && p.ends_with(')')))?;
    // Connected sockets read "local->remote".
    let local = name.split_once("->").map_or(*name, |(local, _remote)| local);

    let (address, port) = split_endpoint(local)?;

    Some(
        SocketRecord::new(address, port, protocol)
            .with_pid(pid)
            .with_process(Some((*command).to_string()))
            .with_user(Some((*user).to_string())),
    )
}
