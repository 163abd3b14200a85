//! Data model for discovered sockets.
//!
//! Every discovery source, whether a text parser or the connection library,
//! produces [`SocketRecord`]s so nothing downstream has to care where a socket
//! was found.

use std::fmt;

use serde::Serialize;

/// Transport protocol of a bound socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Lowercase name, as used in output and for ordering.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    /// Parses a protocol column such as `TCP` or `udp`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "tcp" => Some(Protocol::Tcp),
            "udp" => Some(Protocol::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IP family of a bound address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Infers the family from the textual shape of an IP token.
    ///
    /// A token with a `:` and no `.` is IPv6; anything else (including the
    /// `*` wildcard) is IPv4. IPv4-mapped forms like `::ffff:10.0.0.1`
    /// therefore count as IPv4.
    pub fn of(ip: &str) -> Self {
        if ip.contains(':') && !ip.contains('.') {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Ipv4
        }
    }

    /// The "all interfaces" literal for this family.
    pub fn wildcard(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "0.0.0.0",
            AddressFamily::Ipv6 => "::",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("ipv4"),
            AddressFamily::Ipv6 => f.write_str("ipv6"),
        }
    }
}

/// A bound socket in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketRecord {
    /// IP literal without brackets; wildcards already normalised.
    pub address: String,
    pub port: u16,
    pub protocol: Protocol,
    pub owner_pid: Option<u32>,
    pub process_name: Option<String>,
    pub user: Option<String>,
    /// Always derived from `address`.
    pub address_family: AddressFamily,
}

impl SocketRecord {
    /// Creates a record with no owner information.
    pub fn new(address: impl Into<String>, port: u16, protocol: Protocol) -> Self {
        let address = address.into();
        let address_family = AddressFamily::of(&address);
        Self {
            address,
            port,
            protocol,
            owner_pid: None,
            process_name: None,
            user: None,
            address_family,
        }
    }

    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        self.owner_pid = pid;
        self
    }

    pub fn with_process(mut self, name: Option<String>) -> Self {
        self.process_name = name;
        self
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    /// The tuple that identifies one socket across duplicate sightings.
    pub fn identity(&self) -> (Protocol, &str, u16, Option<u32>) {
        (self.protocol, &self.address, self.port, self.owner_pid)
    }

    /// Owner pid rendered as text; empty when unknown.
    pub fn pid_text(&self) -> String {
        self.owner_pid.map(|p| p.to_string()).unwrap_or_default()
    }
}
