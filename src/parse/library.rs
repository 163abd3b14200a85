//! Projection of structured connection-table entries.

use std::net::IpAddr;

use crate::model::{Protocol, SocketRecord};

/// Connection state as reported by the enumeration library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Listen,
    /// Any other TCP state.
    Other,
    /// No state, as for datagram sockets.
    None,
}

/// Socket type as reported by the enumeration library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Stream,
    Datagram,
    /// The source cannot tell stream from datagram sockets.
    #[allow(dead_code)]
    Unknown,
}

/// One raw entry from a connection enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub local_addr: Option<IpAddr>,
    pub local_port: u16,
    pub state: ConnectionState,
    pub pid: Option<u32>,
    pub kind: SocketKind,
    pub process_name: Option<String>,
}

impl ConnectionEntry {
    /// Listening stream sockets and all datagram sockets count as bound.
    fn is_bound(&self) -> bool {
        self.state == ConnectionState::Listen || self.kind == SocketKind::Datagram
    }

    /// Falls back to TCP when the library gives no socket type.
    fn protocol(&self) -> Protocol {
        match self.kind {
            SocketKind::Datagram => Protocol::Udp,
            SocketKind::Stream | SocketKind::Unknown => Protocol::Tcp,
        }
    }
}

/// Keeps bound sockets with a local address and converts them.
pub fn parse_entries(entries: &[ConnectionEntry]) -> Vec<SocketRecord> {
    entries
        .iter()
        .filter(|e| e.is_bound())
        .filter_map(|e| {
            let addr = e.local_addr?;
            Some(
                SocketRecord::new(addr.to_string(), e.local_port, e.protocol())
                    .with_pid(e.pid)
                    .with_process(e.process_name.clone()),
            )
        })
        .collect()
}
