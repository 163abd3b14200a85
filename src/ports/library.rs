//! Library-backed connection enumeration.

use std::collections::HashMap;

use log::debug;
use netstat2::{get_sockets_info, AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, TcpState};

use crate::error::StrategyError;
use crate::parse::library::{ConnectionEntry, ConnectionState, SocketKind};

/// Something that can list the host's sockets without running a tool.
pub trait ConnectionSource {
    fn connections(&self) -> Result<Vec<ConnectionEntry>, StrategyError>;
}

/// Reads the socket table through the `netstat2` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Netstat2Source;

impl ConnectionSource for Netstat2Source {
    fn connections(&self) -> Result<Vec<ConnectionEntry>, StrategyError> {
        let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let proto_flags = ProtocolFlags::TCP | ProtocolFlags::UDP;
        let sockets = get_sockets_info(af_flags, proto_flags)
            .map_err(|e| StrategyError::Library(e.to_string()))?;
        debug!("netstat2 returned {} sockets", sockets.len());

        let mut names: HashMap<u32, Option<String>> = HashMap::new();
        let mut entries = Vec::with_capacity(sockets.len());

        for socket in sockets {
            let (local_addr, local_port, state, kind) = match socket.protocol_socket_info {
                ProtocolSocketInfo::Tcp(tcp) => {
                    let state = if tcp.state == TcpState::Listen {
                        ConnectionState::Listen
                    } else {
                        ConnectionState::Other
                    };
                    (tcp.local_addr, tcp.local_port, state, SocketKind::Stream)
                }
                ProtocolSocketInfo::Udp(udp) => (
                    udp.local_addr,
                    udp.local_port,
                    ConnectionState::None,
                    SocketKind::Datagram,
                ),
            };

            let entry = ConnectionEntry {
                local_addr: Some(local_addr),
                local_port,
                state,
                pid: None,
                kind,
                process_name: None,
            };

            if socket.associated_pids.is_empty() {
                entries.push(entry);
                continue;
            }

            for pid in socket.associated_pids {
                let process_name = names.entry(pid).or_insert_with(|| process_name(pid)).clone();
                entries.push(ConnectionEntry {
                    pid: Some(pid),
                    process_name,
                    ..entry.clone()
                });
            }
        }

        Ok(entries)
    }
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn process_name(pid: u32) -> Option<String> {
    let pid = i32::try_from(pid).ok()?;
    libproc::proc_pid::name(pid).ok().filter(|name| !name.is_empty())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn process_name(_pid: u32) -> Option<String> {
    None
}
