//! Parser for `ss -ltnup` output.
//!
//! ```text
//! Netid State  Recv-Q Send-Q Local Address:Port Peer Address:Port Process
//! udp   UNCONN 0      0      0.0.0.0:68         0.0.0.0:*
//! tcp   LISTEN 0      128    [::]:22            [::]:*
//! ```
//!
//! Owner details in the trailing `users:((...))` column are not extracted.

use log::trace;

use super::split_endpoint;
use crate::model::{Protocol, SocketRecord};

/// Parses ss output covering both TCP and UDP sockets.
pub fn parse_output(output: &str) -> Vec<SocketRecord> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<SocketRecord> {
    let protocol = if line.contains("LISTEN") {
        Protocol::Tcp
    } else if line.contains("UNCONN") {
        Protocol::Udp
    } else {
        return None;
    };

    let local = line
        .split_whitespace()
        .find(|field| field.contains(':') && !field.ends_with(":*"));

    let record = local
        .and_then(split_endpoint)
        .map(|(address, port)| SocketRecord::new(address, port, protocol));
    if record.is_none() {
        trace!("ss: skipping line {line:?}");
    }
    record
}
