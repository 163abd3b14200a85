//! Parser for Windows `netstat -ano` output.
//!
//! ```text
//! Active Connections
//!
//!   Proto  Local Address          Foreign Address        State           PID
//!   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       980
//!   TCP    [::]:445               [::]:0                 LISTENING       4
//!   UDP    0.0.0.0:500            *:*                                    4321
//! ```

use log::trace;

use super::split_endpoint;
use crate::model::{Protocol, SocketRecord};

/// UDP rows have no state column.
const MIN_FIELDS: usize = 4;

const HEADER_KEYWORDS: [&str; 2] = ["Proto", "Active"];

/// Parses netstat output; TCP and UDP rows are interleaved.
pub fn parse_output(output: &str) -> Vec<SocketRecord> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !HEADER_KEYWORDS.iter().any(|kw| line.starts_with(*kw)))
        .filter(|line| line.contains("LISTENING") || line.contains("UDP"))
        .filter_map(|line| {
            let record = parse_line(line);
            if record.is_none() {
                trace!("netstat: skipping line {line:?}");
            }
            record
        })
        .collect()
}

fn parse_line(line: &str) -> Option<SocketRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    let protocol = Protocol::from_token(parts.first()?)?;
    let (address, port) = split_endpoint(parts.get(1)?)?;
    let pid = parts.last().and_then(|p| p.parse::<u32>().ok());

    Some(SocketRecord::new(address, port, protocol).with_pid(pid))
}
