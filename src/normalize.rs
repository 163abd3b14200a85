//! Deduplication and ordering of discovered sockets.

use std::collections::HashSet;

use crate::model::{Protocol, SocketRecord};

/// Drops repeated sockets and sorts the rest.
///
/// Two records are the same socket when protocol, address, port and pid
/// agree; the first one seen is kept with its process and user fields. The
/// result is ordered by protocol, address, port, then pid compared as text
/// with unknown pids first.
pub fn normalize(records: Vec<SocketRecord>) -> Vec<SocketRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<SocketRecord> = records
        .into_iter()
        .filter(|r| seen.insert(identity_key(r)))
        .collect();

    unique.sort_by_cached_key(|r| (r.protocol, r.address.clone(), r.port, r.pid_text()));
    unique
}

fn identity_key(record: &SocketRecord) -> (Protocol, String, u16, Option<u32>) {
    let (protocol, address, port, pid) = record.identity();
    (protocol, address.to_string(), port, pid)
}
