//! Socket discovery.
//!
//! Tries the connection library first and, only when it finds nothing, falls
//! back to one family of native tools picked by platform:
//!
//! - **Apple**: `lsof`, one pass for TCP listeners and one for UDP
//! - **Linux**: `ss`; when it is missing or fails nothing else is tried
//! - **anything else**: `netstat -ano`
//!
//! Every failure along the way counts as "no sockets from this source".

mod library;
mod native;

use library::{ConnectionSource, Netstat2Source};
use native::NativeTools;

use log::debug;

use crate::error::StrategyError;
use crate::model::SocketRecord;
use crate::normalize::normalize;
use crate::parse;
use crate::runner::{CommandRunner, SystemRunner};

/// Platform families that decide which native tool is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Apple,
    Linux,
    Other(String),
}

impl Platform {
    /// Classifies an OS identifier such as `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "ios" => Platform::Apple,
            "linux" | "android" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }
}

/// Progress of a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    NotStarted,
    TryingLibrary,
    TryingNativeTools,
    Done,
}

/// One-shot discovery run over injected capabilities.
pub struct Discovery<'a> {
    platform: Platform,
    source: &'a dyn ConnectionSource,
    tools: NativeTools<'a>,
    state: DiscoveryState,
}

impl<'a> Discovery<'a> {
    pub fn new(
        platform: Platform,
        source: &'a dyn ConnectionSource,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            platform,
            source,
            tools: NativeTools::new(runner),
            state: DiscoveryState::NotStarted,
        }
    }

    /// Runs native tools through `helper` (e.g. `["sudo"]`).
    ///
    /// Only Apple and Linux hosts elevate; `netstat` elsewhere runs as is.
    pub fn with_elevation(mut self, helper: Vec<String>) -> Self {
        if let Platform::Other(os) = &self.platform {
            debug!("no elevation on {os}");
            return self;
        }
        self.tools = self.tools.with_elevation(helper);
        self
    }

    /// Runs the strategy chain and returns the deduplicated, sorted sockets.
    pub fn run(mut self) -> Vec<SocketRecord> {
        self.advance(DiscoveryState::TryingLibrary);
        let records = absorb(
            "library",
            self.source
                .connections()
                .map(|entries| parse::library::parse_entries(&entries)),
        );

        if !records.is_empty() {
            self.advance(DiscoveryState::Done);
            return normalize(records);
        }

        self.advance(DiscoveryState::TryingNativeTools);
        let (name, result) = match &self.platform {
            Platform::Apple => ("lsof", self.tools.lsof()),
            Platform::Linux => ("ss", self.tools.ss()),
            Platform::Other(_) => ("netstat", self.tools.netstat()),
        };
        let records = absorb(name, result);

        self.advance(DiscoveryState::Done);
        normalize(records)
    }

    fn advance(&mut self, next: DiscoveryState) {
        debug!("discovery: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn absorb(strategy: &str, result: Result<Vec<SocketRecord>, StrategyError>) -> Vec<SocketRecord> {
    match result {
        Ok(records) => {
            debug!("{strategy}: {} candidate sockets", records.len());
            records
        }
        Err(e) => {
            debug!("{strategy}: {e}");
            Vec::new()
        }
    }
}

/// Lists bound sockets on this host.
///
/// `elevation` is the helper command to run native tools through, if any.
pub fn get_listening_sockets(elevation: Option<Vec<String>>) -> Vec<SocketRecord> {
    let runner = SystemRunner;
    let source = Netstat2Source;
    let discovery = Discovery::new(Platform::current(), &source, &runner);
    match elevation {
        Some(helper) => discovery.with_elevation(helper).run(),
        None => discovery.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::model::Protocol;
    use crate::parse::library::{ConnectionEntry, ConnectionState, SocketKind};
    use crate::runner::CommandOutput;

    /// Runner that serves canned output and records every call.
    #[derive(Default)]
    struct FakeRunner {
        installed: Vec<&'static str>,
        outputs: HashMap<String, CommandOutput>,
        probes: RefCell<Vec<String>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn with_tool(mut self, tool: &'static str) -> Self {
            self.installed.push(tool);
            self
        }

        fn with_output(mut self, command_line: &str, code: i32, stdout: &str) -> Self {
            self.outputs.insert(
                command_line.to_string(),
                CommandOutput {
                    code: Some(code),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                },
            );
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn exists(&self, program: &str) -> bool {
            self.probes.borrow_mut().push(program.to_string());
            self.installed.iter().any(|tool| *tool == program)
        }

        fn run(&self, program: &str, args: &[String]) -> CommandOutput {
            let line = std::iter::once(program.to_string())
                .chain(args.iter().cloned())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.borrow_mut().push(line.clone());
            self.outputs.get(&line).cloned().unwrap_or(CommandOutput {
                code: None,
                stdout: String::new(),
                stderr: "not scripted".to_string(),
            })
        }
    }

    enum FakeSource {
        Entries(Vec<ConnectionEntry>),
        Failing,
    }

    impl ConnectionSource for FakeSource {
        fn connections(&self) -> Result<Vec<ConnectionEntry>, StrategyError> {
            match self {
                FakeSource::Entries(entries) => Ok(entries.clone()),
                FakeSource::Failing => Err(StrategyError::Library("permission denied".to_string())),
            }
        }
    }

    fn postgres_listener() -> ConnectionEntry {
        ConnectionEntry {
            local_addr: Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            local_port: 5432,
            state: ConnectionState::Listen,
            pid: Some(77),
            kind: SocketKind::Stream,
            process_name: Some("postgres".to_string()),
        }
    }

    const LSOF_TCP: &str = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\n\
                            nginx 123 root 6u IPv4 0x1 0t0 TCP *:80 (LISTEN)\n\
                            nginx 123 root 7u IPv4 0x2 0t0 TCP *:80 (LISTEN)";
    const LSOF_UDP: &str = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\n\
                            mDNSRespo 200 _mdns 9u IPv4 0x3 0t0 UDP *:5353";

    #[test]
    fn test_library_result_skips_native_tools() {
        let runner = FakeRunner::default()
            .with_tool("lsof")
            .with_tool("ss")
            .with_tool("netstat");
        let source = FakeSource::Entries(vec![postgres_listener()]);

        let records = Discovery::new(Platform::Linux, &source, &runner).run();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "127.0.0.1");
        assert_eq!(records[0].port, 5432);
        assert_eq!(records[0].owner_pid, Some(77));
        assert!(runner.calls().is_empty());
        assert!(runner.probes.borrow().is_empty());
    }

    #[test]
    fn test_nothing_available_yields_empty() {
        for platform in [
            Platform::Apple,
            Platform::Linux,
            Platform::Other("windows".to_string()),
        ] {
            let runner = FakeRunner::default();
            let records = Discovery::new(platform, &FakeSource::Failing, &runner).run();
            assert!(records.is_empty());
            assert!(runner.calls().is_empty());
        }
    }

    #[test]
    fn test_apple_runs_lsof_per_protocol() {
        let runner = FakeRunner::default()
            .with_tool("lsof")
            .with_output("lsof -nP -iTCP -sTCP:LISTEN", 0, LSOF_TCP)
            .with_output("lsof -nP -iUDP", 0, LSOF_UDP);

        let records = Discovery::new(Platform::Apple, &FakeSource::Failing, &runner).run();

        assert_eq!(
            runner.calls(),
            vec!["lsof -nP -iTCP -sTCP:LISTEN", "lsof -nP -iUDP"]
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].protocol, Protocol::Tcp);
        assert_eq!(records[0].port, 80);
        assert_eq!(records[1].protocol, Protocol::Udp);
        assert_eq!(records[1].port, 5353);
    }

    #[test]
    fn test_apple_keeps_tcp_when_udp_pass_fails() {
        let runner = FakeRunner::default()
            .with_tool("lsof")
            .with_output("lsof -nP -iTCP -sTCP:LISTEN", 0, LSOF_TCP)
            .with_output("lsof -nP -iUDP", 1, "");

        let records = Discovery::new(Platform::Apple, &FakeSource::Failing, &runner).run();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].protocol, Protocol::Tcp);
    }

    #[test]
    fn test_empty_library_falls_through() {
        let runner = FakeRunner::default().with_tool("ss").with_output(
            "ss -ltnup",
            0,
            "udp   UNCONN 0  0  0.0.0.0:68  0.0.0.0:*",
        );
        let source = FakeSource::Entries(vec![ConnectionEntry {
            state: ConnectionState::Other,
            ..postgres_listener()
        }]);

        let records = Discovery::new(Platform::Linux, &source, &runner).run();
        assert_eq!(runner.calls(), vec!["ss -ltnup"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].port, 68);
        assert_eq!(records[0].protocol, Protocol::Udp);
    }

    #[test]
    fn test_linux_ss_failure_has_no_fallback() {
        let runner = FakeRunner::default()
            .with_tool("ss")
            .with_tool("netstat")
            .with_output("ss -ltnup", 1, "tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:*");

        let records = Discovery::new(Platform::Linux, &FakeSource::Failing, &runner).run();
        assert!(records.is_empty());
        assert_eq!(runner.calls(), vec!["ss -ltnup"]);
    }

    #[test]
    fn test_other_platform_uses_netstat() {
        let runner = FakeRunner::default().with_tool("netstat").with_output(
            "netstat -ano",
            0,
            "  Proto  Local Address  Foreign Address  State  PID\n\
               UDP    0.0.0.0:500    *:*                   4321\n\
               TCP    0.0.0.0:135    0.0.0.0:0  LISTENING  980\n",
        );

        let records = Discovery::new(
            Platform::Other("windows".to_string()),
            &FakeSource::Failing,
            &runner,
        )
        .run();

        assert_eq!(runner.calls(), vec!["netstat -ano"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].protocol, Protocol::Tcp);
        assert_eq!(records[0].owner_pid, Some(980));
        assert_eq!(records[1].protocol, Protocol::Udp);
    }

    #[test]
    fn test_elevation_prefixes_native_tools() {
        let runner = FakeRunner::default()
            .with_tool("ss")
            .with_tool("sudo")
            .with_output("sudo -n ss -ltnup", 0, "tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:*");

        let records = Discovery::new(Platform::Linux, &FakeSource::Failing, &runner)
            .with_elevation(vec!["sudo".to_string(), "-n".to_string()])
            .run();

        assert_eq!(runner.calls(), vec!["sudo -n ss -ltnup"]);
        assert_eq!(runner.probes.borrow().as_slice(), ["ss", "sudo"]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_helper_runs_tool_directly() {
        let runner = FakeRunner::default().with_tool("ss").with_output(
            "ss -ltnup",
            0,
            "tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:*",
        );

        let records = Discovery::new(Platform::Linux, &FakeSource::Failing, &runner)
            .with_elevation(vec!["sudo".to_string()])
            .run();

        assert_eq!(runner.calls(), vec!["ss -ltnup"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].port, 22);
    }

    #[test]
    fn test_other_platform_ignores_elevation() {
        let runner = FakeRunner::default()
            .with_tool("netstat")
            .with_tool("sudo")
            .with_output(
                "netstat -ano",
                0,
                "  TCP    0.0.0.0:135    0.0.0.0:0  LISTENING  980\n",
            );

        let records = Discovery::new(
            Platform::Other("windows".to_string()),
            &FakeSource::Failing,
            &runner,
        )
        .with_elevation(vec!["sudo".to_string()])
        .run();

        assert_eq!(runner.calls(), vec!["netstat -ano"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner_pid, Some(980));
    }

    #[test]
    fn test_library_results_are_normalized() {
        let mut udp = postgres_listener();
        udp.kind = SocketKind::Datagram;
        udp.state = ConnectionState::None;
        udp.local_port = 53;
        let source = FakeSource::Entries(vec![udp, postgres_listener(), postgres_listener()]);
        let runner = FakeRunner::default();

        let records = Discovery::new(Platform::Apple, &source, &runner).run();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].protocol, Protocol::Tcp);
        assert_eq!(records[1].protocol, Protocol::Udp);
    }

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Platform::Apple);
        assert_eq!(Platform::from_os("Darwin"), Platform::Apple);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(
            Platform::from_os("windows"),
            Platform::Other("windows".to_string())
        );
    }
}
