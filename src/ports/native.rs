//! Discovery through the platform's own command-line tools.

use log::debug;

use crate::error::StrategyError;
use crate::model::{Protocol, SocketRecord};
use crate::parse::{lsof, netstat, ss};
use crate::runner::CommandRunner;

const LSOF_TCP_ARGS: &[&str] = &["-nP", "-iTCP", "-sTCP:LISTEN"];
const LSOF_UDP_ARGS: &[&str] = &["-nP", "-iUDP"];

/// Runs diagnostic tools, optionally through an elevation helper.
pub struct NativeTools<'a> {
    runner: &'a dyn CommandRunner,
    elevation: Option<Vec<String>>,
}

impl<'a> NativeTools<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            elevation: None,
        }
    }

    /// Prefixes every invocation with `helper` (e.g. `["sudo"]`).
    ///
    /// An empty helper leaves invocations unchanged.
    pub fn with_elevation(mut self, helper: Vec<String>) -> Self {
        self.elevation = (!helper.is_empty()).then_some(helper);
        self
    }

    /// `lsof`, once for listening TCP and once for UDP.
    pub fn lsof(&self) -> Result<Vec<SocketRecord>, StrategyError> {
        self.ensure_exists("lsof")?;

        let mut records = Vec::new();
        for (protocol, args) in [(Protocol::Tcp, LSOF_TCP_ARGS), (Protocol::Udp, LSOF_UDP_ARGS)] {
            match self.invoke("lsof", args) {
                Ok(stdout) => records.extend(lsof::parse_output(&stdout, protocol)),
                Err(e) => debug!("lsof {protocol} pass produced nothing: {e}"),
            }
        }
        Ok(records)
    }

    /// `ss -ltnup`. There is no fallback when it is missing or fails.
    pub fn ss(&self) -> Result<Vec<SocketRecord>, StrategyError> {
        self.ensure_exists("ss")?;
        let stdout = self.invoke("ss", &["-ltnup"])?;
        Ok(ss::parse_output(&stdout))
    }

    /// `netstat -ano`, which lists TCP and UDP together.
    pub fn netstat(&self) -> Result<Vec<SocketRecord>, StrategyError> {
        self.ensure_exists("netstat")?;
        let stdout = self.invoke("netstat", &["-ano"])?;
        Ok(netstat::parse_output(&stdout))
    }

    fn ensure_exists(&self, tool: &str) -> Result<(), StrategyError> {
        if self.runner.exists(tool) {
            Ok(())
        } else {
            Err(StrategyError::ToolUnavailable(tool.to_string()))
        }
    }

    fn invoke(&self, tool: &str, args: &[&str]) -> Result<String, StrategyError> {
        let tool_args = args.iter().map(|a| (*a).to_string());

        let helper = self
            .elevation
            .as_deref()
            .and_then(<[String]>::split_first)
            .filter(|(helper, _)| {
                let found = self.runner.exists(helper);
                if !found {
                    debug!("elevation helper {helper} not found, running {tool} directly");
                }
                found
            });

        let output = match helper {
            Some((helper, helper_args)) => {
                let argv: Vec<String> = helper_args
                    .iter()
                    .cloned()
                    .chain(std::iter::once(tool.to_string()))
                    .chain(tool_args)
                    .collect();
                self.runner.run(helper, &argv)
            }
            None => self.runner.run(tool, &tool_args.collect::<Vec<_>>()),
        };

        if output.success() {
            Ok(output.stdout)
        } else {
            debug!("{tool} stderr: {}", output.stderr.trim());
            Err(StrategyError::ToolFailed {
                tool: tool.to_string(),
                code: output.code,
            })
        }
    }
}
