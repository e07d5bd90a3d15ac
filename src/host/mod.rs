//! Tool hosting: the capability every tool implements, the registry of
//! available tools, and the worker that runs one of them.

mod registry;
mod runner;

pub use registry::{find_tool, Field, ToolEntry, TOOLS};
pub use runner::{run_tool, RunReport};

use crate::config::ToolConfig;
use tokio::sync::mpsc;

/// A batch tool the host can run.
///
/// Implementations carry their own request (paths, frame lists, scene ids)
/// and read shared settings from the config lent to them for the run.
pub trait Tool: Send + 'static {
    /// Static description of this tool.
    fn entry(&self) -> &'static ToolEntry;

    /// Run to completion on the calling thread, returning a one-line summary.
    fn execute(&self, config: &ToolConfig, log: &LogSink) -> tbtools_common::Result<String>;

    fn name(&self) -> &'static str {
        self.entry().name
    }
}

/// Forwards run log lines from the worker to the host, in order.
#[derive(Debug, Clone)]
pub struct LogSink {
    tx: mpsc::UnboundedSender<String>,
}

impl LogSink {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn line(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        tracing::trace!(target: "tbtools::run", "{}", line);
        // The host only stops listening once the worker is done.
        let _ = self.tx.send(line.to_string());
    }
}
