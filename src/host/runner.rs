use super::{LogSink, Tool};
use crate::config::ToolConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

/// How a run ended.
#[derive(Debug)]
pub struct RunReport {
    pub tool: &'static str,
    pub outcome: tbtools_common::Result<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run a tool on a blocking worker, handing each log line to `on_line` as it
/// arrives.
///
/// The tool's own failure is part of the report; the outer error is only for
/// the host failing (runtime start-up, worker panic).
pub fn run_tool(
    tool: Box<dyn Tool>,
    config: Arc<ToolConfig>,
    mut on_line: impl FnMut(&str),
) -> Result<RunReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async move {
        let name = tool.name();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tracing::info!("Running {}", name);
        let worker = tokio::task::spawn_blocking(move || {
            let sink = LogSink::new(tx);
            tool.execute(&config, &sink)
        });

        // Closes once the worker drops its sink.
        while let Some(line) = rx.recv().await {
            on_line(&line);
        }

        let outcome = worker
            .await
            .with_context(|| format!("{} worker panicked", name))?;

        match &outcome {
            Ok(summary) => tracing::info!("{} finished: {}", name, summary),
            Err(e) => tracing::error!("{} failed: {}", name, e),
        }

        Ok(RunReport {
            tool: name,
            outcome,
        })
    })
}
