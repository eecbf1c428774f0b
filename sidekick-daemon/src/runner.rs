//! Event loop -- reads Falco events line by line and dispatches them.
//!
//! The [`Runner`] owns the [`Dispatcher`] built from configuration.
//! Each non-blank input line is parsed as one Falco JSON event; a line
//! that is not UTF-8 or fails to parse is logged and skipped without
//! stopping the loop.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use sidekick_core::config::SidekickConfig;
use sidekick_core::error::EventError;
use sidekick_core::metrics as m;
use sidekick_core::FalcoEvent;
use sidekick_outputs::{DispatchReport, Dispatcher};

use crate::metrics_server;

/// Counts of lines handled by [`Runner::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events parsed and dispatched.
    pub received: u64,
    /// Lines that were not valid Falco events.
    pub rejected: u64,
}

/// Reads events and fans them out to the enabled outputs.
#[derive(Debug)]
pub struct Runner {
    dispatcher: Arc<Dispatcher>,
}

impl Runner {
    /// Build from an already-loaded configuration.
    ///
    /// Installs the Prometheus recorder when `[metrics]` is enabled.
    ///
    /// # Errors
    ///
    /// - Configuration validation fails
    /// - The metrics recorder cannot be installed
    /// - The shared HTTP client cannot be built
    ///
    /// An output with an invalid address is disabled on its own and listed
    /// in [`Dispatcher::rejected`].
    pub fn build_from_config(config: &SidekickConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let dispatcher = Dispatcher::from_config(config)
            .map_err(|e| anyhow::anyhow!("failed to build outputs: {}", e))?;

        let outputs: Vec<_> = dispatcher.outputs().map(|k| k.as_str()).collect();
        if outputs.is_empty() {
            tracing::warn!("no outputs enabled, events will only be logged");
        }
        tracing::info!(
            outputs = ?outputs,
            rejected = dispatcher.rejected().len(),
            "runner initialized"
        );

        Ok(Self::from_dispatcher(dispatcher))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Parse one line and dispatch the event.
    pub async fn handle_line(&self, line: &str) -> Result<Vec<DispatchReport>, EventError> {
        let event = FalcoEvent::from_json(line.as_bytes())?;
        metrics::counter!(m::EVENTS_RECEIVED_TOTAL).increment(1);
        tracing::debug!(rule = %event.rule, priority = %event.priority, "event received");

        let reports = self.dispatcher.dispatch(Arc::new(event)).await;
        for report in &reports {
            if let Some(err) = &report.outcome.error {
                tracing::warn!(
                    output = %report.output,
                    kind = err.kind_str(),
                    error = %err,
                    "delivery failed"
                );
            }
        }
        Ok(reports)
    }

    /// Read events until end of input.
    ///
    /// # Errors
    ///
    /// Only reading from `input` can fail; parse and delivery failures are
    /// logged and counted.
    pub async fn run<R>(&self, mut input: R) -> Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    summary.rejected += 1;
                    tracing::warn!(error = %e, "input line is not valid UTF-8, skipping");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match self.handle_line(line).await {
                Ok(_) => summary.received += 1,
                Err(e) => {
                    summary.rejected += 1;
                    tracing::warn!(error = %e, "invalid event, skipping");
                }
            }
        }

        tracing::info!(
            received = summary.received,
            rejected = summary.rejected,
            "input closed"
        );
        Ok(summary)
    }

    /// Log the per-output counters.
    pub fn log_statistics(&self) {
        for (output, snapshot) in self.dispatcher.statistics().snapshot() {
            tracing::info!(
                output = %output,
                total = snapshot.total,
                sent = snapshot.sent,
                error = snapshot.error,
                "output statistics"
            );
        }
    }
}
