//! Simulated handler configuration.

use std::time::Duration;

use clap::Args;
use scholia_core::mock::SimulatedHandler;

/// Settings for the simulated per-chunk handler.
#[derive(Debug, Clone, Args)]
pub struct HandlerArgs {
    /// Artificial latency per chunk, in milliseconds.
    #[arg(long = "latency-ms", env = "HANDLER_LATENCY_MS", default_value_t = 0)]
    pub latency_ms: u64,

    /// Chunk index to fail on purpose. Repeatable.
    #[arg(long = "fail-chunk", value_name = "INDEX")]
    pub fail_chunk: Vec<usize>,
}

impl HandlerArgs {
    /// Builds the configured handler.
    pub fn build(&self) -> SimulatedHandler {
        SimulatedHandler::new()
            .with_latency(Duration::from_millis(self.latency_ms))
            .with_failures(self.fail_chunk.iter().copied())
    }
}
