//! CLI configuration management.
//!
//! ```text
//! Cli
//! └── command
//!     ├── estimate: InputArgs + PipelineConfig
//!     ├── chunk:    InputArgs + PipelineConfig (+ --content)
//!     └── process:  InputArgs + PipelineConfig + HandlerArgs
//! ```
//!
//! All pipeline options can be provided via CLI arguments or environment
//! variables. Use `--help` on a subcommand to see them.

mod handler;
mod input;

use std::process;

use clap::{Parser, Subcommand};
pub use handler::HandlerArgs;
pub use input::InputArgs;
use scholia_worker::PipelineConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "scholia")]
#[command(about = "Chunk, process and merge large study documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Estimate processing time and complexity.
    Estimate {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        pipeline: PipelineConfig,
    },

    /// Split the document and print the chunks.
    Chunk {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        pipeline: PipelineConfig,
        /// Include chunk text in the output.
        #[arg(long)]
        content: bool,
    },

    /// Run the full pipeline with the simulated handler.
    Process {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        pipeline: PipelineConfig,
        #[command(flatten)]
        handler: HandlerArgs,
    },
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Estimate { .. } => "estimate",
            Self::Chunk { .. } => "chunk",
            Self::Process { .. } => "process",
        }
    }

    /// Returns the pipeline configuration shared by every subcommand.
    pub fn pipeline(&self) -> &PipelineConfig {
        match self {
            Self::Estimate { pipeline, .. }
            | Self::Chunk { pipeline, .. }
            | Self::Process { pipeline, .. } => pipeline,
        }
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr; stdout is reserved for JSON output.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs build information and the effective configuration.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        let pipeline = self.command.pipeline();
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            chunk_size = pipeline.options.chunk_size,
            overlap_size = pipeline.options.overlap_size,
            max_concurrency = pipeline.options.max_concurrency,
            preserve_equations = pipeline.options.preserve_equations,
            math_detection = pipeline.options.enable_math_detection,
            preprocess = pipeline.preprocess,
            batch_delay_ms = pipeline.batch_delay_ms,
            "pipeline configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "otel").then_some("otel"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
