#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::io::Write;
use std::process;

use anyhow::Context;
use scholia_core::DocumentChunk;
use scholia_core::detect::ContentFeatures;
use scholia_worker::{DocumentPipeline, PipelineConfig};
use serde::Serialize;

use crate::config::{Cli, Command, HandlerArgs, InputArgs};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "scholia_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "scholia_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "scholia_cli::config";
pub const TRACING_TARGET_PROGRESS: &str = "scholia_cli::progress";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    match cli.command {
        Command::Estimate { input, pipeline } => estimate(&input, pipeline).await,
        Command::Chunk {
            input,
            pipeline,
            content,
        } => chunk(&input, pipeline, content).await,
        Command::Process {
            input,
            pipeline,
            handler,
        } => process(&input, pipeline, &handler).await,
    }
}

/// Prints the processing plan.
async fn estimate(input: &InputArgs, config: PipelineConfig) -> anyhow::Result<()> {
    let text = input.read().await?;
    let pipeline = create_pipeline(config)?;
    print_json(&pipeline.plan(&text))
}

/// Chunk listing entry.
#[derive(Serialize)]
struct ChunkRow<'a> {
    id: &'a str,
    start_index: usize,
    end_index: usize,
    overlap: usize,
    word_count: usize,
    #[serde(flatten)]
    features: ContentFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

impl<'a> ChunkRow<'a> {
    fn new(chunk: &'a DocumentChunk, with_content: bool) -> Self {
        Self {
            id: &chunk.id,
            start_index: chunk.start_index,
            end_index: chunk.end_index,
            overlap: chunk.overlap,
            word_count: chunk.word_count,
            features: chunk.features,
            content: with_content.then_some(chunk.content.as_str()),
        }
    }
}

/// Prints the chunk boundaries.
async fn chunk(input: &InputArgs, config: PipelineConfig, content: bool) -> anyhow::Result<()> {
    let text = input.read().await?;
    let pipeline = create_pipeline(config)?;
    let chunks = pipeline.chunk(&text);

    let rows: Vec<ChunkRow<'_>> = chunks
        .iter()
        .map(|chunk| ChunkRow::new(chunk, content))
        .collect();
    print_json(&rows)
}

/// Runs the pipeline with the simulated handler and prints its output.
async fn process(
    input: &InputArgs,
    config: PipelineConfig,
    handler: &HandlerArgs,
) -> anyhow::Result<()> {
    let text = input.read().await?;
    let pipeline = create_pipeline(config)?;
    let handler = handler.build();

    let output = pipeline
        .run_with_progress(
            &text,
            &handler,
            Some(Box::new(|progress: f64, chunk_index: usize| {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    chunk_index,
                    progress_percent = progress,
                    "chunk finished"
                );
            })),
        )
        .await;

    print_json(&output)
}

fn create_pipeline(config: PipelineConfig) -> anyhow::Result<DocumentPipeline> {
    DocumentPipeline::new(config).context("invalid pipeline configuration")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to serialize output")?;
    writeln!(stdout).context("failed to write output")?;
    Ok(())
}
