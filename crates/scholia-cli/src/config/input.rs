//! Document input.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tokio::io::AsyncReadExt;

const STDIN: &str = "-";

/// Where the document text comes from.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Text file to read, or `-` for stdin.
    #[arg(value_name = "FILE", default_value = STDIN)]
    pub file: PathBuf,
}

impl InputArgs {
    /// Returns true if the document is read from stdin.
    pub fn is_stdin(&self) -> bool {
        self.file == Path::new(STDIN)
    }

    /// Reads the whole document as UTF-8.
    pub async fn read(&self) -> anyhow::Result<String> {
        if self.is_stdin() {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read document from stdin")?;
            return Ok(text);
        }

        tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("failed to read document from {}", self.file.display()))
    }
}
