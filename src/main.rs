//! Croprec CLI - crop recommendation inference server
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server (`--demo` for built-in artifacts)
//! - `check` - Load and inspect a model directory
//! - `export-demo` - Write the demo artifacts to disk
//! - `info` - Show version and input field information

use clap::Parser;
use croprec::{
    cli::{entrypoint, init_tracing, Cli},
    error::Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    entrypoint(cli).await
}
