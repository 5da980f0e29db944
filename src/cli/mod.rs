//! CLI command implementations
//!
//! Business logic for the `croprec` binary, kept in the library so the
//! handlers can be tested without spawning a process.

pub mod handlers;
pub use handlers::{Cli, Commands, ServeConfig};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`; falls back to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Main CLI entrypoint - dispatches commands to handlers
pub async fn entrypoint(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            model_dir,
            allowed_origins,
            demo,
        } => {
            handlers::handle_serve(ServeConfig {
                host,
                port,
                model_dir,
                allowed_origins,
                demo,
            })
            .await
        },
        Commands::Check { model_dir } => handlers::handle_check(&model_dir),
        Commands::ExportDemo { dir } => handlers::handle_export_demo(&dir),
        Commands::Info => {
            handlers::handle_info();
            Ok(())
        },
    }
}
