//! Command-line definitions and command handlers

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use axum::http::HeaderValue;
use clap::{Parser, Subcommand};

use crate::{
    api::{create_router, AppState, DEFAULT_ALLOWED_ORIGINS},
    artifacts::{InferenceArtifacts, CLASSIFIER_FILE, LABELS_FILE, SCALER_FILE},
    error::{CropError, Result},
    features::Field,
};

/// Croprec - crop recommendation inference server
#[derive(Parser, Debug)]
#[command(name = "croprec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the recommendation server
    ///
    /// Examples:
    ///   croprec serve --demo
    ///   croprec serve --model-dir ./model --port 8000
    Serve {
        /// Host to bind to (IP address)
        #[arg(long, env = "CROPREC_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "CROPREC_PORT", default_value = "5000")]
        port: u16,

        /// Directory holding scaler.json, ensemble_model.json and label_encoder.json
        #[arg(short, long, env = "CROPREC_MODEL_DIR", default_value = "model")]
        model_dir: PathBuf,

        /// Browser origin allowed to call the API (repeatable)
        #[arg(
            long = "allowed-origin",
            env = "CROPREC_ALLOWED_ORIGINS",
            value_delimiter = ','
        )]
        allowed_origins: Vec<String>,

        /// Serve the built-in demo artifacts instead of --model-dir
        #[arg(long)]
        demo: bool,
    },
    /// Load a model directory and report what it contains
    Check {
        /// Directory holding the three artifact files
        #[arg(short, long, env = "CROPREC_MODEL_DIR", default_value = "model")]
        model_dir: PathBuf,
    },
    /// Write the built-in demo artifacts to a directory
    ExportDemo {
        /// Destination directory (created if missing)
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Show version and input field information
    Info,
}

/// Everything needed to start the server
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Artifact directory (ignored in demo mode)
    pub model_dir: PathBuf,
    /// Allowed browser origins; empty means the defaults
    pub allowed_origins: Vec<String>,
    /// Serve the demo artifacts
    pub demo: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_dir: PathBuf::from("model"),
            allowed_origins: Vec::new(),
            demo: false,
        }
    }
}

/// Parse `host:port` into a socket address
///
/// IPv6 hosts may be given with or without brackets.
pub fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let address = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    address
        .parse()
        .map_err(|e: std::net::AddrParseError| CropError::InvalidAddress {
            address,
            reason: e.to_string(),
        })
}

/// Turn configured origins into header values
///
/// An empty list yields [`DEFAULT_ALLOWED_ORIGINS`]. The wildcard `*` is
/// rejected because responses allow credentials.
pub fn parse_origins(origins: &[String]) -> Result<Vec<HeaderValue>> {
    if origins.is_empty() {
        return Ok(DEFAULT_ALLOWED_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect());
    }
    origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(CropError::InvalidOrigin(origin.to_string()));
            }
            HeaderValue::from_str(origin).map_err(|_| CropError::InvalidOrigin(origin.to_string()))
        })
        .collect()
}

/// Build application state from the configuration
///
/// Loads artifacts from `model_dir`, or the demo set.
pub fn build_state(config: &ServeConfig) -> Result<AppState> {
    let origins = parse_origins(&config.allowed_origins)?;

    let artifacts = if config.demo {
        tracing::info!("using built-in demo artifacts");
        InferenceArtifacts::demo()
    } else {
        InferenceArtifacts::load(&config.model_dir)?
    };

    Ok(AppState::new(artifacts).with_allowed_origins(origins))
}

/// Handle the `serve` command
pub async fn handle_serve(config: ServeConfig) -> Result<()> {
    let addr = socket_addr(&config.host, config.port)?;
    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CropError::Server {
            operation: "bind".to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!(%addr, "Crop Recommendation API listening");
    println!("Endpoints:");
    println!("  GET  /        - Liveness check");
    println!("  POST /predict - Recommend a crop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CropError::Server {
            operation: "serve".to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}

/// Handle the `check` command
pub fn handle_check(model_dir: &Path) -> Result<()> {
    let artifacts = InferenceArtifacts::load(model_dir)?;
    print!("{}", check_report(model_dir, &artifacts));
    Ok(())
}

/// Human-readable summary of a loaded model directory
pub fn check_report(model_dir: &Path, artifacts: &InferenceArtifacts) -> String {
    use std::fmt::Write as _;

    let scaler = artifacts.scaler();
    let classifier = artifacts.classifier();
    let mut out = String::new();
    let _ = writeln!(out, "Model directory: {}", model_dir.display());
    let _ = writeln!(
        out,
        "  {SCALER_FILE}: {} ({} features)",
        scaler.name(),
        scaler.n_features()
    );
    let _ = writeln!(
        out,
        "  {CLASSIFIER_FILE}: {} estimators, {:?} voting, {} features, {} classes",
        classifier.estimators.len(),
        classifier.voting,
        classifier.n_features,
        classifier.n_classes
    );
    let _ = writeln!(
        out,
        "  {LABELS_FILE}: {}",
        artifacts.labels().classes.join(", ")
    );

    let warnings = artifacts.compatibility_warnings();
    if warnings.is_empty() {
        let _ = writeln!(out, "OK");
    } else {
        for warning in warnings {
            let _ = writeln!(out, "WARNING: {warning}");
        }
    }
    out
}

/// Handle the `export-demo` command
pub fn handle_export_demo(dir: &Path) -> Result<()> {
    let written = InferenceArtifacts::demo().export(dir)?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Handle the `info` command
pub fn handle_info() {
    println!("croprec {}", crate::VERSION);
    println!();
    println!("Input fields:");
    for field in Field::ALL {
        let rule = field.rule();
        println!(
            "  {:<12} {:<16} {} to {}{}",
            field.key(),
            rule.display_name,
            rule.min,
            rule.max,
            rule.unit_suffix()
        );
    }
}
