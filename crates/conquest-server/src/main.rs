//! Strategic Conquest server
//!
//! Reads one JSON request per line on stdin and answers with one JSON response per line on
//! stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use conquest_server::{encode_response, parse_request, ApiResponse, ServerConfig, SessionManager};

#[derive(Parser)]
#[command(name = "conquest-server")]
#[command(about = "Host Strategic Conquest games over line-delimited JSON", version)]
struct Cli {
    /// YAML configuration file; defaults apply when absent
    #[arg(long, env = "CONQUEST_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("conquest_server=info,conquest_core=info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    info!("Strategic Conquest server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        save_dir = %config.save_dir.display(),
        save_format = config.save_format.extension(),
        "ready for requests on stdin"
    );

    let mut sessions = SessionManager::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_request(&line) {
            Ok(request) => sessions.handle(request),
            Err(err) => {
                warn!(%err, "malformed request");
                ApiResponse::failure(format!("Malformed request: {err}"))
            }
        };

        let encoded = encode_response(&response).context("encoding response")?;
        writeln!(stdout, "{encoded}").context("writing response")?;
        stdout.flush().context("flushing response")?;
    }

    info!(sessions = sessions.session_count(), "stdin closed, shutting down");
    Ok(())
}
