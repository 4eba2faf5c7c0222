mod api;
mod cache;
mod config;
mod dashboard;
mod error;
mod forecast;
mod indicator;
mod model;
mod provider;
mod symbols;

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use dashboard::Dashboard;
use forecast::trend::TrendForecaster;
use provider::yahoo::YahooProvider;
use symbols::SymbolTable;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("symbol table error")]
    Symbols,
    #[display("server error")]
    Server,
}

#[derive(Parser)]
#[command(name = "stock-dashboard", about = "Stock dashboard backend")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    // ── Symbol table ──────────────────────────────────────────────────────────
    let symbols_path = &config.symbols.path;
    let symbols = SymbolTable::load(Path::new(symbols_path))
        .change_context(AppError::Symbols)
        .attach_with(|| format!("symbols file: {symbols_path}"))?;

    // ── Services ──────────────────────────────────────────────────────────────
    let requests_per_second =
        NonZeroU32::new(config.provider.requests_per_second).unwrap_or(NonZeroU32::MIN);
    let provider = Arc::new(YahooProvider::new(
        config.provider.base_url.clone(),
        requests_per_second,
    ));
    let dashboard = Arc::new(Dashboard::new(
        symbols,
        provider,
        Arc::new(TrendForecaster),
        config.provider.start_date,
    ));

    // ── HTTP server ───────────────────────────────────────────────────────────
    let app = api::router(dashboard);
    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .change_context(AppError::Server)
        .attach_with(|| format!("listen_addr: {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "dashboard API listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, shutting down");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .change_context(AppError::Server)?;

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
