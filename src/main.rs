// Strengths Coach - HTTP service entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use strengths_coach::state::AppState;
use strengths_coach::storage::ConfigService;

#[derive(Parser)]
#[command(
    name = "strengths-coach",
    version,
    about = "Strengths coach conversation and portfolio report service"
)]
struct Cli {
    /// Path to config.json (defaults to ~/.strengths-coach/config.json).
    #[arg(long, env = "STRENGTHS_COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overriding the config file.
    #[arg(long, env = "STRENGTHS_COACH_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("strengths_coach=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config_service = match cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config_service
            .set_bind_address(bind)
            .context("invalid --bind address")?;
    }
    tracing::info!(path = %config_service.path().display(), "configuration loaded");

    let config = config_service.get_config().clone();
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address))?;

    let state = AppState::from_config(config).context("failed to initialize providers")?;
    strengths_coach::server::run(Arc::new(state), addr).await?;
    Ok(())
}
