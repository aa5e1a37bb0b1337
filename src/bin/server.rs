//! Summarizer HTTP server.
//! Run with: cargo run --bin summarizer-server

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use llm_summarizer::server::{self, state::DEFAULT_SERVICE_MESSAGE, AppState};
use llm_summarizer::{CollectorConfig, ProviderFactory, SummaryCollector};

/// Summarize text through an OpenAI-compatible or Gemini LLM endpoint.
#[derive(Parser, Debug)]
#[command(name = "summarizer-server", version, about)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = server::DEFAULT_PORT)]
    port: u16,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    log_json: bool,

    /// Message reported by `GET /`
    #[arg(long, env = "SERVICE_NAME", default_value = DEFAULT_SERVICE_MESSAGE)]
    service_name: String,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn main() -> ExitCode {
    // A missing .env file is fine; the real environment still applies.
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.log_json);

    tracing::info!("Starting summarizer v{}", env!("CARGO_PKG_VERSION"));

    let (provider_config, provider) = match ProviderFactory::from_env() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to configure provider: {e}");
            return ExitCode::from(1);
        }
    };

    let collector_config = match CollectorConfig::from_env(provider_config.model.clone()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to configure summarizer: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(
        transport = collector_config.transport.as_str(),
        max_tokens = collector_config.default_max_tokens,
        max_input_chars = collector_config.max_input_chars,
        partial_policy = ?collector_config.partial_policy,
        "Summarizer configured"
    );

    let collector = SummaryCollector::new(Arc::from(provider), collector_config);
    let state = AppState::with_service_message(collector, args.service_name);
    let addr = SocketAddr::new(args.host, args.port);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, addr, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
