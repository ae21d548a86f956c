use anyhow::Result;
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::{info, warn};

use reader_critic::api;
use reader_critic::config::Config;
use reader_critic::llm::LlmGateway;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Reader Critic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Document critique service: upload a document, hear from its readers")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on (overrides the PORT environment variable)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let default_filter = if matches.get_flag("verbose") {
        "reader_critic=debug,tower_http=debug,info"
    } else {
        "reader_critic=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = Config::from_env();
    let port = matches
        .get_one::<String>("port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.server.port);

    if !config.llm.has_any_key() {
        warn!(
            "No LLM provider configured; analyze/feedback requests will fail. \
             Set DEEPSEEK_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY."
        );
    }

    info!("Starting reader-critic on port {}", port);

    let gateway = Arc::new(LlmGateway::new(config.llm));
    api::start_http_server(gateway, port).await
}
