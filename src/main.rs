//! sqlchat - chat with a MySQL database in plain language.

use anyhow::Context;
use sqlchat::chat::Session;
use sqlchat::cli::Cli;
use sqlchat::config::Config;
use sqlchat::db::MockDatabaseClient;
use sqlchat::llm::create_client;
use sqlchat::logging::{self, LogTarget};
use sqlchat::repl::Repl;
use std::sync::Arc;
use tokio::io::{stdin, stdout, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if let Err(e) = logging::init(&LogTarget::for_session(cli.headless)) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let (provider, model) = cli.resolve_llm(&config)?;
    info!("Using LLM provider: {}", provider);
    let llm = create_client(provider, model, None)?;

    let mut session = Session::new(llm);
    if cli.mock_db {
        session.attach(Arc::new(MockDatabaseClient::new()), "mock");
    }

    let form = cli.initial_form(&config);
    let mut repl = Repl::new(session, form).with_prompt(!cli.headless);

    repl.run(BufReader::new(stdin()), stdout())
        .await
        .context("Chat loop failed")?;

    Ok(())
}
