//! Command-line argument parsing for sqlchat.

use crate::config::{Config, ConnectionConfig};
use crate::error::{ChatError, Result};
use crate::llm::LlmProvider;
use clap::Parser;
use std::path::PathBuf;

/// Chat with a MySQL database in plain language.
#[derive(Parser, Debug)]
#[command(name = "sqlchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// LLM provider: gemini, openai or mock
    #[arg(long, value_name = "PROVIDER", env = "SQLCHAT_PROVIDER")]
    pub provider: Option<String>,

    /// Model name (defaults to the provider's default model)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Database host for the connection form
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Database port for the connection form
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<String>,

    /// Database user for the connection form
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Database name for the connection form
    #[arg(short = 'd', long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read questions from stdin without a prompt and log to stderr
    #[arg(long)]
    pub headless: bool,

    /// Start already connected to an in-memory mock database
    #[arg(long)]
    pub mock_db: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Builds the initial connection form.
    ///
    /// Precedence: CLI flags, then the config file, then `MYSQL_PWD` /
    /// `MYSQL_DATABASE` for fields still empty, then built-in defaults.
    pub fn initial_form(&self, config: &Config) -> ConnectionConfig {
        let mut form = config.connection.clone();

        let overrides = [
            (&mut form.host, &self.host),
            (&mut form.port, &self.port),
            (&mut form.user, &self.user),
            (&mut form.database, &self.database),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        form.apply_env_defaults();
        form
    }

    /// Resolves the LLM provider and model, CLI over config file.
    pub fn resolve_llm(&self, config: &Config) -> Result<(LlmProvider, Option<String>)> {
        let name = self.provider.as_deref().unwrap_or(&config.llm.provider);
        let provider = name.parse::<LlmProvider>().map_err(ChatError::config)?;
        let model = self.model.clone().or_else(|| config.llm.model.clone());
        Ok((provider, model))
    }
}
