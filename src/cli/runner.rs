//! Dispatches a parsed [`Cli`] to the right command implementation.

use super::commands::{Cli, Commands};
use super::demo;
use crate::config::AggregatorConfig;
use crate::error::Result;
use crate::store::AggregatingStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Owns the parsed CLI args and runs the selected subcommand.
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Wrap a parsed CLI invocation.
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected subcommand to completion.
    pub async fn run(self) -> Result<()> {
        let mut config = self.load_config()?;

        match self.cli.command {
            Commands::Serve { listen_addr } => {
                if let Some(addr) = listen_addr {
                    config.listen_addr = addr;
                }
                let store = AggregatingStore::new(Arc::new(demo::partitioner()), config.concurrency);
                super::serve(store, config).await
            }
            Commands::List {
                continue_token,
                limit,
            } => {
                let store = AggregatingStore::new(Arc::new(demo::partitioner()), config.concurrency);
                let limit = config.effective_limit(Some(limit).filter(|l| *l > 0));
                let page = store.list(&continue_token, limit, CancellationToken::new()).await?;
                println!("{}", serde_json::to_string_pretty(&page).unwrap());
                Ok(())
            }
        }
    }

    fn load_config(&self) -> Result<AggregatorConfig> {
        match &self.cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| crate::error::Error::Other(format!("reading {}: {e}", path.display())))?;
                AggregatorConfig::from_json(&raw)
            }
            None => Ok(AggregatorConfig::default()),
        }
    }
}
