mod cli;
mod commands;
mod config;
mod dev;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use psa_client::{Credentials, PsaClient, PsaUrl};
use tally_core::adapters::outbound::psa::PsaStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    if cli.dev {
        let (interval_store, entry_store, ticket_store) = dev::seeded_stores();
        println!(
            "dev mode: in-memory stores, ticket {} / user {}\n",
            dev::DEV_TICKET,
            dev::DEV_USER
        );
        return commands::dispatch(cli.command, interval_store, entry_store, ticket_store).await;
    }

    let settings = config::read_config()?;
    let credentials = if settings.server.api_key.is_empty() {
        Credentials::from_env()?
    } else {
        Credentials::new(&settings.server.api_key, &settings.server.tenant)
    };
    let client = PsaClient::new(PsaUrl::new(&settings.server.base_url), credentials)?;
    let store = Arc::new(
        PsaStore::new(Arc::new(client))
            .with_timeout(Duration::from_secs(settings.server.timeout_seconds)),
    );

    commands::dispatch(cli.command, store.clone(), store.clone(), store).await
}
