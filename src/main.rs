use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsdesk::app::AppContext;
use newsdesk::cli::{commands, Cli, Commands};
use newsdesk::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the TUI and command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(cli.db, config.api.clone())?;

    match cli.command {
        Some(Commands::Headlines { country, pages }) => {
            let country = country.unwrap_or_else(|| config.api.country.clone());
            commands::headlines(&ctx, &country, pages).await?;
        }
        Some(Commands::Search { query, pages }) => {
            commands::search(&ctx, &query, pages).await?;
        }
        Some(Commands::Favorites { json }) => {
            commands::list_favorites(&ctx, json)?;
        }
        Some(Commands::Unfavorite { url }) => {
            commands::unfavorite(&ctx, &url)?;
        }
        Some(Commands::Tui) | None => {
            newsdesk::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
    }

    Ok(())
}
