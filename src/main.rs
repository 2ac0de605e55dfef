use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};

use news_feed::config::Config;
use news_feed::infra::factory::build_feed_use_case;
use news_feed::server::{self, FeedResponse};
use news_feed::{logging, observability};

#[derive(Parser)]
#[command(name = "news_feed")]
#[command(about = "Moderated news feed built from crowd-submitted spreadsheet rows")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /news and /news/raw over HTTP
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the pipeline once and print the feed as JSON
    Fetch {
        /// Print the unfiltered, unmasked rows instead of the processed feed
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    let feed = Arc::new(build_feed_use_case(&config)?);

    match cli.command {
        Commands::Serve { port } => {
            if let Err(e) = observability::metrics::init() {
                warn!("Metrics disabled: {}", e);
            }
            let port = port.unwrap_or(config.server.port);
            server::start_server(feed, port).await?;
        }
        Commands::Fetch { raw } => {
            let body = if raw {
                serde_json::to_string_pretty(&FeedResponse {
                    success: true,
                    news: feed.raw_feed().await?,
                })?
            } else {
                let (news, stats) = feed.processed_feed_with_stats().await?;
                info!(?stats, "Fetch complete");
                serde_json::to_string_pretty(&FeedResponse {
                    success: true,
                    news,
                })?
            };
            println!("{}", body);
        }
    }

    Ok(())
}
