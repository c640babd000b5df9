use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kb_client::{
    ApiClient, ArtifactQuery, ClientConfig, LogSource, LogTarget, PageQuery, SearchRequest,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kbctl", author, version, about = "Command-line access to the knowledge-base API")]
struct Cli {
    /// Backend origin, e.g. http://127.0.0.1:8000
    #[arg(long, global = true, env = "KB_API_URL")]
    url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Sent as the X-API-Key header
    #[arg(long, global = true, env = "KB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backend health and service status
    Health,
    /// Application name, version and dependencies
    Info,
    /// Uptime and usage counters
    Metrics,
    /// Rebuild the vector index from all active artifacts
    Reindex,
    /// Read or clear backend logs
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
    /// Browse stored artifacts
    Artifacts {
        #[command(subcommand)]
        action: ArtifactsAction,
    },
    /// Semantic retrieval and query history
    Search {
        #[command(subcommand)]
        action: SearchAction,
    },
    /// Backend configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Raw SQLite tables
    Sqlite {
        #[command(subcommand)]
        action: SqliteAction,
    },
    /// The ChromaDB collection
    Chroma {
        #[command(subcommand)]
        action: ChromaAction,
    },
}

#[derive(Subcommand)]
enum LogsAction {
    /// Print the newest lines; `database`, `server`, or both when omitted
    Show {
        source: Option<String>,
        #[arg(short = 'n', long)]
        lines: Option<u32>,
    },
    /// Empty the `database` or `server` log
    Clear { target: String },
}

#[derive(Subcommand)]
enum ArtifactsAction {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(short, long)]
        keyword: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    Get { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SearchAction {
    Retrieve {
        query: String,
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: u32,
        #[arg(short, long, default_value_t = 0.7)]
        threshold: f64,
        /// Restrict hits to these categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
    },
    History {
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Subcommand)]
enum SqliteAction {
    Tables,
    Rows {
        table: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
}

#[derive(Subcommand)]
enum ChromaAction {
    Documents {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    Document { id: String },
    Info,
    Collections,
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("failed to read client configuration")?;
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    Ok(config)
}

fn print<T: Serialize>(payload: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = client_config(&cli)?;
    let client = ApiClient::new(config).context("failed to create client")?;
    tracing::debug!(root = %client.client_config().root(), "using API root");

    match cli.command {
        Commands::Health => print(&client.system().health().await?)?,
        Commands::Info => print(&client.system().info().await?)?,
        Commands::Metrics => print(&client.system().metrics().await?)?,
        Commands::Reindex => print(&client.system().reindex_vectors().await?)?,
        Commands::Logs { action } => match action {
            LogsAction::Show { source, lines } => {
                let source = source.as_deref().map(LogSource::from_name).unwrap_or_default();
                print(&client.system().log_data(source, lines).await?)?
            }
            LogsAction::Clear { target } => {
                let target: LogTarget = target.parse()?;
                print(&client.system().clear_log(target).await?)?
            }
        },
        Commands::Artifacts { action } => match action {
            ArtifactsAction::List {
                page,
                size,
                keyword,
                category,
            } => {
                let query = ArtifactQuery {
                    page,
                    size,
                    keyword,
                    category,
                };
                print(&client.artifacts().list(&query).await?)?
            }
            ArtifactsAction::Get { id } => print(&client.artifacts().get(id).await?)?,
            ArtifactsAction::Delete { id } => print(&client.artifacts().delete(id).await?)?,
        },
        Commands::Search { action } => match action {
            SearchAction::Retrieve {
                query,
                top_k,
                threshold,
                category,
            } => {
                let request = SearchRequest {
                    top_k,
                    threshold,
                    category_filter: (!category.is_empty()).then_some(category),
                    ..SearchRequest::new(query)
                };
                print(&client.search().retrieve(&request).await?)?
            }
            SearchAction::History { limit } => print(&client.search().history(limit).await?)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => print(&client.config().get().await?)?,
        },
        Commands::Sqlite { action } => match action {
            SqliteAction::Tables => print(&client.sqlite().tables().await?)?,
            SqliteAction::Rows { table, page, size } => {
                print(&client.sqlite().rows(&table, &PageQuery::new(page, size)).await?)?
            }
        },
        Commands::Chroma { action } => match action {
            ChromaAction::Documents { page, size } => {
                print(&client.chromadb().documents(&PageQuery::new(page, size)).await?)?
            }
            ChromaAction::Document { id } => print(&client.chromadb().document(&id).await?)?,
            ChromaAction::Info => print(&client.chromadb().info().await?)?,
            ChromaAction::Collections => print(&client.chromadb().collections().await?)?,
        },
    }

    Ok(())
}
