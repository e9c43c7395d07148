//! urltally
//!
//! Indexes a URL access log and answers count / popularity queries by date
//! prefix, either over HTTP (`serve`) or once from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use urltally::api::dto::{CountResponse, PopularResponse};
use urltally::api::{serve, AppState};
use urltally::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use urltally::index::TemporalIndex;
use urltally::ingest::ingest_file;
use urltally::query::{count_between, count_urls, find_top_n, identify_granularity};

#[derive(Parser)]
#[command(name = "urltally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Count and rank URL accesses by date prefix")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Access log to index, overrides the configured one
    #[arg(short, long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index the access log, then serve queries over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Count accesses under a date prefix (e.g. 2015, 2015-08, "2015-08-01 00:04")
    Count {
        prefix: String,
    },

    /// Most accessed URLs under a date prefix
    Top {
        prefix: String,
        /// Number of URLs
        #[arg(short, long, default_value = "10")]
        size: usize,
    },

    /// Count accesses between two prefixes of the same granularity
    Range {
        from: String,
        to: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    let mut config = loaded.config;
    if let Some(log_file) = cli.log_file {
        config.index.log_file = log_file;
    }

    init_tracing(&config.logging);
    tracing::info!("urltally v{}", env!("CARGO_PKG_VERSION"));
    for e in &loaded.skipped {
        tracing::warn!("Skipped config: {}", e);
    }
    match &loaded.source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let mut index = TemporalIndex::new();
    ingest_file(&mut index, &config.index.log_file)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.api.port = port;
            }
            let state = AppState::new(index, config.api.clone());
            serve(state, &config.api).await?;
        }

        Commands::Count { prefix } => {
            let granularity = identify_granularity(&prefix)?;
            let count = count_urls(&index, &prefix, granularity)?;
            println!("{}", serde_json::to_string_pretty(&CountResponse { count })?);
        }

        Commands::Top { prefix, size } => {
            let granularity = identify_granularity(&prefix)?;
            let queries = find_top_n(&index, &prefix, granularity, size)?;
            println!("{}", serde_json::to_string_pretty(&PopularResponse { queries })?);
        }

        Commands::Range { from, to } => {
            let count = count_between(&index, &from, &to)?;
            println!("{}", serde_json::to_string_pretty(&CountResponse { count })?);
        }

        Commands::Config { .. } => unreachable!("handled before indexing"),
    }

    Ok(())
}

/// Initialize logging; `RUST_LOG` wins over the configured level
fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("urltally={},tower_http=info", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
