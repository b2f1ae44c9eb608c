//! XRSK dashboard entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use xrsk_bridges::derive::Column;
use xrsk_bridges::CollectorRegistry;
use xrsk_dashboard::pages::analytics::{self, AnalyticsQuery};
use xrsk_dashboard::pages::{bridge, home, ranking, trends};
use xrsk_dashboard::{render, resolve_source, Dashboard, DashboardConfig};

#[derive(Parser)]
#[command(
    name = "xrsk",
    about = "Cross-chain bridge risk dashboard over cached DefiLlama metrics",
    version
)]
struct Cli {
    /// Collector to read from (also reads XRSK_SOURCE).
    #[arg(long, global = true)]
    source: Option<String>,

    /// Print pages as JSON instead of text tables.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline metrics, top 10 by TVL and the full bridge list (default).
    Home,

    /// Filtered metrics and chain-count distribution.
    Analytics {
        /// Minimum TVL in millions of USD.
        #[arg(long, default_value_t = 0.0)]
        min_tvl: f64,

        /// Minimum 24h volume in millions of USD.
        #[arg(long, default_value_t = 0.0)]
        min_volume: f64,

        /// Minimum number of supported chains.
        #[arg(long, default_value_t = 0)]
        min_chains: usize,
    },

    /// Market share and activity rankings.
    Trends {
        #[arg(long, default_value_t = trends::TOP_N)]
        limit: usize,
    },

    /// Top bridges by one column.
    Top {
        /// tvl, volume_24h, volume_7d, volume_30d or chains_count.
        #[arg(long, default_value = "tvl")]
        by: Column,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// One bridge: catalogue row, upstream details and volume history.
    Bridge {
        id: String,
    },

    /// Raw upstream volume history for one bridge, as JSON.
    Volume {
        id: String,
    },

    /// Write the normalised table as CSV.
    Export {
        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered collectors.
    Sources,

    /// Serve the dashboard API over HTTP.
    #[cfg(feature = "http")]
    Serve {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: String,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   xrsk completions bash > ~/.local/share/bash-completion/completions/xrsk
    ///   xrsk completions zsh > ~/.zfunc/_xrsk
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig {
        source: resolve_source(cli.source.as_deref()),
        ..DashboardConfig::default()
    };
    let registry = CollectorRegistry::with_defaults(config.upstream.clone());

    match cli.command.unwrap_or(Commands::Home) {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "xrsk", &mut std::io::stdout());
        }

        Commands::Sources => {
            let names = registry.names();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    let marker = if name == config.source { "*" } else { " " };
                    println!("{marker} {name}");
                }
            }
        }

        command => {
            let dashboard = Dashboard::new(&config, &registry)?;
            run(command, &dashboard, cli.json).await?;
        }
    }

    Ok(())
}

async fn run(command: Commands, dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Home => {
            let table = dashboard.bridges().await;
            println!("{}", render(&home::build(&table), json)?);
        }

        Commands::Analytics {
            min_tvl,
            min_volume,
            min_chains,
        } => {
            let query = AnalyticsQuery {
                min_tvl_m: min_tvl,
                min_volume_m: min_volume,
                min_chains,
            };
            let table = dashboard.bridges().await;
            println!("{}", render(&analytics::build(&table, query), json)?);
        }

        Commands::Trends { limit } => {
            let table = dashboard.bridges().await;
            println!("{}", render(&trends::build(&table, limit), json)?);
        }

        Commands::Top { by, limit } => {
            let table = dashboard.bridges().await;
            println!("{}", render(&ranking::build(&table, by, limit), json)?);
        }

        Commands::Bridge { id } => {
            let (table, details, volume) = tokio::join!(
                dashboard.bridges(),
                dashboard.bridge(&id),
                dashboard.bridge_volume(&id)
            );
            let view = bridge::build(&table, &id, (*details).as_ref(), (*volume).as_ref());
            println!("{}", render(&view, json)?);
        }

        Commands::Volume { id } => match &*dashboard.bridge_volume(&id).await {
            Some(volume) => println!("{}", serde_json::to_string_pretty(volume)?),
            None => anyhow::bail!("volume history for bridge '{id}' unavailable"),
        },

        Commands::Export { output } => {
            let table = dashboard.bridges().await;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    xrsk_bridges::write_csv(&table, std::io::BufWriter::new(file))?;
                    eprintln!("Wrote {} bridges to {}", table.len(), path.display());
                }
                None => print!("{}", xrsk_bridges::to_csv_string(&table)?),
            }
        }

        #[cfg(feature = "http")]
        Commands::Serve { addr } => {
            let transport = xrsk_dashboard::transport::HttpTransport::new(dashboard.clone());
            transport.run(&addr).await?;
        }

        Commands::Sources | Commands::Completions { .. } => {}
    }

    Ok(())
}
