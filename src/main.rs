//! Command-line client for a database cluster behind the failover pool.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use influx_pool::config::{load_config, HostConfig};
use influx_pool::observability::logging::init_logging;
use influx_pool::{ClusterConfig, InfluxClient, QueryOptions, WriteOptions};

#[derive(Parser)]
#[command(name = "influx-pool")]
#[command(about = "Query and write a database cluster with host failover", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host base URL; repeat for several hosts. Replaces configured hosts.
    #[arg(long = "host", value_name = "URL")]
    hosts: Vec<Url>,

    #[arg(short, long)]
    username: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping every host and report status, round trip and version
    Ping {
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },
    /// Run a read query
    Query {
        query: String,
        #[arg(long)]
        db: Option<String>,
        #[arg(long)]
        rp: Option<String>,
        /// Epoch precision of returned timestamps
        #[arg(long)]
        epoch: Option<String>,
    },
    /// Write line protocol; pass `-` to read it from stdin
    Write {
        payload: String,
        #[arg(long)]
        db: Option<String>,
        #[arg(long, default_value = "n")]
        precision: String,
        #[arg(long)]
        rp: Option<String>,
    },
    /// Create a database
    CreateDatabase { name: String },
    /// Drop a database
    DropDatabase { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClusterConfig::default(),
    };
    init_logging(&config.observability);

    if !cli.hosts.is_empty() {
        config.hosts = cli
            .hosts
            .iter()
            .map(host_from_url)
            .collect::<Result<_, _>>()?;
    }
    if let Some(username) = cli.username {
        config.username = username;
    }
    if let Some(password) = cli.password {
        config.password = password;
    }

    tracing::debug!(hosts = config.hosts.len(), "Starting client");
    let client = InfluxClient::new(config)?;

    match cli.command {
        Commands::Ping { timeout_ms } => {
            let stats = client.ping(Duration::from_millis(timeout_ms)).await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Query { query, db, rp, epoch } => {
            let options = QueryOptions {
                database: db,
                retention_policy: rp,
                precision: epoch,
            };
            let results = client.query_raw(&query, &options).await?;
            print_json(&results)?;
        }
        Commands::Write {
            payload,
            db,
            precision,
            rp,
        } => {
            let payload = if payload == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                payload
            };
            let options = WriteOptions {
                database: db,
                precision,
                retention_policy: rp,
            };
            client.write_points(&payload, &options).await?;
            eprintln!("ok");
        }
        Commands::CreateDatabase { name } => {
            client.create_database(&name).await?;
            eprintln!("created database {}", name);
        }
        Commands::DropDatabase { name } => {
            client.drop_database(&name).await?;
            eprintln!("dropped database {}", name);
        }
    }

    Ok(())
}

fn host_from_url(url: &Url) -> Result<HostConfig, String> {
    let host = match url.host() {
        Some(url::Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => return Err(format!("host URL '{}' has no hostname", url)),
    };
    let port = url
        .port_or_known_default()
        .ok_or_else(|| format!("host URL '{}' has no port", url))?;
    Ok(HostConfig::new(url.scheme(), &host, port))
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
