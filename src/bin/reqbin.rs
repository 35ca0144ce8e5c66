//! reqbin CLI
//!
//! Drives the persistence core against a data directory.

use std::io::Read;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqbin::{CapturedRequest, Config, Database, ReqbinError, Services, WalSyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// reqbin
#[derive(Parser, Debug)]
#[command(name = "reqbin")]
#[command(about = "Create request bins, log requests into them, and list them back")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./reqbin_data")]
    data_dir: String,

    /// fsync the WAL after every write
    #[arg(long)]
    sync_every_write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new bin and print its id
    NewBin {
        /// Opaque owner tag
        #[arg(long)]
        owner: Option<String>,
    },

    /// Log a request into a bin (body is read from stdin)
    Log {
        /// Bin id
        bin: String,

        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value = "/")]
        uri: String,

        #[arg(long, default_value = "127.0.0.1:0")]
        remote_addr: String,

        /// Header as `Name: value`; repeat for multiple
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Print every request captured by a bin
    Show {
        /// Bin id
        bin: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,reqbin=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        // stdout carries command output only
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(if e.is_client_fault() { 2 } else { 1 });
    }
}

fn run(args: Args) -> reqbin::Result<()> {
    let sync = if args.sync_every_write {
        WalSyncStrategy::EveryWrite
    } else {
        Config::default().wal_sync_strategy
    };
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .wal_sync_strategy(sync)
        .build();

    tracing::debug!("reqbin v{}, data directory {}", reqbin::VERSION, args.data_dir);

    let db = Arc::new(Database::open(config)?);
    let services = Services::new(Arc::clone(&db));

    match args.command {
        Commands::NewBin { owner } => {
            let id = match owner {
                Some(owner) => services.bins.create_owned_bin(owner)?,
                None => services.create_new_bin()?,
            };
            println!("{}", id);
        }
        Commands::Log {
            bin,
            method,
            host,
            uri,
            remote_addr,
            headers,
        } => {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body)?;

            let mut request = CapturedRequest::new(bin)
                .method(method)
                .host(host)
                .request_uri(uri)
                .remote_addr(remote_addr)
                .body(body);
            for raw in &headers {
                let (name, value) = parse_header(raw)?;
                request = request.header(name, value);
            }

            let id = services.log_request(request)?;
            println!("{}", id);
        }
        Commands::Show { bin } => {
            for request in services.get_requests_in_bin(&bin)? {
                println!(
                    "#{} {} {} {}{} from {}",
                    request.id,
                    request.received_at.to_rfc3339(),
                    request.method,
                    request.host,
                    request.request_uri,
                    request.remote_addr
                );
                match request.decode_headers() {
                    Ok(headers) => {
                        for (name, values) in headers {
                            for value in values {
                                println!("  {}: {}", name, value);
                            }
                        }
                    }
                    Err(e) => println!("  <headers unreadable: {}>", e),
                }
                println!("  {}", String::from_utf8_lossy(&request.body));
            }
        }
    }

    drop(services);
    match Arc::try_unwrap(db) {
        Ok(db) => db.close(),
        Err(_) => Ok(()),
    }
}

fn parse_header(raw: &str) -> reqbin::Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ReqbinError::Config(format!("header must be `Name: value`, got {:?}", raw)))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
