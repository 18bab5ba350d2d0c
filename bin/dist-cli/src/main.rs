//! dist - distribute dataset pieces to storage providers
//!
//! Keeps an org directory and a dataset catalog as JSON snapshots in a
//! repository directory, and hands out pieces to SPs within replication
//! bounds.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{GetArgs, PieceAddArgs};
use dist_common::config::DEFAULT_REPO;
use dist_common::{AllocationConfig, DistConfig, LinkConfig};
use dist_store::Repo;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dist")]
#[command(about = "tool to distribute data with filplus")]
#[command(version)]
struct Args {
    /// Repository directory holding the snapshots
    #[arg(long, env = "DIST_PATH", default_value = DEFAULT_REPO)]
    repo: PathBuf,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Organization operations
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Dataset operations
    Dataset {
        #[command(subcommand)]
        action: DatasetCommands,
    },
    /// Piece operations
    Piece {
        #[command(subcommand)]
        action: PieceCommands,
    },
}

#[derive(Subcommand, Debug)]
enum OrgCommands {
    /// List organizations
    View {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an organization
    Add {
        /// Organization name
        #[arg(short = 'u', long)]
        org: String,
        /// Comma separated SP list, e.g. f01,f02
        #[arg(short = 's', long, default_value = "")]
        sp: String,
        /// Replace an existing organization
        #[arg(long)]
        force: bool,
    },
    /// Delete an organization
    Delete {
        /// Organization name
        #[arg(short = 'u', long)]
        org: String,
        #[arg(long)]
        really_do_it: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DatasetCommands {
    /// List datasets
    View {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a dataset from a line-delimited piece description file
    Add {
        /// Dataset name
        #[arg(short, long)]
        name: String,
        /// Number of distinct SPs each piece should reach
        #[arg(short, long)]
        duplicate: u32,
        /// Piece description file
        #[arg(short, long)]
        filepath: PathBuf,
        /// Replace an existing dataset
        #[arg(long)]
        force: bool,
    },
    /// Delete a dataset
    Delete {
        /// Dataset name
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        really_do_it: bool,
    },
    /// Hand out pieces of a dataset to an SP
    Get {
        /// Dataset name
        #[arg(long)]
        name: String,
        /// Requesting SP
        #[arg(long)]
        sp: String,
        /// Amount of data to hand out, in TiB
        #[arg(long)]
        size: f64,
        /// Override the dataset's duplicate factor
        #[arg(long)]
        duplicate: Option<u32>,
        /// Times one piece may be handed to the same SP again
        #[arg(long, default_value_t = 0)]
        repeat: u32,
        /// Download link prefix
        #[arg(long, env = "DIST_PREFIX", default_value = "")]
        prefix: String,
        /// Download link suffix
        #[arg(long, env = "DIST_SUFFIX", default_value = ".car")]
        suffix: String,
        /// Print the allocation plan as JSON
        #[arg(long)]
        json: bool,
        #[arg(long)]
        really_do_it: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PieceCommands {
    /// Add a piece to a dataset
    Add {
        /// Dataset name
        #[arg(long)]
        name: String,
        #[arg(long, alias = "pieceCid")]
        piece_cid: String,
        /// Piece size in bytes
        #[arg(long, alias = "pieceSize")]
        piece_size: u64,
        /// CAR size in bytes
        #[arg(long, alias = "carSize")]
        car_size: u64,
        /// Comma separated SPs already holding the piece
        #[arg(long, default_value = "")]
        sps: String,
        /// Replace an existing piece
        #[arg(long)]
        force: bool,
    },
    /// Delete a piece from a dataset
    Delete {
        /// Dataset name
        #[arg(long)]
        name: String,
        #[arg(long, alias = "pieceCid")]
        piece_cid: String,
        #[arg(long)]
        really_do_it: bool,
    },
    /// List the pieces of a dataset
    View {
        /// Dataset name
        #[arg(long)]
        name: String,
        /// Print the dataset as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DistConfig::with_repo(&args.repo)?;

    #[cfg(unix)]
    let _lock = match dist_store::InstanceLock::acquire(&config.lock_path) {
        Ok(lock) => lock,
        Err(e) if e.is_already_running() => {
            eprintln!("Another instance is already running...");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let repo = Repo::open(&config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(args.command, &repo, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run<W: Write>(command: Commands, repo: &Repo, out: &mut W) -> Result<()> {
    match command {
        Commands::Org { action } => match action {
            OrgCommands::View { json } => commands::org_view(repo, json, out),
            OrgCommands::Add { org, sp, force } => commands::org_add(repo, &org, &sp, force, out),
            OrgCommands::Delete { org, really_do_it } => {
                commands::org_delete(repo, &org, really_do_it, out)
            }
        },
        Commands::Dataset { action } => match action {
            DatasetCommands::View { json } => commands::dataset_view(repo, json, out),
            DatasetCommands::Add {
                name,
                duplicate,
                filepath,
                force,
            } => commands::dataset_add(repo, &name, duplicate, &filepath, force, out),
            DatasetCommands::Delete { name, really_do_it } => {
                commands::dataset_delete(repo, &name, really_do_it, out)
            }
            DatasetCommands::Get {
                name,
                sp,
                size,
                duplicate,
                repeat,
                prefix,
                suffix,
                json,
                really_do_it,
            } => {
                let args = GetArgs {
                    name,
                    sp,
                    size,
                    bounds: AllocationConfig { duplicate, repeat },
                    links: LinkConfig { prefix, suffix },
                    json,
                    really_do_it,
                };
                commands::dataset_get(repo, &args, out)
            }
        },
        Commands::Piece { action } => match action {
            PieceCommands::Add {
                name,
                piece_cid,
                piece_size,
                car_size,
                sps,
                force,
            } => {
                let args = PieceAddArgs {
                    name,
                    piece_cid,
                    piece_size,
                    car_size,
                    sps,
                    force,
                };
                commands::piece_add(repo, &args, out)
            }
            PieceCommands::Delete {
                name,
                piece_cid,
                really_do_it,
            } => commands::piece_delete(repo, &name, &piece_cid, really_do_it, out),
            PieceCommands::View { name, json } => commands::piece_view(repo, &name, json, out),
        },
    }
}
