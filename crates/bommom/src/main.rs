use std::path::PathBuf;

use anyhow::Context;
use bommom_core::{BomFormat, JsonFileBomStore};
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod convert;
mod dump;
mod init;
mod list;
mod load;

#[derive(Parser)]
#[command(name = "bommom")]
#[command(about = "Manage and publish electronics BOMs", long_about = None)]
#[command(version)]
struct Cli {
    /// Top-level directory of the flat-file BOM store
    #[arg(long, global = true, value_name = "DIR", default_value = "./filestore")]
    path: PathBuf,

    /// Print extra info
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format; inferred from the output file extension when omitted
    #[arg(long, global = true, value_name = "FORMAT")]
    format: Option<BomFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the BOM store and seed an example BOM
    Init,

    /// List BOMs, optionally filtered by owner
    List(list::ListArgs),

    /// Dump the head version of a BOM
    Dump(dump::DumpArgs),

    /// Import a BOM file into the store as a new head version
    Load(load::LoadArgs),

    /// Convert a BOM file between formats
    Convert(convert::ConvertArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides the default level
    let env = if cli.verbose {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();
    log::debug!("filestore dir: {}", cli.path.display());

    match cli.command {
        Commands::Init => init::execute(&cli.path),
        Commands::List(args) => list::execute(args, &open_store(&cli.path)?),
        Commands::Dump(args) => dump::execute(args, cli.format, &open_store(&cli.path)?),
        Commands::Load(args) => load::execute(args, &open_store(&cli.path)?),
        Commands::Convert(args) => convert::execute(args, cli.format),
    }
}

fn open_store(path: &std::path::Path) -> anyhow::Result<JsonFileBomStore> {
    JsonFileBomStore::open(path)
        .with_context(|| format!("Failed to open BOM store at {}", path.display()))
}
