use clap::{Parser, Subcommand};
use miette::{miette, Result};
use std::path::PathBuf;

use luac_dec_rs::cli;

#[derive(Parser)]
#[command(name = "luac-dec-rs")]
#[command(about = "Strict decoder and inspector for Lua 5.3 precompiled bytecode chunks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect chunk header and function tree
    Inspect {
        /// Input chunk file (luac output)
        input: PathBuf,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Dump every string observed while decoding
    Strings {
        /// Input chunk file
        input: PathBuf,
    },

    /// List decoded functions
    Funcs {
        /// Input chunk file
        input: PathBuf,

        /// Resolve which function owns this code address
        #[arg(long)]
        addr: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input, format } => {
            cli::inspect::inspect(&input, &format).map_err(|e| miette!(e))
        }
        Commands::Strings { input } => cli::strings::strings(&input).map_err(|e| miette!(e)),
        Commands::Funcs { input, addr } => cli::funcs::funcs(&input, addr).map_err(|e| miette!(e)),
    }
}
