use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deckgrid", version)]
#[command(about = "Paged canvas drag-and-drop engine: validate configs and replay interactions")]
pub struct Cli {
    /// Path to config file (default: built-in defaults).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Option<Sub>,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file.
    Validate {
        /// Path to config file (default: built-in defaults).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a scripted interaction and print what happened as JSON.
    Replay {
        /// Path to the script, a JSON array of commands.
        script: PathBuf,
        /// Path to config file (default: built-in defaults).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print only the final state.
        #[arg(long)]
        final_only: bool,
    },
}
