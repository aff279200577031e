#[macro_use]
extern crate tracing;

use std::error::Error;
use std::path::Path;
use std::{env, io, process};

use clap::Parser;
use deckgrid::animation::Clock;
use deckgrid::cli::{Cli, Sub};
use deckgrid::layout::Canvas;
use deckgrid::replay::{self, Script};
use deckgrid_config::Config;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "deckgrid=debug,deckgrid_config=debug";

fn main() -> Result<(), Box<dyn Error>> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    match cli.subcommand {
        Some(Sub::Validate { config }) => {
            if let Err(err) = load_config(config.as_deref()) {
                warn!("{err:?}");
                process::exit(1);
            }
            info!("config is valid");
        }
        Some(Sub::Replay {
            script,
            config,
            final_only,
        }) => {
            let config = load_config(config.as_deref())?;
            let script = Script::load(&script)?;
            let report = replay::run(&config, &script)?;

            let stdout = io::stdout().lock();
            if final_only {
                serde_json::to_writer_pretty(stdout, &report.final_state)?;
            } else {
                serde_json::to_writer_pretty(stdout, &report)?;
            }
            println!();
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            let canvas = Canvas::new(Clock::new(), &config);
            serde_json::to_writer_pretty(io::stdout().lock(), &canvas.snapshot())?;
            println!();
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> miette::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            debug!("no config file given, using the defaults");
            Ok(Config::default())
        }
    }
}
