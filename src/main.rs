//! diff-panel - interactive layer of a webview diff panel
//!
//! Applies the host's viewed flags to a rendered diff, keeps the "viewed"
//! counter in sync and turns clicks on line numbers and file names into
//! open-file requests for the host.

mod channel;
mod config;
mod dom;
mod error;
mod messages;
mod names;
mod panel;
mod render;
mod resolver;
mod session;
mod viewed;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use crate::config::Config;
use crate::names::resolve_renamed_path;

#[derive(Parser)]
#[command(name = "diff-panel")]
#[command(about = "Interactive diff panel speaking JSON lines over stdio")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a panel session: host messages and clicks on stdin, commands on stdout
    Serve {
        /// Container id to render into
        #[arg(short, long)]
        destination: Option<String>,

        /// Default to side-by-side rendering when the host does not choose
        #[arg(long)]
        side_by_side: bool,

        /// Config file (default: ~/.diff-panel/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the current path for a displayed file name
    ResolveName {
        /// Displayed name, e.g. "{src → lib}/app.js"
        name: String,
    },

    /// Write a default config file
    InitConfig {
        /// Target path (default: ~/.diff-panel/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            destination,
            side_by_side,
            config,
        } => {
            cmd_serve(destination, side_by_side, config)?;
        }
        Commands::ResolveName { name } => {
            println!("{}", resolve_renamed_path(&name));
        }
        Commands::InitConfig { path } => {
            cmd_init_config(path)?;
        }
    }

    Ok(())
}

fn cmd_serve(destination: Option<String>, side_by_side: bool, config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    let config = config.with_overrides(side_by_side.then_some(true), destination);
    log::info!("serving panel into #{}", config.destination);

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    session::run(&config, stdin, stdout, io::stderr())
}

fn cmd_init_config(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(Config::default_path);
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }
    Config::create_default(&path)
        .with_context(|| format!("Failed to initialise {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
