//! fluxmap CLI
//!
//! Resolves the Flux Kustomizations of a repository into a tree and prints
//! it, or hands one of them to the flux CLI.

mod cli;
mod commands;
mod error;

use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use colored::Colorize;
use fluxmap_render::FluxAction;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::show::ShowMode;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let Some(command) = cli.command else {
        println!("{} Flux repository map", "fluxmap".green().bold());
        println!();
        println!("Run {} for available commands.", "fluxmap --help".cyan());
        return Ok(());
    };

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    execute_command(command, &root, cli.config.as_deref())
}

fn execute_command(cmd: Commands, root: &Path, config: Option<&Path>) -> Result<()> {
    let mut resolution = commands::resolve(root, config)?;
    match cmd {
        Commands::List { all, json } => commands::run_list(&resolution, all, json),
        Commands::Clusters { select, json } => {
            commands::run_clusters(&mut resolution, select.as_deref(), json)
        }
        Commands::Show {
            name,
            namespace,
            source,
            render,
        } => {
            let mode = if source {
                ShowMode::Source
            } else if render {
                ShowMode::Render
            } else {
                ShowMode::Summary
            };
            commands::run_show(&mut resolution, &name, namespace.as_deref(), mode)
        }
        Commands::Build { name, namespace } => {
            commands::run_flux(&resolution, FluxAction::Build, &name, namespace.as_deref())
        }
        Commands::Diff { name, namespace } => {
            commands::run_flux(&resolution, FluxAction::Diff, &name, namespace.as_deref())
        }
    }
}

/// Install the global subscriber.
///
/// `--verbose` forces DEBUG; otherwise `RUST_LOG` decides, defaulting to
/// errors only so that warnings do not interleave with command output.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!(log_file = ?log_file, "Logging initialised");
    Ok(())
}
