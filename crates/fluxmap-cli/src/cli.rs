//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fluxmap - See how the Flux Kustomizations of a repository fit together
#[derive(Parser, Debug)]
#[command(name = "fluxmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short, long, global = true, env = "FLUXMAP_ROOT")]
    pub root: Option<PathBuf>,

    /// Resolver settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List Kustomizations, most children first
    ///
    /// Bases consumed by an overlay are hidden unless --all is given.
    List {
        /// Include hidden bases
        #[arg(short, long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the cluster tree
    ///
    /// Examples:
    ///   fluxmap clusters
    ///   fluxmap clusters --select staging/dev
    Clusters {
        /// Highlight a branch, names separated by '/'
        #[arg(short, long)]
        select: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one Kustomization and its relations
    Show {
        /// Kustomization name
        name: String,

        /// Namespace, when the name is ambiguous
        #[arg(short, long)]
        namespace: Option<String>,

        /// Print the raw source document instead
        #[arg(long, conflicts_with = "render")]
        source: bool,

        /// Print the rendered Kustomization document
        #[arg(long)]
        render: bool,
    },

    /// Run `flux build kustomization` for a Kustomization
    Build {
        /// Kustomization name
        name: String,

        /// Namespace, when the name is ambiguous
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Run `flux diff kustomization` for a Kustomization
    Diff {
        /// Kustomization name
        name: String,

        /// Namespace, when the name is ambiguous
        #[arg(short, long)]
        namespace: Option<String>,
    },
}
