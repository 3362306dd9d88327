use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strand",
    about = "strand: versioned storage for projects, blocks and sequences",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root; overrides the configured data and sequence directories
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage projects
    Project(ProjectArgs),
    /// Manage blocks inside a project
    Block(BlockArgs),
    /// Manage content-addressed sequences
    Sequence(SequenceArgs),
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project from a JSON manifest on stdin
    Create {
        /// Project id; generated when omitted
        id: Option<String>,
    },
    /// Print a project manifest
    Get {
        id: String,
        #[arg(short, long)]
        revision: Option<String>,
    },
    /// Replace a project manifest with JSON from stdin
    Put { id: String },
    /// Deep-merge JSON from stdin into a project manifest
    Merge { id: String },
    /// Delete a project and its history
    Delete { id: String },
    /// Commit pending block changes
    Save {
        id: String,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show project history
    Log {
        id: String,
        #[arg(long)]
        oneline: bool,
    },
    /// List stored projects
    List,
}

#[derive(Args)]
pub struct BlockArgs {
    #[command(subcommand)]
    pub command: BlockCommand,
}

#[derive(Subcommand)]
pub enum BlockCommand {
    /// Create a block from a JSON manifest on stdin
    Create {
        project: String,
        /// Block id; generated when omitted
        id: Option<String>,
    },
    /// Print a block manifest
    Get {
        project: String,
        id: String,
        #[arg(short, long)]
        revision: Option<String>,
    },
    /// Replace a block manifest with JSON from stdin
    Put { project: String, id: String },
    /// Deep-merge JSON from stdin into a block manifest
    Merge { project: String, id: String },
    /// Delete a block
    Delete { project: String, id: String },
    /// Find the project holding a block
    Find { id: String },
    /// Print the sequence a block references
    Sequence { project: String, id: String },
}

#[derive(Args)]
pub struct SequenceArgs {
    #[command(subcommand)]
    pub command: SequenceCommand,
}

#[derive(Subcommand)]
pub enum SequenceCommand {
    /// Store sequence text from stdin
    Put {
        /// Store under this hash instead of computing one
        #[arg(long)]
        hash: Option<String>,
    },
    /// Print a stored sequence
    Get { hash: String },
    /// Delete a stored sequence
    Delete { hash: String },
}
