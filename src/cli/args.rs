use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Learn shell commands in disposable sandboxes.
#[derive(Debug, Parser)]
#[command(name = "rootcamp", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file applied on top of the user and workspace layers
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory in which lab sandboxes are created
    #[arg(long, global = true, value_name = "DIR")]
    pub scratch_root: Option<PathBuf>,

    /// Use plain bash inside labs instead of $SHELL
    #[arg(long, global = true)]
    pub basic_shell: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the lesson catalog
    Lessons {
        /// Only lessons at this level (beginner, intermediate, advanced)
        #[arg(long)]
        level: Option<String>,

        /// Only lessons in this module
        #[arg(long)]
        module: Option<String>,

        /// Only lessons carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Print completion statistics
    Progress,

    /// Remove sandboxes left behind by earlier runs
    Gc,

    /// Forget all stored progress
    Reset,
}
