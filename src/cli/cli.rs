use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Rebuilds a filesystem from a shell transcript and reports directory sizes.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The transcript to replay, relative to the root directory
    #[clap(default_value = "data/day7_input.txt")]
    pub input: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Largest directory size counted by part 1
    #[clap(long)]
    pub threshold: Option<u64>,
    /// Total disk capacity used by part 2
    #[clap(long)]
    pub capacity: Option<u64>,
    /// Free space part 2 has to reach
    #[clap(long)]
    pub required_free: Option<u64>,

    /// Print the reconstructed tree before the answers
    #[clap(long)]
    pub print_tree: bool,
}
