use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::LimitOverrides;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub input: PathBuf,
    pub root: PathBuf,
    pub overrides: LimitOverrides,
    pub print_tree: bool,
}

impl RuntimeConfig {
    pub fn input_path(&self) -> PathBuf {
        self.root.join(&self.input)
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            root: cli.root,
            overrides: LimitOverrides {
                small_directory_threshold: cli.threshold,
                disk_capacity: cli.capacity,
                required_free_space: cli.required_free,
            },
            print_tree: cli.print_tree,
        }
    }
}
