use derive_more::Display;
use snafu::{OptionExt, Snafu};

use crate::filesystem::FilesystemNode;

/// A directory of a resolved tree with its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{path} ({size})")]
pub struct DirectoryEntry {
    pub path: String,
    pub size: u64,
}

/// Every directory of a resolved tree, root first, in pre-order.
#[derive(Debug, Clone)]
pub struct DirectorySizes {
    entries: Vec<DirectoryEntry>,
}

impl DirectorySizes {
    pub fn collect(root: &FilesystemNode) -> Result<Self, QueryError> {
        let mut entries = Vec::new();
        Self::collect_recursive(root, String::new(), &mut entries)?;
        Ok(DirectorySizes { entries })
    }

    fn collect_recursive(
        node: &FilesystemNode,
        path: String,
        entries: &mut Vec<DirectoryEntry>,
    ) -> Result<(), QueryError> {
        if !node.is_directory() {
            return Ok(());
        }
        let path = if path.is_empty() { node.name().to_string() } else { path };
        let size = node.size().context(UnresolvedSnafu { path: path.clone() })?;
        entries.push(DirectoryEntry {
            path: path.clone(),
            size,
        });

        let prefix = path.trim_end_matches('/');
        for child in node.children() {
            Self::collect_recursive(child, format!("{}/{}", prefix, child.name()), entries)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter()
    }

    /// Size of the root directory, i.e. the space in use.
    pub fn used(&self) -> u64 {
        self.entries.first().map(|entry| entry.size).unwrap_or_default()
    }

    /// Sum of the sizes of all directories no larger than `threshold`.
    pub fn sum_at_most(&self, threshold: u64) -> Result<u64, QueryError> {
        self.entries
            .iter()
            .filter(|entry| entry.size <= threshold)
            .try_fold(0u64, |total, entry| total.checked_add(entry.size))
            .context(OverflowSnafu { threshold })
    }

    /// Space that must be freed so that `required_free` out of `capacity` is available.
    pub fn space_to_free(&self, capacity: u64, required_free: u64) -> u64 {
        required_free
            .saturating_add(self.used())
            .saturating_sub(capacity)
    }

    /// The smallest directory whose deletion frees enough space.
    pub fn smallest_to_free(
        &self,
        capacity: u64,
        required_free: u64,
    ) -> Result<&DirectoryEntry, QueryError> {
        let needed = self.space_to_free(capacity, required_free);
        self.entries
            .iter()
            .filter(|entry| entry.size >= needed)
            .min_by_key(|entry| entry.size)
            .context(NoCandidateSnafu { needed })
    }
}

/// The two puzzle answers, formatted as the program's output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("part 1 answer:  {part1}\npart 2 answer:  {part2}")]
pub struct Answers {
    pub part1: u64,
    pub part2: u64,
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum QueryError {
    #[snafu(display("Directory {} has no resolved size", path))]
    Unresolved { path: String },
    #[snafu(display("No directory is large enough to free {} units", needed))]
    NoCandidate { needed: u64 },
    #[snafu(display("Sum of directory sizes up to {} does not fit in 64 bits", threshold))]
    Overflow { threshold: u64 },
}
