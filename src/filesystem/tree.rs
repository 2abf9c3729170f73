use std::fmt;

use snafu::{OptionExt, Snafu};

pub const ROOT_NAME: &str = "/";

/// A node of the reconstructed filesystem, either a file or a directory.
///
/// Directories own their children in listing order. A directory's size is
/// `None` until [`FilesystemNode::resolve_sizes`] has aggregated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesystemNode {
    File {
        name: String,
        size: u64,
    },
    Directory {
        name: String,
        children: Vec<FilesystemNode>,
        size: Option<u64>,
    },
}

impl FilesystemNode {
    pub fn root() -> Self {
        Self::directory(ROOT_NAME)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        FilesystemNode::Directory {
            name: name.into(),
            children: Vec::new(),
            size: None,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        FilesystemNode::File {
            name: name.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FilesystemNode::File { name, .. } | FilesystemNode::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FilesystemNode::Directory { .. })
    }

    /// The node's size, or `None` for a directory that is not resolved yet.
    pub fn size(&self) -> Option<u64> {
        match self {
            FilesystemNode::File { size, .. } => Some(*size),
            FilesystemNode::Directory { size, .. } => *size,
        }
    }

    pub fn children(&self) -> &[FilesystemNode] {
        match self {
            FilesystemNode::File { .. } => &[],
            FilesystemNode::Directory { children, .. } => children,
        }
    }

    pub fn child_position(&self, name: &str) -> Option<usize> {
        self.children().iter().position(|child| child.name() == name)
    }

    /// Appends `node` unless a child with the same name already exists.
    ///
    /// Returns the existing child when the insertion was skipped, so callers can
    /// tell a repeated listing apart from a conflicting one. Inserting into a
    /// file is rejected by handing the node back.
    pub fn insert_child(
        &mut self,
        node: FilesystemNode,
    ) -> Result<Option<&FilesystemNode>, FilesystemNode> {
        match self {
            FilesystemNode::File { .. } => Err(node),
            FilesystemNode::Directory { children, size, .. } => {
                if let Some(index) = children.iter().position(|c| c.name() == node.name()) {
                    return Ok(Some(&children[index]));
                }
                children.push(node);
                *size = None;
                Ok(None)
            }
        }
    }

    pub(super) fn child_at_mut(&mut self, index: usize) -> Option<&mut FilesystemNode> {
        match self {
            FilesystemNode::File { .. } => None,
            FilesystemNode::Directory { children, .. } => children.get_mut(index),
        }
    }

    /// Computes and memoizes the size of every unresolved directory below and
    /// including this node, children before parents.
    pub fn resolve_sizes(&mut self) -> Result<u64, SizeOverflowError> {
        match self {
            FilesystemNode::File { size, .. } => Ok(*size),
            FilesystemNode::Directory {
                size: Some(size), ..
            } => Ok(*size),
            FilesystemNode::Directory {
                name,
                children,
                size,
            } => {
                let mut total: u64 = 0;
                for child in children.iter_mut() {
                    let child_size = child.resolve_sizes()?;
                    total = total
                        .checked_add(child_size)
                        .with_context(|| SizeOverflowSnafu { name: name.as_str() })?;
                }
                *size = Some(total);
                Ok(total)
            }
        }
    }
}

impl fmt::Display for FilesystemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilesystemNode::File { name, size } => write!(f, "{name} (file, size={size})"),
            FilesystemNode::Directory {
                name,
                size: Some(size),
                ..
            } => write!(f, "{name} (dir, size={size})"),
            FilesystemNode::Directory { name, .. } => write!(f, "{name} (dir)"),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("Total size of directory '{}' does not fit in 64 bits", name))]
pub struct SizeOverflowError {
    name: String,
}

#[cfg(test)]
impl FilesystemNode {
    pub fn child(&self, name: &str) -> Option<&FilesystemNode> {
        self.children().iter().find(|child| child.name() == name)
    }

    pub fn is_resolved(&self) -> bool {
        self.size().is_some() && self.children().iter().all(FilesystemNode::is_resolved)
    }
}
