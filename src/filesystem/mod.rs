//! In-memory filesystem tree reconstructed from a shell transcript.
//!
//! This module provides the node type, the transcript-driven builder, the
//! bottom-up size resolver and the aggregate queries over all directories.

mod builder;
mod queries;
mod render;
mod tree;

pub use builder::{BuildError, TreeBuilder};
pub use queries::{Answers, DirectorySizes, QueryError};
pub use render::{render_tree, stdout_supports_color};
pub use tree::{FilesystemNode, SizeOverflowError};
