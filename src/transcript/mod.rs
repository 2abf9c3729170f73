//! Shell transcript input: reading the file and the per-line grammar.

mod line;
mod reader;

pub use line::{LineError, TranscriptLine};
pub use reader::{TranscriptReadError, read_transcript};
