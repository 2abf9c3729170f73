use snafu::{ResultExt, Snafu, location};
use tracing::{debug, error, warn};

use crate::filesystem::FilesystemNode;
use crate::transcript::{LineError, TranscriptLine};

/// Replays a shell transcript and reconstructs the filesystem it walked.
///
/// The working directory is kept as a stack of child indices from the root,
/// so the builder never holds references into the tree it is mutating.
#[derive(Debug)]
pub struct TreeBuilder {
    root: FilesystemNode,
    cwd: Vec<usize>,
    line_number: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            root: FilesystemNode::root(),
            cwd: Vec::new(),
            line_number: 0,
        }
    }

    /// Builds a tree from transcript lines in a single pass.
    pub fn build<I, S>(lines: I) -> Result<FilesystemNode, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for line in lines {
            builder.feed(line.as_ref())?;
        }
        debug!("Built tree from {} transcript lines", builder.line_number);
        Ok(builder.finish())
    }

    /// Applies a single transcript line.
    pub fn feed(&mut self, line: &str) -> Result<(), BuildError> {
        self.line_number += 1;
        let line_number = self.line_number;

        if line.trim().is_empty() {
            debug!("Skipping blank line {}", line_number);
            return Ok(());
        }

        let parsed = TranscriptLine::parse(line).context(ParseSnafu { line_number, line })?;
        match parsed {
            TranscriptLine::CdRoot => {
                self.cwd.clear();
                debug!("cd /  # {}", self.pwd_path());
            }
            TranscriptLine::CdUp => {
                if self.cwd.pop().is_none() {
                    return AboveRootSnafu { line_number }.fail();
                }
                debug!("cd ..  # {}", self.pwd_path());
            }
            TranscriptLine::Cd(name) => self.cd(name, line_number)?,
            TranscriptLine::Ls => {}
            TranscriptLine::Dir(name) => self.add(FilesystemNode::directory(name)),
            TranscriptLine::File { name, size } => self.add(FilesystemNode::file(name, size)),
        }

        Ok(())
    }

    pub fn finish(self) -> FilesystemNode {
        self.root
    }

    /// Absolute path of the current working directory, e.g. `/a/e`.
    pub fn pwd_path(&self) -> String {
        let mut node = &self.root;
        let mut path = String::new();
        for &index in &self.cwd {
            node = &node.children()[index];
            path.push('/');
            path.push_str(node.name());
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    fn pwd(&self) -> &FilesystemNode {
        self.cwd
            .iter()
            .fold(&self.root, |node, &index| &node.children()[index])
    }

    fn pwd_mut(&mut self) -> Option<&mut FilesystemNode> {
        self.cwd
            .iter()
            .try_fold(&mut self.root, |node, &index| node.child_at_mut(index))
    }

    fn cd(&mut self, name: &str, line_number: usize) -> Result<(), BuildError> {
        let pwd = self.pwd();
        let Some(index) = pwd.child_position(name) else {
            return NoSuchDirectorySnafu {
                line_number,
                name,
                pwd: self.pwd_path(),
            }
            .fail();
        };
        if !pwd.children()[index].is_directory() {
            return NotADirectorySnafu {
                line_number,
                name,
                pwd: self.pwd_path(),
            }
            .fail();
        }

        self.cwd.push(index);
        debug!("cd {}  # {}", name, self.pwd_path());
        Ok(())
    }

    fn add(&mut self, node: FilesystemNode) {
        let line_number = self.line_number;
        let is_directory = node.is_directory();
        let Some(pwd) = self.pwd_mut() else {
            error!(
                "Assumption that the working directory stack only holds directories failed {}",
                location!()
            );
            return;
        };

        match pwd.insert_child(node) {
            Ok(None) => {}
            Ok(Some(existing)) if existing.is_directory() != is_directory => {
                warn!(
                    "Line {}: '{}' was already listed as a {}, keeping it",
                    line_number,
                    existing.name(),
                    if existing.is_directory() { "directory" } else { "file" }
                );
            }
            Ok(Some(existing)) => {
                debug!("Line {}: '{}' already listed", line_number, existing.name());
            }
            Err(rejected) => {
                error!(
                    "Assumption that the working directory is a directory failed for '{}' {}",
                    rejected.name(),
                    location!()
                );
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Line {}: cannot parse '{}'", line_number, line))]
    ParseError {
        line_number: usize,
        line: String,
        source: LineError,
    },
    #[snafu(display("Line {}: cannot leave the root directory with 'cd ..'", line_number))]
    AboveRoot { line_number: usize },
    #[snafu(display(
        "Line {}: no directory named '{}' has been listed in {}",
        line_number,
        name,
        pwd
    ))]
    NoSuchDirectory {
        line_number: usize,
        name: String,
        pwd: String,
    },
    #[snafu(display("Line {}: '{}' in {} is a file, not a directory", line_number, name, pwd))]
    NotADirectory {
        line_number: usize,
        name: String,
        pwd: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    const TWO_LEVELS: &[&str] = &[
        "$ cd /",
        "$ ls",
        "dir a",
        "100 b.txt",
        "$ cd a",
        "$ ls",
        "200 c.txt",
    ];

    #[test]
    fn builds_nested_tree() {
        let root = TreeBuilder::build(TWO_LEVELS).unwrap();

        let mut a = FilesystemNode::directory("a");
        a.insert_child(FilesystemNode::file("c.txt", 200)).unwrap();
        let mut expected = FilesystemNode::root();
        expected.insert_child(a).unwrap();
        expected
            .insert_child(FilesystemNode::file("b.txt", 100))
            .unwrap();

        assert_eq!(root, expected);
    }

    #[test]
    fn empty_listing_yields_empty_root() {
        let root = TreeBuilder::build(["$ cd /", "$ ls"]).unwrap();
        assert_eq!(root, FilesystemNode::root());
    }

    #[test]
    fn relisting_a_directory_is_idempotent() {
        let mut relisted = TWO_LEVELS.to_vec();
        relisted.extend(["$ cd ..", "$ ls", "dir a", "100 b.txt", "$ cd a", "$ ls", "200 c.txt"]);

        let once = TreeBuilder::build(TWO_LEVELS).unwrap();
        let twice = TreeBuilder::build(relisted).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn first_observation_wins_on_conflicts() {
        let root = TreeBuilder::build(["$ cd /", "$ ls", "10 x", "dir x", "99 x"]).unwrap();
        assert_eq!(root.children(), &[FilesystemNode::file("x", 10)]);
    }

    #[test]
    fn cd_root_resets_the_stack() {
        let mut builder = TreeBuilder::new();
        for line in TWO_LEVELS {
            builder.feed(line).unwrap();
        }
        assert_eq!(builder.pwd_path(), "/a");

        builder.feed("$ cd /").unwrap();
        assert_eq!(builder.pwd_path(), "/");

        builder.feed("7 d.txt").unwrap();
        let root = builder.finish();
        assert_eq!(root.child("d.txt"), Some(&FilesystemNode::file("d.txt", 7)));
    }

    #[test]
    fn cd_up_returns_to_parent() {
        let mut builder = TreeBuilder::new();
        for line in ["$ cd /", "$ ls", "dir a", "$ cd a", "$ ls", "dir b", "$ cd b"] {
            builder.feed(line).unwrap();
        }
        assert_eq!(builder.pwd_path(), "/a/b");

        builder.feed("$ cd ..").unwrap();
        assert_eq!(builder.pwd_path(), "/a");
    }

    #[test]
    fn cd_up_at_root_fails() {
        let result = TreeBuilder::build(["$ cd /", "$ cd .."]);
        assert!(matches!(result, Err(BuildError::AboveRoot { line_number: 2 })));
    }

    #[test]
    fn cd_into_unlisted_directory_fails() {
        let result = TreeBuilder::build(["$ cd /", "$ ls", "dir a", "$ cd a", "$ cd b"]);

        match result {
            Err(BuildError::NoSuchDirectory {
                line_number,
                name,
                pwd,
            }) => {
                assert_eq!(line_number, 5);
                assert_eq!(name, "b");
                assert_eq!(pwd, "/a");
            }
            other => panic!("Expected NoSuchDirectory, got {other:?}"),
        }
    }

    #[test]
    fn cd_into_file_fails() {
        let result = TreeBuilder::build(["$ cd /", "$ ls", "10 a", "$ cd a"]);
        assert!(matches!(
            result,
            Err(BuildError::NotADirectory { line_number: 4, .. })
        ));
    }

    #[rstest]
    #[case("$ pwd")]
    #[case("nonsense")]
    #[case("12x file")]
    #[case("dir ")]
    fn malformed_lines_fail_fast(#[case] bad_line: &str) {
        let result = TreeBuilder::build(["$ cd /", "$ ls", bad_line, "10 never.txt"]);

        match result {
            Err(BuildError::ParseError {
                line_number, line, ..
            }) => {
                assert_eq!(line_number, 3);
                assert_eq!(line, bad_line);
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let root = TreeBuilder::build(["$ cd /", "", "$ ls", "   ", "5 a"]).unwrap();
        assert_eq!(root.children(), &[FilesystemNode::file("a", 5)]);
    }

    #[test]
    fn error_messages_include_line_and_path() {
        let err = TreeBuilder::build(["$ cd /", "$ ls", "dir a", "$ cd a", "$ cd zz"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Line 5"));
        assert!(message.contains("'zz'"));
        assert!(message.contains("/a"));
    }
}
