use std::num::ParseIntError;

use snafu::{OptionExt, ResultExt, Snafu, ensure};

/// A single record of a shell transcript.
///
/// Command lines start with `$ `, everything else is listing output of the
/// most recent `ls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptLine<'a> {
    CdRoot,
    CdUp,
    Cd(&'a str),
    Ls,
    Dir(&'a str),
    File { name: &'a str, size: u64 },
}

impl<'a> TranscriptLine<'a> {
    pub fn parse(line: &'a str) -> Result<Self, LineError> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        let (first, rest) = line.split_once(' ').context(MalformedSnafu)?;
        match (first, rest) {
            ("$", "ls") => Ok(TranscriptLine::Ls),
            ("$", "cd /") => Ok(TranscriptLine::CdRoot),
            ("$", "cd ..") => Ok(TranscriptLine::CdUp),
            ("$", command) => match command.split_once(' ') {
                Some(("cd", name)) => Ok(TranscriptLine::Cd(non_empty(name, "cd")?)),
                None if command == "cd" => MissingNameSnafu { form: "cd" }.fail(),
                _ => UnknownCommandSnafu { command }.fail(),
            },
            ("dir", name) => Ok(TranscriptLine::Dir(non_empty(name, "dir")?)),
            (size, name) => {
                ensure!(
                    size.starts_with(|c: char| c.is_ascii_digit()),
                    NoLeadingDigitSnafu { size }
                );
                let size = size.parse::<u64>().context(InvalidSizeSnafu { size })?;
                Ok(TranscriptLine::File {
                    name: non_empty(name, "file")?,
                    size,
                })
            }
        }
    }
}

fn non_empty<'a>(name: &'a str, form: &'static str) -> Result<&'a str, LineError> {
    if name.is_empty() {
        MissingNameSnafu { form }.fail()
    } else {
        Ok(name)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum LineError {
    #[snafu(display("Line has no space-separated fields"))]
    Malformed,
    #[snafu(display("Unknown command '{}'", command))]
    UnknownCommand { command: String },
    #[snafu(display("Missing name in '{}' entry", form))]
    MissingName { form: &'static str },
    #[snafu(display("Invalid file size '{}'", size))]
    InvalidSize { size: String, source: ParseIntError },
    #[snafu(display("Invalid file size '{}', expected a leading digit", size))]
    NoLeadingDigit { size: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("$ cd /", TranscriptLine::CdRoot)]
    #[case("$ cd ..", TranscriptLine::CdUp)]
    #[case("$ cd a", TranscriptLine::Cd("a"))]
    #[case("$ cd with space", TranscriptLine::Cd("with space"))]
    #[case("$ ls", TranscriptLine::Ls)]
    #[case("dir e", TranscriptLine::Dir("e"))]
    #[case("14848514 b.txt", TranscriptLine::File { name: "b.txt", size: 14848514 })]
    #[case("0 empty", TranscriptLine::File { name: "empty", size: 0 })]
    #[case("$ ls\r", TranscriptLine::Ls)]
    fn parses_valid_lines(#[case] line: &str, #[case] expected: TranscriptLine) {
        assert_eq!(TranscriptLine::parse(line), Ok(expected));
    }

    #[rstest]
    #[case("garbage")]
    #[case("$")]
    fn rejects_lines_without_fields(#[case] line: &str) {
        assert_eq!(TranscriptLine::parse(line), Err(LineError::Malformed));
    }

    #[rstest]
    #[case("$ pwd")]
    #[case("$ ls -la")]
    #[case("$ rm -rf d")]
    fn rejects_unknown_commands(#[case] line: &str) {
        assert!(matches!(
            TranscriptLine::parse(line),
            Err(LineError::UnknownCommand { .. })
        ));
    }

    #[rstest]
    #[case("$ cd", "cd")]
    #[case("$ cd ", "cd")]
    #[case("dir ", "dir")]
    #[case("12 ", "file")]
    fn rejects_missing_names(#[case] line: &str, #[case] expected_form: &str) {
        match TranscriptLine::parse(line) {
            Err(LineError::MissingName { form }) => assert_eq!(form, expected_form),
            other => panic!("Expected MissingName, got {other:?}"),
        }
    }

    #[rstest]
    #[case("-5 negative.txt")]
    #[case("+5 x")]
    #[case("12kb file")]
    #[case("file.txt 12")]
    fn rejects_invalid_sizes(#[case] line: &str) {
        let err = TranscriptLine::parse(line).unwrap_err();
        assert!(matches!(
            err,
            LineError::InvalidSize { .. } | LineError::NoLeadingDigit { .. }
        ));
        assert!(err.to_string().starts_with("Invalid file size"));
    }

    #[test]
    fn sizes_must_start_with_a_digit() {
        assert_eq!(
            TranscriptLine::parse("+5 x"),
            Err(LineError::NoLeadingDigit {
                size: "+5".to_string()
            })
        );
    }
}
