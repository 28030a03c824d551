//! A line within an assembly record file.

use std::str::FromStr;

use crate::record;
use crate::record::AssembledFrom;

/// The prefix of a comment line.
pub const COMMENT_PREFIX: char = '#';

/// An error associated with parsing a line.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An invalid assembled-from record.
    InvalidAssembledFrom(record::ParseError, String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidAssembledFrom(err, line) => {
                write!(f, "invalid assembled-from record: {err}\n\nline: {line}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A line within an assembly record file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line {
    /// An empty (or whitespace-only) line.
    Empty,

    /// A comment, without its prefix.
    Comment(String),

    /// A record placing part of a read onto a contig.
    AssembledFrom(AssembledFrom),
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Empty => write!(f, ""),
            Line::Comment(comment) => write!(f, "{COMMENT_PREFIX}{comment}"),
            Line::AssembledFrom(record) => write!(f, "{record}"),
        }
    }
}

impl FromStr for Line {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Ok(Self::Empty)
        } else if let Some(comment) = s.strip_prefix(COMMENT_PREFIX) {
            Ok(Self::Comment(comment.to_string()))
        } else {
            s.parse::<AssembledFrom>()
                .map(Line::AssembledFrom)
                .map_err(|e| ParseError::InvalidAssembledFrom(e, s.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_record_line() -> Result<(), Box<dyn std::error::Error>> {
        let line = "1\t7\t22\t18\t1\t5".parse::<Line>()?;

        match &line {
            Line::AssembledFrom(record) => {
                assert_eq!(record.contig_id(), 1);
                assert_eq!(record.read_id(), 7);
            }
            _ => panic!("expected a record, found {line:?}"),
        }

        assert_eq!(line.to_string(), "1\t7\t22\t18\t1\t5");

        Ok(())
    }

    #[test]
    fn it_parses_comments_and_blank_lines() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!("".parse::<Line>()?, Line::Empty);
        assert_eq!("  \t".parse::<Line>()?, Line::Empty);

        let comment = "# contig 1".parse::<Line>()?;
        assert_eq!(comment, Line::Comment(String::from(" contig 1")));
        assert_eq!(comment.to_string(), "# contig 1");

        Ok(())
    }

    #[test]
    fn it_reports_the_offending_line() {
        let err = "1\t7\t22".parse::<Line>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid assembled-from record: invalid number of fields in assembled-from record: \
             expected 6 fields, found 3 fields\n\nline: 1\t7\t22"
        );
    }
}
