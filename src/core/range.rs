//! A 1-based, fully-closed range consisting of a start and an end position.
//!
//! The direction of a range is inferred from its endpoints.
//!
//! ```text
//! | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 |
//! -------------------------------------
//! |   |   | X | X | X | X | X |   |   |  <= 3-7 (forward)
//! |   |   |   |   | X | X | X | X | X |  <= 9-5 (reverse)
//! |   |   |   | X |   |   |   |   |   |  <= 4-4 (unknown)
//! ```
//!
//! Both endpoints are included in the range, so `3-7` and `7-3` each cover
//! five positions.

use std::num::ParseIntError;
use std::str::FromStr;

use crate::core::Direction;
use crate::core::Placement;
use crate::core::Position;

/// The delimiter between the start and the end of a range.
const DELIMITER: char = '-';

/// An error related to the parsing of a range.
#[derive(Debug)]
pub enum ParseError {
    /// The value did not contain exactly one delimiter.
    InvalidFormat(String),

    /// An invalid start position.
    InvalidStart(ParseIntError),

    /// An invalid end position.
    InvalidEnd(ParseIntError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidFormat(value) => {
                write!(f, "expected `<start>{DELIMITER}<end>`, found `{value}`")
            }
            ParseError::InvalidStart(err) => write!(f, "invalid start: {err}"),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A 1-based, fully-closed range of positions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    /// The first position of the range.
    start: Position,

    /// The last position of the range.
    end: Position,
}

impl Range {
    /// Creates a new [`Range`].
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// let range = Range::new(3, 7);
    /// assert_eq!(range.start(), 3);
    /// assert_eq!(range.end(), 7);
    /// ```
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Gets the first position of the range.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Gets the last position of the range.
    pub fn end(&self) -> Position {
        self.end
    }

    /// Gets the lowest position covered by the range.
    pub fn low(&self) -> Position {
        self.start.min(self.end)
    }

    /// Gets the highest position covered by the range.
    pub fn high(&self) -> Position {
        self.start.max(self.end)
    }

    /// Gets the direction (sense) of the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// assert_eq!(Range::new(3, 7).direction(), Direction::Forward);
    /// assert_eq!(Range::new(7, 3).direction(), Direction::Reverse);
    /// assert_eq!(Range::new(4, 4).direction(), Direction::Unknown);
    /// ```
    pub fn direction(&self) -> Direction {
        match self.start.cmp(&self.end) {
            std::cmp::Ordering::Less => Direction::Forward,
            std::cmp::Ordering::Greater => Direction::Reverse,
            std::cmp::Ordering::Equal => Direction::Unknown,
        }
    }

    /// Gets the number of positions covered by the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// assert_eq!(Range::new(3, 7).length(), 5);
    /// assert_eq!(Range::new(7, 3).length(), 5);
    /// assert_eq!(Range::new(4, 4).length(), 1);
    /// ```
    pub fn length(&self) -> i64 {
        (self.end - self.start).abs() + 1
    }

    /// Indicates whether a position falls within the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// let range = Range::new(7, 3);
    /// assert!(range.contains(3));
    /// assert!(range.contains(7));
    /// assert!(!range.contains(8));
    /// ```
    pub fn contains(&self, position: Position) -> bool {
        self.low() <= position && position <= self.high()
    }

    /// Classifies a position relative to the range.
    pub fn placement(&self, position: Position) -> Placement {
        Placement::of(position, self.low(), self.high())
    }

    /// Returns the range with its start and end swapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// assert_eq!(Range::new(3, 7).reverse(), Range::new(7, 3));
    /// ```
    pub fn reverse(self) -> Self {
        Self::new(self.end, self.start)
    }

    /// Returns the range shifted by `delta`.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// assert_eq!(Range::new(3, 7).offset(10), Range::new(13, 17));
    /// assert_eq!(Range::new(3, 7).offset(-3), Range::new(0, 4));
    /// ```
    pub fn offset(self, delta: i64) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }

    /// Returns the range reflected around `pivot` (each end becomes
    /// `2 * pivot - end`). The direction of the range is flipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    ///
    /// assert_eq!(Range::new(3, 7).mirror(10), Range::new(17, 13));
    /// assert_eq!(Range::new(3, 7).mirror(0), Range::new(-3, -7));
    /// ```
    pub fn mirror(self, pivot: Position) -> Self {
        Self::new(2 * pivot - self.start, 2 * pivot - self.end)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.start, DELIMITER, self.end)
    }
}

impl FromStr for Range {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A leading minus sign belongs to the start position.
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == DELIMITER)
            .map(|(i, _)| i);

        let (start, end) = match split {
            Some(i) => (&s[..i], &s[i + 1..]),
            None => return Err(ParseError::InvalidFormat(s.to_string())),
        };

        let start = start.parse().map_err(ParseError::InvalidStart)?;
        let end = end.parse().map_err(ParseError::InvalidEnd)?;

        Ok(Self::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::Rng as _;
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn double_reverse_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let range = Range::new(rng.gen_range(-500..500), rng.gen_range(-500..500));
            assert_eq!(range.reverse().reverse(), range);
            assert_eq!(range.reverse().length(), range.length());
            assert_eq!(range.reverse().direction(), range.direction().flip());
        }
    }

    #[test]
    fn mirror_is_an_involution() {
        let range = Range::new(12, 40);
        assert_eq!(range.mirror(100).mirror(100), range);
        assert_eq!(range.mirror(100).length(), range.length());
    }

    #[test]
    fn parse_and_display() -> Result<(), Box<dyn std::error::Error>> {
        let range = "10-14".parse::<Range>()?;
        assert_eq!(range, Range::new(10, 14));
        assert_eq!(range.to_string(), "10-14");

        let range = "-3--7".parse::<Range>()?;
        assert_eq!(range, Range::new(-3, -7));

        let err = "10".parse::<Range>().unwrap_err();
        assert_eq!(err.to_string(), "expected `<start>-<end>`, found `10`");

        let err = "a-3".parse::<Range>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidStart(_)));

        Ok(())
    }
}
