//! The direction in which a subject aligns to a reference.

use std::io;
use std::str::FromStr;

/// An error related to the parsing of a direction.
#[derive(Debug)]
pub struct ParseDirectionError(io::Error);

impl std::fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse direction error: {}", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

/// The relative orientation of a subject and a reference.
///
/// A direction can only be inferred from a range whose endpoints differ (or
/// from the relative order of two distinct single-base blocks). With no such
/// evidence, the direction is [`Direction::Unknown`], and it stays unknown
/// through any downstream composition.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// The subject runs in the same sense as the reference (`+`).
    Forward,

    /// The subject is reverse-complemented relative to the reference (`-`).
    Reverse,

    /// No evidence is available to determine the orientation (`?`).
    #[default]
    Unknown,
}

impl Direction {
    /// Returns whether the direction is determinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    ///
    /// assert!(Direction::Forward.is_known());
    /// assert!(Direction::Reverse.is_known());
    /// assert!(!Direction::Unknown.is_known());
    /// ```
    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }

    /// Returns the opposite direction. [`Direction::Unknown`] stays unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    ///
    /// assert_eq!(Direction::Forward.flip(), Direction::Reverse);
    /// assert_eq!(Direction::Reverse.flip(), Direction::Forward);
    /// assert_eq!(Direction::Unknown.flip(), Direction::Unknown);
    /// ```
    pub fn flip(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
            Direction::Unknown => Direction::Unknown,
        }
    }

    /// Gets the direction of a chain of two mappings: `self` maps a subject
    /// onto an intermediate space and `other` maps that space onto a
    /// reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    ///
    /// assert_eq!(
    ///     Direction::Reverse.compose(Direction::Reverse),
    ///     Direction::Forward
    /// );
    /// assert_eq!(
    ///     Direction::Forward.compose(Direction::Reverse),
    ///     Direction::Reverse
    /// );
    /// assert_eq!(
    ///     Direction::Unknown.compose(Direction::Forward),
    ///     Direction::Unknown
    /// );
    /// ```
    pub fn compose(self, other: Direction) -> Direction {
        match (self, other) {
            (Direction::Unknown, _) | (_, Direction::Unknown) => Direction::Unknown,
            (a, b) if a == b => Direction::Forward,
            _ => Direction::Reverse,
        }
    }

    /// The sign applied to offsets travelling in this direction.
    pub(crate) fn sign(&self) -> i64 {
        match self {
            Direction::Reverse => -1,
            Direction::Forward | Direction::Unknown => 1,
        }
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Forward),
            "-" => Ok(Self::Reverse),
            "?" => Ok(Self::Unknown),
            c => Err(ParseDirectionError(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is not a valid direction", c),
            ))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "+"),
            Direction::Reverse => write!(f, "-"),
            Direction::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() -> Result<(), Box<dyn std::error::Error>> {
        let direction: Direction = "+".parse()?;
        assert_eq!(direction, Direction::Forward);

        let direction: Direction = "-".parse()?;
        assert_eq!(direction, Direction::Reverse);

        let direction: Direction = "?".parse()?;
        assert_eq!(direction, Direction::Unknown);

        let err = "x".parse::<Direction>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse direction error: x is not a valid direction"
        );

        Ok(())
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Forward.to_string(), "+");
        assert_eq!(Direction::Reverse.to_string(), "-");
        assert_eq!(Direction::Unknown.to_string(), "?");
    }

    #[test]
    fn test_unknown_propagates_through_composition() {
        for other in [Direction::Forward, Direction::Reverse, Direction::Unknown] {
            assert_eq!(Direction::Unknown.compose(other), Direction::Unknown);
            assert_eq!(other.compose(Direction::Unknown), Direction::Unknown);
        }
    }
}
