//! Per-column consensus calling.
//!
//! An [`Algorithm`] folds the bases that every read contributes to one contig
//! column into a single best base and a confidence score. The
//! [sweep](sweep) drives an algorithm across every column of a contig.
//!
//! ```
//! use contigmap::consensus::Algorithm as _;
//! use contigmap::consensus::Majority;
//! use contigmap::core::Direction;
//! use contigmap::read::Chemistry;
//!
//! let mut algorithm = Majority::default();
//!
//! algorithm.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
//! algorithm.add_base(b'A', 20, Direction::Reverse, Chemistry::Primer)?;
//! algorithm.add_base(b'C', 40, Direction::Forward, Chemistry::Terminator)?;
//!
//! assert_eq!(algorithm.best_base(), b'A');
//! assert_eq!(algorithm.best_score(), 50);
//! assert_eq!(algorithm.read_count(), 3);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::str::FromStr;

use crate::core::Direction;
use crate::read;
use crate::read::Chemistry;

pub mod bayesian;
pub mod majority;
pub mod sweep;

pub use bayesian::Bayesian;
pub use majority::Majority;
pub use sweep::Consensus;

/// The symbols a column can be called as, in scan order.
pub const SYMBOLS: [u8; 5] = [b'A', b'C', b'G', b'T', read::PAD];

/// The base reported for a column with no contributions.
pub const NO_CALL: u8 = b'N';

/// The highest score an algorithm reports.
pub const MAX_SCORE: u8 = 99;

/// An error related to a contribution to a column.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The strand of the contributing read is unknown.
    UnknownStrand,

    /// The chemistry of the contributing read is unknown.
    UnknownChemistry,

    /// The base is not one of [`SYMBOLS`].
    InvalidBase(u8),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownStrand => write!(f, "strand must be known"),
            Error::UnknownChemistry => write!(f, "chemistry must be known"),
            Error::InvalidBase(base) => write!(f, "invalid base: {}", base.escape_ascii()),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A per-column base caller.
///
/// Callers [`reset()`](Algorithm::reset) the algorithm before every column;
/// no state carries over between columns.
pub trait Algorithm: std::fmt::Debug + Send {
    /// Clears every accumulator.
    fn reset(&mut self);

    /// Folds one read's contribution into the column.
    ///
    /// Contributions with an unknown strand or chemistry, or with a base
    /// outside [`SYMBOLS`], are rejected and leave the column unchanged.
    fn add_base(
        &mut self,
        base: u8,
        quality: u8,
        strand: Direction,
        chemistry: Chemistry,
    ) -> Result<()>;

    /// Gets the winning base ([`NO_CALL`] for an empty column).
    fn best_base(&self) -> u8;

    /// Gets the score of the winning base (zero for an empty column).
    fn best_score(&self) -> u8;

    /// Gets the score of an arbitrary base, or `None` if the base is not one
    /// of [`SYMBOLS`].
    fn score_for_base(&self, base: u8) -> Option<u8>;

    /// Gets the number of contributions folded since the last reset.
    fn read_count(&self) -> usize;
}

/// A validated contribution: the index of the symbol in [`SYMBOLS`] and the
/// index of the strand and chemistry category.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Contribution {
    /// The index into [`SYMBOLS`].
    pub(crate) symbol: usize,

    /// The strand and chemistry category (`0..4`).
    pub(crate) category: usize,
}

impl Contribution {
    /// Validates a contribution.
    pub(crate) fn try_new(base: u8, strand: Direction, chemistry: Chemistry) -> Result<Self> {
        let symbol = symbol_index(base).ok_or(Error::InvalidBase(base))?;

        let strand = match strand {
            Direction::Forward => 0,
            Direction::Reverse => 1,
            Direction::Unknown => return Err(Error::UnknownStrand),
        };

        let chemistry = match chemistry {
            Chemistry::Primer => 0,
            Chemistry::Terminator => 1,
            Chemistry::Unknown => return Err(Error::UnknownChemistry),
        };

        Ok(Self {
            symbol,
            category: strand * 2 + chemistry,
        })
    }
}

/// Gets the index of a base in [`SYMBOLS`], ignoring case.
pub(crate) fn symbol_index(base: u8) -> Option<usize> {
    let base = base.to_ascii_uppercase();
    SYMBOLS.iter().position(|symbol| *symbol == base)
}

/// The consensus algorithms available.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Kind {
    /// A quality-weighted majority vote.
    Majority,

    /// A Bayesian model over strand and chemistry groups.
    #[default]
    Bayesian,
}

impl Kind {
    /// Builds a fresh algorithm of this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::consensus::Kind;
    ///
    /// let algorithm = "majority".parse::<Kind>()?.build();
    /// assert_eq!(algorithm.read_count(), 0);
    /// assert_eq!(algorithm.best_base(), b'N');
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build(&self) -> Box<dyn Algorithm> {
        match self {
            Kind::Majority => Box::<Majority>::default(),
            Kind::Bayesian => Box::<Bayesian>::default(),
        }
    }
}

/// An error related to the parsing of a [`Kind`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseKindError(String);

impl std::fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid consensus algorithm: expected `majority` or `bayesian`, found `{}`",
            self.0
        )
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "majority" => Ok(Kind::Majority),
            "bayesian" => Ok(Kind::Bayesian),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Majority => write!(f, "majority"),
            Kind::Bayesian => write!(f, "bayesian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributions_require_known_strand_and_chemistry() {
        assert_eq!(
            Contribution::try_new(b'A', Direction::Unknown, Chemistry::Primer),
            Err(Error::UnknownStrand)
        );
        assert_eq!(
            Contribution::try_new(b'A', Direction::Forward, Chemistry::Unknown),
            Err(Error::UnknownChemistry)
        );
        assert_eq!(
            Contribution::try_new(b'N', Direction::Forward, Chemistry::Primer),
            Err(Error::InvalidBase(b'N'))
        );
        assert_eq!(
            Contribution::try_new(b'g', Direction::Reverse, Chemistry::Terminator),
            Ok(Contribution {
                symbol: 2,
                category: 3
            })
        );
    }

    #[test]
    fn every_kind_rejects_invalid_contributions() {
        for kind in [Kind::Majority, Kind::Bayesian] {
            let mut algorithm = kind.build();

            assert!(algorithm
                .add_base(b'A', 30, Direction::Unknown, Chemistry::Primer)
                .is_err());
            assert!(algorithm
                .add_base(b'X', 30, Direction::Forward, Chemistry::Primer)
                .is_err());

            assert_eq!(algorithm.read_count(), 0);
            assert_eq!(algorithm.best_base(), NO_CALL);
            assert_eq!(algorithm.best_score(), 0);
            assert_eq!(algorithm.score_for_base(b'X'), None);
        }
    }

    #[test]
    fn kinds_parse_and_display() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!("Bayesian".parse::<Kind>()?, Kind::Bayesian);
        assert_eq!(Kind::Majority.to_string(), "majority");

        let err = "vote".parse::<Kind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid consensus algorithm: expected `majority` or `bayesian`, found `vote`"
        );

        Ok(())
    }

    #[test]
    fn reset_clears_every_kind() -> std::result::Result<(), Box<dyn std::error::Error>> {
        for kind in [Kind::Majority, Kind::Bayesian] {
            let mut algorithm = kind.build();
            algorithm.add_base(b'T', 40, Direction::Forward, Chemistry::Primer)?;
            assert_eq!(algorithm.best_base(), b'T');

            algorithm.reset();
            assert_eq!(algorithm.read_count(), 0);
            assert_eq!(algorithm.best_base(), NO_CALL);

            algorithm.add_base(b'G', 40, Direction::Reverse, Chemistry::Terminator)?;
            assert_eq!(algorithm.best_base(), b'G');
        }

        Ok(())
    }
}
