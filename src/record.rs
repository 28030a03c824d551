//! Records describing how a read was assembled into a contig.

use std::num::ParseIntError;
use std::str::FromStr;

use crate::alignment;
use crate::alignment::Alignment;
use crate::core::Range;

/// The delimiter for an assembled-from record.
const DELIMITER: char = '\t';

/// The number of expected fields in an assembled-from record.
pub const NUM_FIELDS: usize = 6;

/// An error related to the parsing of an assembled-from record.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An incorrect number of fields.
    IncorrectNumberOfFields(usize),

    /// An invalid contig id.
    InvalidContigId(ParseIntError),

    /// An invalid read id.
    InvalidReadId(ParseIntError),

    /// An invalid contig start.
    InvalidContigStart(ParseIntError),

    /// An invalid contig end.
    InvalidContigEnd(ParseIntError),

    /// An invalid read start.
    InvalidReadStart(ParseIntError),

    /// An invalid read end.
    InvalidReadEnd(ParseIntError),

    /// The contig and read ranges don't align.
    InvalidAlignment(alignment::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "invalid number of fields in assembled-from record: expected {NUM_FIELDS} fields, \
                 found {n} fields"
            ),
            ParseError::InvalidContigId(err) => write!(f, "invalid contig id: {err}"),
            ParseError::InvalidReadId(err) => write!(f, "invalid read id: {err}"),
            ParseError::InvalidContigStart(err) => write!(f, "invalid contig start: {err}"),
            ParseError::InvalidContigEnd(err) => write!(f, "invalid contig end: {err}"),
            ParseError::InvalidReadStart(err) => write!(f, "invalid read start: {err}"),
            ParseError::InvalidReadEnd(err) => write!(f, "invalid read end: {err}"),
            ParseError::InvalidAlignment(err) => write!(f, "invalid alignment: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// One ungapped block of a read placed on a contig.
///
/// On the wire, this is a single tab-delimited line:
///
/// ```text
/// <contig id> <read id> <contig start> <contig end> <read start> <read end>
/// ```
///
/// A reverse placement has exactly one of the two ranges descending.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AssembledFrom {
    /// The contig the read was assembled into.
    contig_id: u64,

    /// The read.
    read_id: u64,

    /// The contig range, in the sense matching `read`.
    contig: Range,

    /// The read range.
    read: Range,
}

impl AssembledFrom {
    /// Attempts to create a new [`AssembledFrom`] record.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Range;
    /// use contigmap::record::AssembledFrom;
    ///
    /// let record = AssembledFrom::try_new(1, 7, Range::new(10, 14), Range::new(40, 36))?;
    /// assert_eq!(record.contig_id(), 1);
    /// assert_eq!(record.read_id(), 7);
    /// assert_eq!(record.to_string(), "1\t7\t10\t14\t40\t36");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(
        contig_id: u64,
        read_id: u64,
        contig: Range,
        read: Range,
    ) -> Result<Self, ParseError> {
        Alignment::try_new(contig, read).map_err(ParseError::InvalidAlignment)?;

        Ok(Self {
            contig_id,
            read_id,
            contig,
            read,
        })
    }

    /// Creates a record from an alignment whose reference is a contig and
    /// whose subject is a read.
    pub fn from_alignment(contig_id: u64, read_id: u64, alignment: &Alignment) -> Self {
        Self {
            contig_id,
            read_id,
            contig: alignment.reference(),
            read: alignment.subject(),
        }
    }

    /// Gets the contig id.
    pub fn contig_id(&self) -> u64 {
        self.contig_id
    }

    /// Gets the read id.
    pub fn read_id(&self) -> u64 {
        self.read_id
    }

    /// Gets the contig range.
    pub fn contig(&self) -> Range {
        self.contig
    }

    /// Gets the read range.
    pub fn read(&self) -> Range {
        self.read
    }

    /// Gets the record as an [`Alignment`] from the read onto the contig.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    /// use contigmap::record::AssembledFrom;
    ///
    /// let record = "1\t7\t10\t14\t40\t36".parse::<AssembledFrom>()?;
    /// let alignment = record.to_alignment();
    ///
    /// assert_eq!(alignment.subject(), Range::new(36, 40));
    /// assert_eq!(alignment.reference(), Range::new(14, 10));
    /// assert_eq!(alignment.direction(), Direction::Reverse);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_alignment(&self) -> Alignment {
        Alignment::normalized(self.contig, self.read)
    }
}

impl std::fmt::Display for AssembledFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            self.contig_id,
            self.read_id,
            self.contig.start(),
            self.contig.end(),
            self.read.start(),
            self.read.end()
        )
    }
}

impl FromStr for AssembledFrom {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(DELIMITER).collect::<Vec<_>>();

        if fields.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(fields.len()));
        }

        let contig_id = fields[0].parse().map_err(ParseError::InvalidContigId)?;
        let read_id = fields[1].parse().map_err(ParseError::InvalidReadId)?;
        let contig_start = fields[2].parse().map_err(ParseError::InvalidContigStart)?;
        let contig_end = fields[3].parse().map_err(ParseError::InvalidContigEnd)?;
        let read_start = fields[4].parse().map_err(ParseError::InvalidReadStart)?;
        let read_end = fields[5].parse().map_err(ParseError::InvalidReadEnd)?;

        Self::try_new(
            contig_id,
            read_id,
            Range::new(contig_start, contig_end),
            Range::new(read_start, read_end),
        )
    }
}
