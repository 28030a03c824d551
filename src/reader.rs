//! An assembly record file reader.

use std::io::BufRead;
use std::io::{self};
use std::iter;

use crate::line;
use crate::record::AssembledFrom;
use crate::Line;

pub mod groups;

pub use groups::Group;
pub use groups::Groups;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A line error.
    Line(line::ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Line(err) => write!(f, "line error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// An assembly record file reader.
///
/// Every line is either blank, a `#` comment, or one
/// [`AssembledFrom`] record.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates an assembly record file reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"1\t7\t22\t18\t1\t5\n";
    /// let reader = contigmap::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Consumes self and returns the inner reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::BufRead;
    ///
    /// let data = b"# header\n1\t7\t22\t18\t1\t5";
    /// let reader = contigmap::Reader::new(&data[..]);
    /// let mut lines = reader.into_inner().lines().map(|line| line.unwrap());
    ///
    /// assert_eq!(lines.next(), Some(String::from("# header")));
    /// assert_eq!(lines.next(), Some(String::from("1\t7\t22\t18\t1\t5")));
    /// assert_eq!(lines.next(), None);
    /// ```
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"# header\r\n1\t7\t22\t18\t1\t5";
    /// let mut reader = contigmap::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 10);
    /// assert_eq!(buffer, "# header");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 13);
    /// assert_eq!(buffer, "1\t7\t22\t18\t1\t5");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Attempts to read a [`Line`] from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::Line;
    ///
    /// let data = b"# header\n\n1\t7\t22\t18\t1\t5";
    /// let mut reader = contigmap::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    /// assert!(matches!(reader.read_line(&mut buffer)?, Some(Line::Comment(_))));
    /// assert!(matches!(reader.read_line(&mut buffer)?, Some(Line::Empty)));
    /// assert!(matches!(
    ///     reader.read_line(&mut buffer)?,
    ///     Some(Line::AssembledFrom(_))
    /// ));
    /// assert!(reader.read_line(&mut buffer)?.is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_line(&mut self, buffer: &mut String) -> Result<Option<Line>, Error> {
        let read = self.read_line_raw(buffer).map_err(Error::Io)?;

        match read {
            0 => Ok(None),
            _ => {
                let line = buffer.parse::<Line>().map_err(Error::Line)?;
                Ok(Some(line))
            }
        }
    }

    /// Attempts to read the next [`AssembledFrom`] record, skipping blank
    /// lines and comments.
    pub fn read_record(&mut self, buffer: &mut String) -> Result<Option<AssembledFrom>, Error> {
        loop {
            match self.read_line(buffer)? {
                None => return Ok(None),
                Some(Line::AssembledFrom(record)) => return Ok(Some(record)),
                Some(Line::Empty) | Some(Line::Comment(_)) => continue,
            }
        }
    }

    /// Returns an iterator over every [`Line`] in the underlying reader,
    /// including blank lines and comments.
    pub fn lines(&mut self) -> impl Iterator<Item = Result<Line, Error>> + '_ {
        let mut buffer = String::new();
        iter::from_fn(move || self.read_line(&mut buffer).transpose())
    }

    /// Returns an iterator over the records in the underlying reader,
    /// skipping blank lines and comments.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"# contig 1\n1\t7\t22\t18\t1\t5\n\n1\t7\t14\t10\t6\t10\n";
    /// let mut reader = contigmap::Reader::new(&data[..]);
    ///
    /// let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[1].to_string(), "1\t7\t14\t10\t6\t10");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn records(&mut self) -> impl Iterator<Item = Result<AssembledFrom, Error>> + '_ {
        let mut buffer = String::new();
        iter::from_fn(move || self.read_record(&mut buffer).transpose())
    }

    /// Returns an iterator over the runs of consecutive records that share a
    /// contig and a read.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"1\t7\t22\t18\t1\t5\n1\t7\t14\t10\t6\t10\n1\t8\t1\t4\t1\t4\n";
    /// let mut reader = contigmap::Reader::new(&data[..]);
    ///
    /// let groups = reader.groups().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(groups.len(), 2);
    /// assert_eq!(groups[0].read_id(), 7);
    /// assert_eq!(groups[0].records().len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn groups(&mut self) -> Groups<'_, T> {
        Groups::new(self)
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Reads a line from a buffered reader, dropping the line ending.
///
/// The returned count still includes the line ending.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();
    let n = reader.read_line(buffer)?;

    let content = buffer
        .strip_suffix(NEW_LINE)
        .map(|line| line.strip_suffix(CARRIAGE_RETURN).unwrap_or(line).len());

    if let Some(len) = content {
        buffer.truncate(len);
    }

    Ok(n)
}
