//! Sequencing reads and an in-memory store of them.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// The symbol reported for a contig column in which a read has no base.
pub const PAD: u8 = b'*';

/// The highest quality value a base may carry.
pub const MAX_QUALITY: u8 = 99;

/// An error related to the parsing of a [`Chemistry`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseChemistryError(String);

impl std::fmt::Display for ParseChemistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid chemistry: {}", self.0)
    }
}

impl std::error::Error for ParseChemistryError {}

/// The sequencing chemistry used to produce a read.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Chemistry {
    /// Dye primer chemistry.
    Primer,

    /// Dye terminator chemistry.
    Terminator,

    /// The chemistry was not recorded.
    #[default]
    Unknown,
}

impl FromStr for Chemistry {
    type Err = ParseChemistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primer" => Ok(Chemistry::Primer),
            "terminator" => Ok(Chemistry::Terminator),
            "unknown" => Ok(Chemistry::Unknown),
            _ => Err(ParseChemistryError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Chemistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chemistry::Primer => write!(f, "primer"),
            Chemistry::Terminator => write!(f, "terminator"),
            Chemistry::Unknown => write!(f, "unknown"),
        }
    }
}

/// A sequencing read.
///
/// Both the DNA and the per-base qualities are optional: a read may be known
/// to an assembly before its sequence data has been loaded, or after that
/// data has been released.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Read {
    /// The numeric identifier.
    id: u64,

    /// The name, if one was recorded.
    name: Option<String>,

    /// The sequencing chemistry.
    chemistry: Chemistry,

    /// The bases, in read orientation.
    dna: Option<Vec<u8>>,

    /// The quality of every base.
    quality: Option<Vec<u8>>,
}

impl Read {
    /// Creates a new [`Read`] with no sequence data.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::read::Chemistry;
    /// use contigmap::read::Read;
    ///
    /// let read = Read::new(7)
    ///     .with_name("read7")
    ///     .with_chemistry(Chemistry::Terminator)
    ///     .with_sequence(b"ACGT".to_vec(), vec![30, 31, 32, 120]);
    ///
    /// assert_eq!(read.id(), 7);
    /// assert_eq!(read.name(), Some("read7"));
    /// assert_eq!(read.dna(), Some(&b"ACGT"[..]));
    ///
    /// // Qualities are clamped.
    /// assert_eq!(read.quality(), Some(&[30, 31, 32, 99][..]));
    /// ```
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Sets the name of the read.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the chemistry of the read.
    pub fn with_chemistry(mut self, chemistry: Chemistry) -> Self {
        self.chemistry = chemistry;
        self
    }

    /// Sets the DNA and the quality values of the read.
    ///
    /// Quality values above [`MAX_QUALITY`] are clamped.
    pub fn with_sequence(mut self, dna: Vec<u8>, mut quality: Vec<u8>) -> Self {
        quality.iter_mut().for_each(|q| *q = (*q).min(MAX_QUALITY));
        self.dna = Some(dna);
        self.quality = Some(quality);
        self
    }

    /// Gets the numeric identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Gets the name, if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Gets the chemistry.
    pub fn chemistry(&self) -> Chemistry {
        self.chemistry
    }

    /// Gets the DNA, if loaded.
    pub fn dna(&self) -> Option<&[u8]> {
        self.dna.as_deref()
    }

    /// Gets the quality values, if loaded.
    pub fn quality(&self) -> Option<&[u8]> {
        self.quality.as_deref()
    }

    /// Gets the base at a 1-based position.
    pub fn base_at(&self, position: i64) -> Option<u8> {
        self.dna().and_then(|dna| at(dna, position))
    }

    /// Gets the quality at a 1-based position.
    pub fn quality_at(&self, position: i64) -> Option<u8> {
        self.quality().and_then(|quality| at(quality, position))
    }

    /// Gets a copy of the read without its sequence data.
    pub fn without_sequence(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            chemistry: self.chemistry,
            dna: None,
            quality: None,
        }
    }

    /// Drops the sequence data, keeping the identity of the read.
    pub fn release(&mut self) {
        self.dna = None;
        self.quality = None;
    }
}

/// Gets the value at a 1-based position of a buffer.
pub(crate) fn at(buffer: &[u8], position: i64) -> Option<u8> {
    usize::try_from(position - 1)
        .ok()
        .and_then(|i| buffer.get(i))
        .copied()
}

/// Gets the complement of a nucleotide.
///
/// Case is preserved. Symbols that are not nucleotides (such as the pad or
/// `N`) are their own complement.
///
/// # Examples
///
/// ```
/// use contigmap::read::complement;
///
/// assert_eq!(complement(b'A'), b'T');
/// assert_eq!(complement(b'g'), b'c');
/// assert_eq!(complement(b'*'), b'*');
/// ```
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

/// An in-memory store of reads keyed by their identifier.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// The reads by identifier.
    reads: HashMap<u64, Arc<Read>>,
}

impl Store {
    /// Inserts a read, replacing any read with the same identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::read::Read;
    /// use contigmap::read::Store;
    ///
    /// let mut store = Store::default();
    /// store.insert(Read::new(1));
    /// store.insert(Read::new(2).with_name("two"));
    ///
    /// assert_eq!(store.len(), 2);
    /// assert_eq!(store.get(2).and_then(|read| read.name()), Some("two"));
    /// assert!(store.get(3).is_none());
    /// ```
    pub fn insert(&mut self, read: Read) -> Option<Arc<Read>> {
        self.reads.insert(read.id(), Arc::new(read))
    }

    /// Gets a read by identifier.
    pub fn get(&self, id: u64) -> Option<&Arc<Read>> {
        self.reads.get(&id)
    }

    /// Gets the number of reads held.
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Returns whether the store holds no reads.
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Iterates over the reads in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Read>> {
        self.reads.values()
    }
}

impl FromIterator<Read> for Store {
    fn from_iter<T: IntoIterator<Item = Read>>(iter: T) -> Self {
        let mut store = Store::default();

        for read in iter {
            store.insert(read);
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let read = Read::new(1).with_sequence(b"ACGT".to_vec(), vec![10, 20, 30, 40]);

        assert_eq!(read.base_at(1), Some(b'A'));
        assert_eq!(read.base_at(4), Some(b'T'));
        assert_eq!(read.base_at(0), None);
        assert_eq!(read.base_at(5), None);
        assert_eq!(read.quality_at(2), Some(20));
        assert_eq!(read.quality_at(-3), None);
    }

    #[test]
    fn released_reads_have_no_data() {
        let mut read = Read::new(1).with_sequence(b"AC".to_vec(), vec![10, 20]);
        read.release();

        assert_eq!(read.dna(), None);
        assert_eq!(read.quality(), None);
        assert_eq!(read.base_at(1), None);
    }

    #[test]
    fn chemistry_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        for chemistry in [Chemistry::Primer, Chemistry::Terminator, Chemistry::Unknown] {
            assert_eq!(chemistry.to_string().parse::<Chemistry>()?, chemistry);
        }

        assert_eq!("Primer".parse::<Chemistry>()?, Chemistry::Primer);

        let err = "dye".parse::<Chemistry>().unwrap_err();
        assert_eq!(err.to_string(), "invalid chemistry: dye");

        Ok(())
    }

    #[test]
    fn complement_is_an_involution() {
        for base in b"ACGTacgtN*".iter().copied() {
            assert_eq!(complement(complement(base)), base);
        }
    }
}
