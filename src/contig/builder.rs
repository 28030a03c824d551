//! A builder for a [`Contig`].

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::alignment::Alignment;
use crate::contig;
use crate::contig::AssembledRead;
use crate::contig::Contig;
use crate::mapping;
use crate::mapping::Mapping;
use crate::read::Read;

/// An error that occurs when a required field was never provided to the
/// [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MissingError {
    /// No contig id was provided.
    Id,

    /// A read was provided without any alignments or mapping.
    Segments(u64),
}

impl std::fmt::Display for MissingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingError::Id => write!(f, "contig id"),
            MissingError::Segments(read) => write!(f, "segments for read {read}"),
        }
    }
}

impl std::error::Error for MissingError {}

/// An error that occurs when a singular field was provided multiple times to
/// the [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MultipleError {
    /// The contig id was provided multiple times.
    Id,

    /// The parent was provided multiple times.
    Parent,

    /// The same read was provided multiple times.
    Read(u64),

    /// A read was given both alignments and a ready mapping.
    Placement(u64),
}

impl std::fmt::Display for MultipleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipleError::Id => write!(f, "contig id"),
            MultipleError::Parent => write!(f, "parent"),
            MultipleError::Read(read) => write!(f, "read {read}"),
            MultipleError::Placement(read) => write!(f, "placement of read {read}"),
        }
    }
}

impl std::error::Error for MultipleError {}

/// An error related to a [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A required field was never provided to the [`Builder`].
    Missing(MissingError),

    /// A singular field was provided to the [`Builder`] more than once.
    Multiple(MultipleError),

    /// The alignments of a read do not form a valid mapping.
    Mapping(u64, mapping::Error),

    /// Alignments or a mapping were provided for a read that was not.
    UnknownRead(u64),

    /// The mapping of a read places it onto a different contig.
    ForeignMapping {
        /// The read id.
        read: u64,

        /// The reference id of the mapping.
        reference: u64,
    },

    /// The parent does not place this contig.
    Parent(contig::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Missing(err) => write!(f, "missing required field: {err}"),
            Error::Multiple(err) => write!(f, "singular field set multiple times: {err}"),
            Error::Mapping(read, err) => write!(f, "invalid mapping for read {read}: {err}"),
            Error::UnknownRead(read) => write!(f, "placement provided for unknown read {read}"),
            Error::ForeignMapping { read, reference } => write!(
                f,
                "read {read} is mapped onto sequence {reference} rather than this contig"
            ),
            Error::Parent(err) => write!(f, "invalid parent: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Contig`].
///
/// Every read pushed must receive a placement: either raw alignments
/// (assembled into a [`Mapping`] when the contig is built) or a ready
/// mapping, never both.
#[derive(Debug, Default)]
pub struct Builder {
    /// The contig id.
    id: Option<u64>,

    /// The placement of the contig onto its parent.
    parent: Option<Mapping>,

    /// The reads, in the order provided.
    reads: Vec<Arc<Read>>,

    /// The raw alignments, by read id.
    alignments: HashMap<u64, Vec<Alignment>>,

    /// The ready mappings, by read id.
    mappings: HashMap<u64, Mapping>,
}

impl Builder {
    /// Sets the contig id.
    pub fn id(mut self, id: u64) -> Result<Self> {
        if self.id.is_some() {
            return Err(Error::Multiple(MultipleError::Id));
        }

        self.id = Some(id);
        Ok(self)
    }

    /// Sets the placement of the contig onto its parent.
    pub fn parent(mut self, parent: Mapping) -> Result<Self> {
        if self.parent.is_some() {
            return Err(Error::Multiple(MultipleError::Parent));
        }

        self.parent = Some(parent);
        Ok(self)
    }

    /// Pushes a read into the [`Builder`].
    pub fn push_read(mut self, read: impl Into<Arc<Read>>) -> Self {
        self.reads.push(read.into());
        self
    }

    /// Pushes an alignment of a read onto the contig.
    pub fn push_alignment(mut self, read_id: u64, alignment: Alignment) -> Self {
        self.alignments.entry(read_id).or_default().push(alignment);
        self
    }

    /// Pushes a ready mapping of a read onto the contig.
    ///
    /// If the same read receives several mappings, the last one wins.
    pub fn push_mapping(mut self, mapping: Mapping) -> Self {
        self.mappings.insert(mapping.subject_id(), mapping);
        self
    }

    /// Consumes `self` to attempt to build a [`Contig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::contig::Builder;
    /// use contigmap::core::Range;
    /// use contigmap::read::Read;
    ///
    /// let err = Builder::default()
    ///     .id(1)?
    ///     .push_read(Read::new(7))
    ///     .try_build()
    ///     .unwrap_err();
    ///
    /// assert_eq!(err.to_string(), "missing required field: segments for read 7");
    ///
    /// let contig = Builder::default()
    ///     .id(1)?
    ///     .push_read(Read::new(7))
    ///     .push_alignment(7, Alignment::try_new(Range::new(5, 9), Range::new(1, 5))?)
    ///     .try_build()?;
    ///
    /// assert_eq!(contig.id(), 1);
    /// assert_eq!(contig.reads().len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(mut self) -> Result<Contig> {
        let id = self.id.ok_or(Error::Missing(MissingError::Id))?;

        let mut seen = HashSet::with_capacity(self.reads.len());
        let mut assembled = Vec::with_capacity(self.reads.len());

        for read in self.reads {
            let read_id = read.id();

            if !seen.insert(read_id) {
                return Err(Error::Multiple(MultipleError::Read(read_id)));
            }

            let alignments = self.alignments.remove(&read_id);
            let mapping = self.mappings.remove(&read_id);

            let mapping = match (alignments, mapping) {
                (Some(alignments), None) => Mapping::try_new(read_id, id, alignments)
                    .map_err(|err| Error::Mapping(read_id, err))?,
                (None, Some(mapping)) => mapping,
                (Some(_), Some(_)) => {
                    return Err(Error::Multiple(MultipleError::Placement(read_id)));
                }
                (None, None) => return Err(Error::Missing(MissingError::Segments(read_id))),
            };

            if mapping.reference_id() != id {
                return Err(Error::ForeignMapping {
                    read: read_id,
                    reference: mapping.reference_id(),
                });
            }

            assembled.push(AssembledRead { read, mapping });
        }

        if let Some(read_id) = self.alignments.keys().chain(self.mappings.keys()).min() {
            return Err(Error::UnknownRead(*read_id));
        }

        let mut contig = Contig::new(id, assembled);

        if let Some(parent) = self.parent {
            contig.set_parent(parent).map_err(Error::Parent)?;
        }

        Ok(contig)
    }
}
