//! Mappings between a subject (such as a read) and a reference (such as a
//! contig).
//!
//! A [`Mapping`] holds its aligned blocks in one of two
//! [representations](Representation):
//!
//! - **Explicit**: a list of absolute [`Segment`]s owned by the mapping.
//! - **Canonical**: a shared [`CanonicalMapping`] placed at an absolute
//!   location by an [`Anchor`] and the mapping's direction.
//!
//! Both representations answer every query identically. Operations that move
//! a mapping ([`Mapping::shifted()`], [`Mapping::mirrored()`],
//! [`Mapping::rebind()`]) or change its representation
//! ([`Mapping::to_canonical()`], [`Mapping::to_explicit()`]) return new
//! values; a shared canonical mapping is never modified.
//!
//! ```
//! use contigmap::alignment::Alignment;
//! use contigmap::canonical::Registry;
//! use contigmap::core::Range;
//! use contigmap::core::Translate as _;
//! use contigmap::mapping::Mapping;
//!
//! let mapping = Mapping::try_new(
//!     7,
//!     1,
//!     vec![
//!         Alignment::try_new(Range::new(10, 15), Range::new(100, 105))?,
//!         Alignment::try_new(Range::new(20, 25), Range::new(106, 111))?,
//!     ],
//! )?;
//!
//! assert_eq!(mapping.reference_position(106), Some(20));
//! assert_eq!(mapping.subject_position(17), None);
//!
//! let registry = Registry::default();
//! let canonical = mapping.to_canonical(&registry);
//! assert_eq!(canonical.reference_position(106), Some(20));
//! assert_eq!(canonical.alignments(), mapping.alignments());
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use crate::alignment::infer_direction;
use crate::alignment::Alignment;
use crate::alignment::Segment;
use crate::canonical;
use crate::canonical::Anchor;
use crate::canonical::CanonicalMapping;
use crate::canonical::Registry;
use crate::core::placement::search;
use crate::core::Direction;
use crate::core::Order;
use crate::core::Position;
use crate::core::Range;
use crate::core::Translate;
use crate::read;
use crate::read::Read;
use crate::record::AssembledFrom;

pub mod algebra;
pub mod builder;

pub use builder::Builder;

/// An error related to constructing a [`Mapping`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// No alignments were provided.
    Empty,

    /// Two alignments cover the same subject position.
    Overlapping(Position),

    /// Alignments disagree on the direction of the mapping.
    MixedDirections,

    /// The reference ranges are not ordered in the direction of the mapping
    /// (the value is the subject position where the order breaks).
    Unordered(Position),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Empty => write!(f, "a mapping requires at least one alignment"),
            Error::Overlapping(position) => {
                write!(f, "alignments overlap at subject position {position}")
            }
            Error::MixedDirections => write!(f, "alignments disagree on direction"),
            Error::Unordered(position) => write!(
                f,
                "reference ranges are out of order at subject position {position}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// An error related to looking up a base and quality through a [`Mapping`].
#[derive(Debug, Eq, PartialEq)]
pub enum LookupError {
    /// The read has no DNA loaded.
    MissingDna(u64),

    /// The read has no quality values loaded.
    MissingQuality(u64),

    /// The mapping points past the end of the read's data.
    PositionOutOfBounds {
        /// The read id.
        read: u64,

        /// The offending read position.
        position: Position,
    },
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::MissingDna(id) => write!(f, "read {id} has no DNA"),
            LookupError::MissingQuality(id) => write!(f, "read {id} has no quality values"),
            LookupError::PositionOutOfBounds { read, position } => write!(
                f,
                "position {position} is out of bounds for the data of read {read}"
            ),
        }
    }
}

impl std::error::Error for LookupError {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Bases with qualities
////////////////////////////////////////////////////////////////////////////////////////

/// A base reported for a reference column together with its quality.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BaseWithQuality {
    /// The base, oriented to the reference, or [`read::PAD`].
    pub base: u8,

    /// The quality (interpolated for a pad).
    pub quality: u8,
}

impl BaseWithQuality {
    /// Returns whether the column is a pad in the read.
    pub fn is_pad(&self) -> bool {
        self.base == read::PAD
    }
}

/// Where a reference position falls among the blocks of a mapping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Lookup {
    /// Outside the reference span of the mapping.
    Outside,

    /// Inside a block, aligned to this subject position.
    Aligned(Position),

    /// Between two blocks.
    Pad {
        /// The last reference column of the lower block and its subject
        /// position.
        lower: (Position, Position),

        /// The first reference column of the upper block and its subject
        /// position.
        upper: (Position, Position),
    },
}

/// Describes the pad between two blocks that are adjacent in list order.
fn pad_between(a: &Segment, b: &Segment, direction: Direction) -> Lookup {
    let ascending = a.reference_range(direction).low() < b.reference_range(direction).low();
    let (lower, upper) = if ascending { (a, b) } else { (b, a) };

    let lower_column = lower.reference_range(direction).high();
    let upper_column = upper.reference_range(direction).low();

    match (
        lower.subject_position(lower_column, direction),
        upper.subject_position(upper_column, direction),
    ) {
        (Some(l), Some(u)) => Lookup::Pad {
            lower: (lower_column, l),
            upper: (upper_column, u),
        },
        _ => Lookup::Outside,
    }
}

/// Linearly interpolates the quality of a pad column.
///
/// The division truncates toward zero.
///
/// # Examples
///
/// ```
/// use contigmap::mapping::interpolate_quality;
///
/// // Columns 15 (quality 40) and 20 (quality 20) flank column 17.
/// assert_eq!(interpolate_quality((15, 40), (20, 20), 17), 32);
/// ```
pub fn interpolate_quality(lower: (Position, u8), upper: (Position, u8), column: Position) -> u8 {
    let (lower_column, lower_quality) = (lower.0, i64::from(lower.1));
    let (upper_column, upper_quality) = (upper.0, i64::from(upper.1));

    if upper_column == lower_column {
        return lower.1;
    }

    let quality = lower_quality
        + (upper_quality - lower_quality) * (column - lower_column) / (upper_column - lower_column);

    quality.clamp(0, i64::from(read::MAX_QUALITY)) as u8
}

////////////////////////////////////////////////////////////////////////////////////////
// Mappings
////////////////////////////////////////////////////////////////////////////////////////

/// How the blocks of a [`Mapping`] are stored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Representation {
    /// Absolute segments, sorted by subject position.
    Explicit(Vec<Segment>),

    /// A shared canonical mapping and the anchor placing it.
    Canonical {
        /// The shared canonical mapping.
        mapping: Arc<CanonicalMapping>,

        /// The offsets placing the canonical mapping.
        anchor: Anchor,
    },
}

/// An oriented, possibly gapped mapping from a subject onto a reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mapping {
    /// The subject (for example, a read) id.
    subject_id: u64,

    /// The reference (for example, a contig) id.
    reference_id: u64,

    /// The direction of the mapping.
    direction: Direction,

    /// The blocks.
    representation: Representation,

    /// The reference range, oriented so its start aligns with the subject
    /// start.
    reference_range: Range,

    /// The subject range (never reverse).
    subject_range: Range,
}

impl Mapping {
    /// Attempts to create a new [`Mapping`] from alignments.
    ///
    /// The alignments need not be sorted. The direction is inferred from the
    /// alignments (see [`infer_direction()`]).
    pub fn try_new(subject_id: u64, reference_id: u64, alignments: Vec<Alignment>) -> Result<Self> {
        Self::assemble(subject_id, reference_id, alignments, Direction::Unknown)
    }

    /// Creates a mapping from alignments, using `fallback` as the direction
    /// when none can be inferred.
    pub(crate) fn assemble(
        subject_id: u64,
        reference_id: u64,
        mut alignments: Vec<Alignment>,
        fallback: Direction,
    ) -> Result<Self> {
        if alignments.is_empty() {
            return Err(Error::Empty);
        }

        alignments.sort_by_key(|alignment| alignment.subject().start());

        let direction = match infer_direction(&alignments) {
            Direction::Unknown => fallback,
            direction => direction,
        };

        if alignments
            .iter()
            .any(|alignment| alignment.direction().is_known() && alignment.direction() != direction)
        {
            return Err(Error::MixedDirections);
        }

        for pair in alignments.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);

            if b.subject().start() <= a.subject().end() {
                return Err(Error::Overlapping(b.subject().start()));
            }

            let ordered = match direction {
                Direction::Reverse => b.reference().high() < a.reference().low(),
                Direction::Forward | Direction::Unknown => {
                    a.reference().high() < b.reference().low()
                }
            };

            if !ordered {
                return Err(Error::Unordered(b.subject().start()));
            }
        }

        let segments = alignments.iter().map(Segment::from).collect();

        Ok(Self::from_parts(
            subject_id,
            reference_id,
            direction,
            Representation::Explicit(segments),
        ))
    }

    /// Creates a mapping from a representation, computing the cached bounds.
    fn from_parts(
        subject_id: u64,
        reference_id: u64,
        direction: Direction,
        representation: Representation,
    ) -> Self {
        let (first, last) = match &representation {
            Representation::Explicit(segments) => {
                (segments.first().copied(), segments.last().copied())
            }
            Representation::Canonical { mapping, anchor } => (
                mapping.segments().first().map(|s| s.rebind(*anchor, direction)),
                mapping.segments().last().map(|s| s.rebind(*anchor, direction)),
            ),
        };

        let (reference_range, subject_range) = match (first, last) {
            (Some(first), Some(last)) => (
                Range::new(first.reference_start(), last.reference_finish(direction)),
                Range::new(first.subject_start(), last.subject_finish()),
            ),
            // Unreachable: both representations are non-empty.
            _ => (Range::new(0, 0), Range::new(0, 0)),
        };

        Self {
            subject_id,
            reference_id,
            direction,
            representation,
            reference_range,
            subject_range,
        }
    }

    /// Gets the subject id.
    pub fn subject_id(&self) -> u64 {
        self.subject_id
    }

    /// Gets the reference id.
    pub fn reference_id(&self) -> u64 {
        self.reference_id
    }

    /// Gets the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Gets the representation.
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// Returns whether the mapping is held in canonical form.
    pub fn is_canonical(&self) -> bool {
        matches!(self.representation, Representation::Canonical { .. })
    }

    /// Gets the reference range, oriented so that its start aligns with the
    /// start of the subject range.
    pub fn reference_range(&self) -> Range {
        self.reference_range
    }

    /// Gets the subject range.
    pub fn subject_range(&self) -> Range {
        self.subject_range
    }

    /// Gets the lowest reference position covered.
    pub fn reference_start(&self) -> Position {
        self.reference_range.low()
    }

    /// Gets the highest reference position covered.
    pub fn reference_finish(&self) -> Position {
        self.reference_range.high()
    }

    /// Returns whether a reference position falls within the span of the
    /// mapping (including its pads).
    pub fn covers(&self, reference_position: Position) -> bool {
        self.reference_range.contains(reference_position)
    }

    /// Gets the number of blocks.
    pub fn len(&self) -> usize {
        match &self.representation {
            Representation::Explicit(segments) => segments.len(),
            Representation::Canonical { mapping, .. } => mapping.segments().len(),
        }
    }

    /// Always `false`: a mapping has at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Gets the absolute segments, sorted by subject position.
    pub fn segments(&self) -> Vec<Segment> {
        match &self.representation {
            Representation::Explicit(segments) => segments.clone(),
            Representation::Canonical { mapping, anchor } => mapping
                .rebind_segments(*anchor, self.direction)
                .collect(),
        }
    }

    /// Gets the absolute alignments, sorted by subject position.
    pub fn alignments(&self) -> Vec<Alignment> {
        match &self.representation {
            Representation::Explicit(segments) => segments
                .iter()
                .map(|segment| segment.to_alignment(self.direction))
                .collect(),
            Representation::Canonical { mapping, anchor } => {
                mapping.rebind(*anchor, self.direction).collect()
            }
        }
    }

    /// Gets the assembled-from records of the mapping, sorted by subject
    /// (read) position.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Mapping;
    ///
    /// let mapping = Mapping::try_new(
    ///     7,
    ///     1,
    ///     vec![
    ///         Alignment::try_new(Range::new(14, 10), Range::new(6, 10))?,
    ///         Alignment::try_new(Range::new(22, 18), Range::new(1, 5))?,
    ///     ],
    /// )?;
    ///
    /// let records = mapping
    ///     .assembled_from()
    ///     .into_iter()
    ///     .map(|record| record.to_string())
    ///     .collect::<Vec<_>>();
    ///
    /// assert_eq!(records, ["1\t7\t22\t18\t1\t5", "1\t7\t14\t10\t6\t10"]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn assembled_from(&self) -> Vec<AssembledFrom> {
        self.alignments()
            .iter()
            .map(|alignment| {
                AssembledFrom::from_alignment(self.reference_id, self.subject_id, alignment)
            })
            .collect()
    }

    ////////////////////////////////////////////////////////////////////////////////////
    // Re-anchoring
    ////////////////////////////////////////////////////////////////////////////////////

    /// Gets the mapping with every reference position shifted by `delta`.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Mapping;
    ///
    /// let mapping = Mapping::try_new(
    ///     7,
    ///     1,
    ///     vec![Alignment::try_new(Range::new(10, 14), Range::new(1, 5))?],
    /// )?;
    ///
    /// let shifted = mapping.shifted(100);
    /// assert_eq!(shifted.reference_range(), Range::new(110, 114));
    /// assert_eq!(shifted.subject_range(), mapping.subject_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn shifted(&self, delta: i64) -> Self {
        let representation = match &self.representation {
            Representation::Explicit(segments) => Representation::Explicit(
                segments
                    .iter()
                    .map(|s| {
                        Segment::new(s.reference_start() + delta, s.subject_start(), s.length())
                    })
                    .collect(),
            ),
            Representation::Canonical { mapping, anchor } => Representation::Canonical {
                mapping: Arc::clone(mapping),
                anchor: anchor.shifted(delta),
            },
        };

        Self::from_parts(self.subject_id, self.reference_id, self.direction, representation)
    }

    /// Gets the mapping reflected around a reference `pivot`.
    ///
    /// Every reference position `r` becomes `2 * pivot - r` and the direction
    /// flips. Use this when the reference itself is reverse-complemented.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Mapping;
    ///
    /// let mapping = Mapping::try_new(
    ///     7,
    ///     1,
    ///     vec![Alignment::try_new(Range::new(10, 14), Range::new(1, 5))?],
    /// )?;
    ///
    /// let mirrored = mapping.mirrored(50);
    /// assert_eq!(mirrored.direction(), Direction::Reverse);
    /// assert_eq!(mirrored.reference_range(), Range::new(90, 86));
    /// assert_eq!(mirrored.mirrored(50), mapping);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn mirrored(&self, pivot: Position) -> Self {
        let direction = self.direction.flip();

        let representation = match (&self.representation, self.direction) {
            (_, Direction::Unknown) => {
                let segments = self
                    .alignments()
                    .iter()
                    .map(|alignment| Segment::from(&alignment.mirror_reference(pivot)))
                    .collect();
                Representation::Explicit(segments)
            }
            (Representation::Explicit(segments), _) => Representation::Explicit(
                segments
                    .iter()
                    .map(|s| {
                        Segment::new(2 * pivot - s.reference_start(), s.subject_start(), s.length())
                    })
                    .collect(),
            ),
            (Representation::Canonical { mapping, anchor }, _) => Representation::Canonical {
                mapping: Arc::clone(mapping),
                anchor: Anchor::new(2 * pivot - anchor.reference_offset(), anchor.subject_offset()),
            },
        };

        let mirrored =
            Self::from_parts(self.subject_id, self.reference_id, direction, representation);

        match (self.is_canonical(), self.direction) {
            // A single-base canonical mapping stays canonical.
            (true, Direction::Unknown) => mirrored.with_canonical(&self.representation),
            _ => mirrored,
        }
    }

    /// Re-expresses the canonical form of an unknown-direction mapping that
    /// was moved through its alignments.
    fn with_canonical(self, original: &Representation) -> Self {
        let mapping = match original {
            Representation::Canonical { mapping, .. } => Arc::clone(mapping),
            Representation::Explicit(_) => return self,
        };

        let alignments = self.alignments();
        match CanonicalMapping::canonicalize(&alignments, self.direction) {
            Ok((canonical, anchor)) if canonical == *mapping => Self::from_parts(
                self.subject_id,
                self.reference_id,
                self.direction,
                Representation::Canonical { mapping, anchor },
            ),
            _ => self,
        }
    }

    /// Gets the mapping with the same shape placed at a new reference offset
    /// and direction.
    ///
    /// The reference offset is the one an [`Anchor`] carries: the canonical
    /// reference position `c` lands on `reference_offset + c` (forward) or
    /// `reference_offset - c` (reverse). The subject placement is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Mapping;
    ///
    /// let mapping = Mapping::try_new(
    ///     7,
    ///     1,
    ///     vec![
    ///         Alignment::try_new(Range::new(10, 14), Range::new(1, 5))?,
    ///         Alignment::try_new(Range::new(17, 21), Range::new(6, 10))?,
    ///     ],
    /// )?;
    ///
    /// let rebound = mapping.rebind(101, Direction::Reverse);
    /// assert_eq!(rebound.reference_range(), Range::new(100, 89));
    /// assert_eq!(rebound.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn rebind(&self, reference_offset: i64, direction: Direction) -> Self {
        let (mapping, anchor) = self.canonical_parts();
        let anchor = Anchor::new(reference_offset, anchor.subject_offset());

        let representation = match self.representation {
            Representation::Explicit(_) => {
                Representation::Explicit(mapping.rebind_segments(anchor, direction).collect())
            }
            Representation::Canonical { .. } => Representation::Canonical { mapping, anchor },
        };

        Self::from_parts(self.subject_id, self.reference_id, direction, representation)
    }

    /// Gets the canonical mapping and anchor of `self`, canonicalizing if
    /// needed.
    fn canonical_parts(&self) -> (Arc<CanonicalMapping>, Anchor) {
        match &self.representation {
            Representation::Canonical { mapping, anchor } => (Arc::clone(mapping), *anchor),
            Representation::Explicit(segments) => {
                let (mapping, anchor) = canonicalize_segments(segments, self.direction);
                (Arc::new(mapping), anchor)
            }
        }
    }

    /// Gets the mapping in canonical form, sharing the canonical mapping
    /// through `registry`.
    pub fn to_canonical(&self, registry: &Registry) -> Self {
        if let Representation::Canonical { mapping, anchor } = &self.representation {
            let representation = Representation::Canonical {
                mapping: registry.intern(CanonicalMapping::clone(mapping)),
                anchor: *anchor,
            };
            return Self::from_parts(
                self.subject_id,
                self.reference_id,
                self.direction,
                representation,
            );
        }

        let (mapping, anchor) = self.canonical_parts();
        let representation = Representation::Canonical {
            mapping: registry.intern(Arc::unwrap_or_clone(mapping)),
            anchor,
        };

        Self::from_parts(self.subject_id, self.reference_id, self.direction, representation)
    }

    /// Gets the mapping in explicit form.
    pub fn to_explicit(&self) -> Self {
        let representation = Representation::Explicit(self.segments());
        Self::from_parts(self.subject_id, self.reference_id, self.direction, representation)
    }

    ////////////////////////////////////////////////////////////////////////////////////
    // Queries
    ////////////////////////////////////////////////////////////////////////////////////

    /// The order of the blocks along the reference axis.
    fn reference_order(&self) -> Order {
        match self.direction {
            Direction::Reverse => Order::Descending,
            Direction::Forward | Direction::Unknown => Order::Ascending,
        }
    }

    /// Finds where a reference position falls among the blocks.
    fn lookup(&self, reference_position: Position) -> Lookup {
        if !self.covers(reference_position) {
            return Lookup::Outside;
        }

        match &self.representation {
            Representation::Explicit(segments) => {
                let found = search(segments, self.reference_order(), |segment| {
                    segment.reference_placement(reference_position, self.direction)
                });

                match found {
                    Ok(i) => segments[i]
                        .subject_position(reference_position, self.direction)
                        .map(Lookup::Aligned)
                        .unwrap_or(Lookup::Outside),
                    Err(i) if i > 0 && i < segments.len() => {
                        pad_between(&segments[i - 1], &segments[i], self.direction)
                    }
                    Err(_) => Lookup::Outside,
                }
            }
            Representation::Canonical { mapping, anchor } => {
                let segments = mapping.segments();
                let canonical =
                    (reference_position - anchor.reference_offset()) * self.direction.sign();

                let found = search(segments, Order::Ascending, |segment| {
                    segment.reference_placement(canonical)
                });

                match found {
                    Ok(i) => segments[i]
                        .subject_position(canonical)
                        .map(|s| Lookup::Aligned(s + anchor.subject_offset()))
                        .unwrap_or(Lookup::Outside),
                    Err(i) if i > 0 && i < segments.len() => pad_between(
                        &segments[i - 1].rebind(*anchor, self.direction),
                        &segments[i].rebind(*anchor, self.direction),
                        self.direction,
                    ),
                    Err(_) => Lookup::Outside,
                }
            }
        }
    }

    /// Looks up the base and quality a read contributes to a reference
    /// column, distinguishing missing data from malformed placements.
    ///
    /// Returns `Ok(None)` when the column falls outside the span of the
    /// mapping.
    pub fn try_base_and_quality(
        &self,
        read: &Read,
        reference_position: Position,
    ) -> std::result::Result<Option<BaseWithQuality>, LookupError> {
        let dna = read.dna().ok_or(LookupError::MissingDna(read.id()))?;
        let quality = read.quality().ok_or(LookupError::MissingQuality(read.id()))?;

        let out_of_bounds = |position| LookupError::PositionOutOfBounds {
            read: read.id(),
            position,
        };

        match self.lookup(reference_position) {
            Lookup::Outside => Ok(None),
            Lookup::Aligned(position) => {
                let base = read::at(dna, position).ok_or_else(|| out_of_bounds(position))?;
                let q = read::at(quality, position).ok_or_else(|| out_of_bounds(position))?;

                let base = match self.direction {
                    Direction::Reverse => read::complement(base),
                    Direction::Forward | Direction::Unknown => base,
                };

                Ok(Some(BaseWithQuality { base, quality: q }))
            }
            Lookup::Pad { lower, upper } => {
                let lower_quality =
                    read::at(quality, lower.1).ok_or_else(|| out_of_bounds(lower.1))?;
                let upper_quality =
                    read::at(quality, upper.1).ok_or_else(|| out_of_bounds(upper.1))?;

                Ok(Some(BaseWithQuality {
                    base: read::PAD,
                    quality: interpolate_quality(
                        (lower.0, lower_quality),
                        (upper.0, upper_quality),
                        reference_position,
                    ),
                }))
            }
        }
    }

    /// Looks up the base and quality a read contributes to a reference
    /// column.
    ///
    /// The base is reverse-complemented under [`Direction::Reverse`]. In a
    /// pad between two blocks, the base is [`read::PAD`] and the quality is
    /// interpolated between the flanking columns. Returns `None` outside the
    /// span of the mapping or when the read lacks the needed data.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Mapping;
    /// use contigmap::read::Read;
    ///
    /// let mapping = Mapping::try_new(
    ///     1,
    ///     1,
    ///     vec![
    ///         Alignment::try_new(Range::new(10, 14), Range::new(1, 5))?,
    ///         Alignment::try_new(Range::new(17, 21), Range::new(6, 10))?,
    ///     ],
    /// )?;
    ///
    /// let read = Read::new(1).with_sequence(
    ///     b"ACGTACGTAC".to_vec(),
    ///     vec![10, 10, 10, 10, 40, 20, 10, 10, 10, 10],
    /// );
    ///
    /// let hit = mapping.base_and_quality(&read, 11).unwrap();
    /// assert_eq!((hit.base, hit.quality), (b'C', 10));
    ///
    /// let pad = mapping.base_and_quality(&read, 15).unwrap();
    /// assert_eq!((pad.base, pad.quality), (b'*', 34));
    ///
    /// assert!(mapping.base_and_quality(&read, 22).is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn base_and_quality(
        &self,
        read: &Read,
        reference_position: Position,
    ) -> Option<BaseWithQuality> {
        self.try_base_and_quality(read, reference_position)
            .ok()
            .flatten()
    }
}

/// Canonicalizes absolute segments (known to be non-empty and ordered).
fn canonicalize_segments(segments: &[Segment], direction: Direction) -> (CanonicalMapping, Anchor) {
    let alignments = segments
        .iter()
        .map(|segment| segment.to_alignment(direction))
        .collect::<Vec<_>>();

    match CanonicalMapping::canonicalize(&alignments, direction) {
        Ok(parts) => parts,
        Err(canonical::Error::Empty) | Err(canonical::Error::Overlapping(_)) => {
            unreachable!("mapping segments are non-empty and disjoint")
        }
    }
}

impl Translate for Mapping {
    fn reference_position(&self, subject_position: Position) -> Option<Position> {
        match &self.representation {
            Representation::Explicit(segments) => {
                let found = search(segments, Order::Ascending, |segment| {
                    segment.subject_placement(subject_position)
                })
                .ok()?;

                segments[found].reference_position(subject_position, self.direction)
            }
            Representation::Canonical { mapping, anchor } => mapping
                .reference_position(subject_position - anchor.subject_offset())
                .map(|c| anchor.reference_offset() + self.direction.sign() * c),
        }
    }

    fn subject_position(&self, reference_position: Position) -> Option<Position> {
        match self.lookup(reference_position) {
            Lookup::Aligned(position) => Some(position),
            Lookup::Outside | Lookup::Pad { .. } => None,
        }
    }
}
