//! Offset-independent normal forms of gapped alignments.
//!
//! Two reads with the same gap pattern relative to a contig canonicalize to
//! structurally equal [`CanonicalMapping`]s, no matter where on the contig
//! they sit or whether they align forward or reverse. Only the [`Anchor`]
//! (and the direction) differ. Equal canonical mappings can therefore be
//! shared through a [`Registry`].
//!
//! ```text
//! absolute (reverse)          canonical
//!
//! subject    1 ... 5          subject    1 ... 5
//! reference 30 ... 26   ==>   reference  1 ... 5    anchor: (31, 0)
//!
//! subject    6 ... 10         subject    6 ... 10
//! reference 24 ... 20         reference  7 ... 11
//! ```

use nonempty::NonEmpty;

use crate::alignment::Alignment;
use crate::alignment::Segment;
use crate::core::placement::locate;
use crate::core::Direction;
use crate::core::Order;
use crate::core::Position;
use crate::core::Translate;

pub mod registry;
pub mod segment;

pub use registry::Registry;
pub use segment::CanonicalSegment;

/// An error related to canonicalization.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// No alignments were provided.
    Empty,

    /// Two alignments cover the same subject position.
    Overlapping(Position),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Empty => write!(f, "cannot canonicalize an empty list of alignments"),
            Error::Overlapping(position) => write!(
                f,
                "alignments overlap at subject position {position}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Anchors
////////////////////////////////////////////////////////////////////////////////////////

/// The offsets that place a canonical mapping at an absolute location.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Anchor {
    /// The reference offset.
    reference_offset: i64,

    /// The subject offset.
    subject_offset: i64,
}

impl Anchor {
    /// Creates a new [`Anchor`].
    pub fn new(reference_offset: i64, subject_offset: i64) -> Self {
        Self {
            reference_offset,
            subject_offset,
        }
    }

    /// Computes the anchor for a mapping whose first alignment (by subject
    /// position) is `first`.
    ///
    /// The offsets put canonical position `0` just before the first aligned
    /// base on both axes. Under [`Direction::Reverse`], "before" is above the
    /// first reference position, as the reference descends.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::canonical::Anchor;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// let first = Alignment::try_new(Range::new(10, 14), Range::new(36, 40))?;
    /// assert_eq!(Anchor::of(&first, Direction::Forward), Anchor::new(9, 35));
    ///
    /// let first = Alignment::try_new(Range::new(14, 10), Range::new(36, 40))?;
    /// assert_eq!(Anchor::of(&first, Direction::Reverse), Anchor::new(15, 35));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn of(first: &Alignment, direction: Direction) -> Self {
        Self::new(
            first.reference().start() - direction.sign(),
            first.subject().start() - 1,
        )
    }

    /// Gets the reference offset.
    pub fn reference_offset(&self) -> i64 {
        self.reference_offset
    }

    /// Gets the subject offset.
    pub fn subject_offset(&self) -> i64 {
        self.subject_offset
    }

    /// Gets the anchor with the reference offset shifted by `delta`.
    pub fn shifted(self, delta: i64) -> Self {
        Self::new(self.reference_offset + delta, self.subject_offset)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Canonical mappings
////////////////////////////////////////////////////////////////////////////////////////

/// A sorted, non-empty list of canonical segments.
///
/// Equality and hashing are structural.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CanonicalMapping {
    /// The segments, sorted by subject start.
    segments: Vec<CanonicalSegment>,

    /// The reference finish of the last segment.
    reference_span: Position,

    /// The subject finish of the last segment.
    subject_span: Position,
}

impl CanonicalMapping {
    /// Creates a new [`CanonicalMapping`] from canonical segments.
    ///
    /// The segments are sorted and the spans are taken from the last one.
    pub fn new(segments: NonEmpty<CanonicalSegment>) -> Self {
        let NonEmpty { head, tail } = segments;

        let mut segments = tail;
        segments.push(head);
        segments.sort();

        let (reference_span, subject_span) = segments
            .last()
            .map(|last| (last.reference_finish(), last.subject_finish()))
            .unwrap_or_default();

        Self {
            segments,
            reference_span,
            subject_span,
        }
    }

    /// Canonicalizes a list of alignments that map in `direction`.
    ///
    /// The alignments are sorted by subject position first. Returns the
    /// canonical mapping and the anchor that places it back at the original
    /// location.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::canonical::Anchor;
    /// use contigmap::canonical::CanonicalMapping;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// let alignments = [
    ///     Alignment::try_new(Range::new(30, 26), Range::new(1, 5))?,
    ///     Alignment::try_new(Range::new(24, 20), Range::new(6, 10))?,
    /// ];
    ///
    /// let (mapping, anchor) = CanonicalMapping::canonicalize(&alignments, Direction::Reverse)?;
    ///
    /// assert_eq!(anchor, Anchor::new(31, 0));
    /// assert_eq!(mapping.reference_span(), 11);
    /// assert_eq!(mapping.subject_span(), 10);
    /// assert_eq!(
    ///     mapping.rebind(anchor, Direction::Reverse).collect::<Vec<_>>(),
    ///     alignments
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn canonicalize(alignments: &[Alignment], direction: Direction) -> Result<(Self, Anchor)> {
        let mut sorted = alignments.to_vec();
        sorted.sort_by_key(|alignment| alignment.subject().start());

        for pair in sorted.windows(2) {
            if pair[1].subject().start() <= pair[0].subject().end() {
                return Err(Error::Overlapping(pair[1].subject().start()));
            }
        }

        let (first, rest) = sorted.split_first().ok_or(Error::Empty)?;
        let anchor = Anchor::of(first, direction);
        let canonicalize = |alignment: &Alignment| {
            CanonicalSegment::from_alignment(alignment, anchor, direction)
        };

        let segments = NonEmpty {
            head: canonicalize(first),
            tail: rest.iter().map(canonicalize).collect(),
        };

        Ok((Self::new(segments), anchor))
    }

    /// Gets the canonical segments, sorted by subject position.
    pub fn segments(&self) -> &[CanonicalSegment] {
        &self.segments
    }

    /// Gets the last canonical reference position.
    pub fn reference_span(&self) -> Position {
        self.reference_span
    }

    /// Gets the last canonical subject position.
    pub fn subject_span(&self) -> Position {
        self.subject_span
    }

    /// Gets the segments as offset-free alignments.
    pub fn alignments(&self) -> impl Iterator<Item = Alignment> + '_ {
        self.segments.iter().map(CanonicalSegment::to_alignment)
    }

    /// Rebinds every segment to absolute coordinates.
    pub fn rebind(
        &self,
        anchor: Anchor,
        direction: Direction,
    ) -> impl Iterator<Item = Alignment> + '_ {
        self.alignments().map(move |alignment| {
            alignment.apply_offsets_and_direction(
                anchor.reference_offset(),
                anchor.subject_offset(),
                direction,
            )
        })
    }

    /// Rebinds every segment to absolute, subject-anchored segments.
    pub fn rebind_segments(
        &self,
        anchor: Anchor,
        direction: Direction,
    ) -> impl Iterator<Item = Segment> + '_ {
        self.segments
            .iter()
            .map(move |segment| segment.rebind(anchor, direction))
    }

    /// Finds the index of the segment covering a canonical reference
    /// position.
    pub fn locate_reference(&self, reference_position: Position) -> Option<usize> {
        locate(&self.segments, Order::Ascending, |segment| {
            segment.reference_placement(reference_position)
        })
    }

    /// Finds the index of the segment covering a canonical subject position.
    pub fn locate_subject(&self, subject_position: Position) -> Option<usize> {
        locate(&self.segments, Order::Ascending, |segment| {
            segment.subject_placement(subject_position)
        })
    }
}

impl Translate for CanonicalMapping {
    /// Translates a canonical subject position to the canonical reference
    /// axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::canonical::CanonicalMapping;
    /// use contigmap::canonical::CanonicalSegment;
    /// use contigmap::core::Translate as _;
    /// use nonempty::nonempty;
    ///
    /// let mapping = CanonicalMapping::new(nonempty![
    ///     CanonicalSegment::new(1, 1, 5),
    ///     CanonicalSegment::new(10, 6, 5),
    /// ]);
    ///
    /// assert_eq!(mapping.reference_position(7), Some(11));
    /// assert_eq!(mapping.subject_position(7), None);
    /// assert_eq!(mapping.subject_position(14), Some(10));
    /// ```
    fn reference_position(&self, subject_position: Position) -> Option<Position> {
        self.locate_subject(subject_position)
            .and_then(|i| self.segments.get(i))
            .and_then(|segment| segment.reference_position(subject_position))
    }

    fn subject_position(&self, reference_position: Position) -> Option<Position> {
        self.locate_reference(reference_position)
            .and_then(|i| self.segments.get(i))
            .and_then(|segment| segment.subject_position(reference_position))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::Rng as _;
    use rand::SeedableRng as _;

    use super::*;
    use crate::core::Range;

    /// Generates a gapped alignment list sorted by subject position.
    pub(crate) fn random_alignments(rng: &mut StdRng, direction: Direction) -> Vec<Alignment> {
        let count = rng.gen_range(1..8);
        let mut subject = rng.gen_range(1..100);
        let mut reference = rng.gen_range(500..1_000);
        let mut alignments = Vec::with_capacity(count);

        for _ in 0..count {
            let length = rng.gen_range(1..20);
            let sign = direction.sign();

            let reference_range = Range::new(reference, reference + sign * (length - 1));
            let subject_range = Range::new(subject, subject + length - 1);
            alignments.push(Alignment::try_new(reference_range, subject_range).unwrap());

            // Gaps on either axis, but never on both at once.
            let (subject_gap, reference_gap) = match rng.gen_range(0..3) {
                0 => (rng.gen_range(1..5), 0),
                1 => (0, rng.gen_range(1..5)),
                _ => (0, 0),
            };

            subject += length + subject_gap;
            reference += sign * (length + reference_gap);
        }

        alignments
    }

    #[test]
    fn canonicalization_round_trips() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..500 {
            let direction = match rng.gen_bool(0.5) {
                true => Direction::Forward,
                false => Direction::Reverse,
            };
            let alignments = random_alignments(&mut rng, direction);

            let (mapping, anchor) = CanonicalMapping::canonicalize(&alignments, direction)?;
            let rebuilt = mapping.rebind(anchor, direction).collect::<Vec<_>>();
            assert_eq!(rebuilt, alignments);

            // Canonical segments ascend on both axes.
            for pair in mapping.segments().windows(2) {
                assert!(pair[0].subject_finish() < pair[1].subject_start());
                assert!(pair[0].reference_finish() < pair[1].reference_start());
            }
        }

        Ok(())
    }

    #[test]
    fn uniform_shifts_canonicalize_equally() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut rng = StdRng::seed_from_u64(29);

        for _ in 0..200 {
            let direction = match rng.gen_bool(0.5) {
                true => Direction::Forward,
                false => Direction::Reverse,
            };
            let alignments = random_alignments(&mut rng, direction);
            let delta = rng.gen_range(-400..400);
            let shifted = alignments
                .iter()
                .map(|alignment| alignment.shift_reference(delta))
                .collect::<Vec<_>>();

            let (a, anchor_a) = CanonicalMapping::canonicalize(&alignments, direction)?;
            let (b, anchor_b) = CanonicalMapping::canonicalize(&shifted, direction)?;

            assert_eq!(a, b);
            assert_eq!(anchor_a.shifted(delta), anchor_b);
        }

        Ok(())
    }

    #[test]
    fn forward_and_reverse_reads_share_a_shape(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let forward = [
            Alignment::try_new(Range::new(100, 104), Range::new(1, 5))?,
            Alignment::try_new(Range::new(107, 111), Range::new(6, 10))?,
        ];
        let reverse = [
            Alignment::try_new(Range::new(300, 296), Range::new(1, 5))?,
            Alignment::try_new(Range::new(293, 289), Range::new(6, 10))?,
        ];

        let (a, _) = CanonicalMapping::canonicalize(&forward, Direction::Forward)?;
        let (b, _) = CanonicalMapping::canonicalize(&reverse, Direction::Reverse)?;
        assert_eq!(a, b);

        Ok(())
    }

    #[test]
    fn invalid_inputs_are_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            CanonicalMapping::canonicalize(&[], Direction::Forward).unwrap_err(),
            Error::Empty
        );

        let overlapping = [
            Alignment::try_new(Range::new(1, 5), Range::new(1, 5))?,
            Alignment::try_new(Range::new(10, 14), Range::new(4, 8))?,
        ];
        assert_eq!(
            CanonicalMapping::canonicalize(&overlapping, Direction::Forward).unwrap_err(),
            Error::Overlapping(4)
        );

        Ok(())
    }

    #[test]
    fn translation_through_gaps() {
        let mapping = CanonicalMapping::new(nonempty::nonempty![
            CanonicalSegment::new(10, 6, 5),
            CanonicalSegment::new(1, 1, 5),
        ]);

        // Sorted on construction.
        assert_eq!(mapping.segments()[0], CanonicalSegment::new(1, 1, 5));
        assert_eq!(mapping.reference_span(), 14);
        assert_eq!(mapping.subject_span(), 10);

        for reference in 6..=9 {
            assert_eq!(mapping.subject_position(reference), None);
        }

        for subject in 1..=10 {
            let reference = mapping.reference_position(subject).unwrap();
            assert_eq!(mapping.subject_position(reference), Some(subject));
        }
    }
}
