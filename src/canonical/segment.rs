//! Segments expressed relative to a canonical anchor.

use crate::alignment::Alignment;
use crate::alignment::Segment;
use crate::canonical::Anchor;
use crate::core::Direction;
use crate::core::Placement;
use crate::core::Position;
use crate::core::Range;

/// An ungapped block in canonical coordinates.
///
/// The reference axis of a canonical mapping already has the direction folded
/// into it, so a canonical segment always ascends on both axes. Position `0`
/// on both axes sits just before the first aligned base of the mapping.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CanonicalSegment {
    /// The first subject position, relative to the anchor.
    subject_start: Position,

    /// The reference position aligned to the first subject position,
    /// relative to the anchor and with the direction folded in.
    reference_start: Position,

    /// The number of aligned positions.
    length: i64,
}

impl CanonicalSegment {
    /// Creates a new [`CanonicalSegment`].
    ///
    /// A length below one is repaired to one.
    pub fn new(reference_start: Position, subject_start: Position, length: i64) -> Self {
        Self {
            subject_start,
            reference_start,
            length: length.max(1),
        }
    }

    /// Expresses an absolute alignment relative to `anchor`.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::canonical::Anchor;
    /// use contigmap::canonical::CanonicalSegment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// let first = Alignment::try_new(Range::new(30, 26), Range::new(1, 5))?;
    /// let second = Alignment::try_new(Range::new(24, 20), Range::new(6, 10))?;
    /// let anchor = Anchor::of(&first, Direction::Reverse);
    ///
    /// assert_eq!(
    ///     CanonicalSegment::from_alignment(&first, anchor, Direction::Reverse),
    ///     CanonicalSegment::new(1, 1, 5)
    /// );
    /// assert_eq!(
    ///     CanonicalSegment::from_alignment(&second, anchor, Direction::Reverse),
    ///     CanonicalSegment::new(7, 6, 5)
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_alignment(alignment: &Alignment, anchor: Anchor, direction: Direction) -> Self {
        let reference_delta = alignment.reference().start() - anchor.reference_offset();

        Self::new(
            direction.sign() * reference_delta,
            alignment.subject().start() - anchor.subject_offset(),
            alignment.length(),
        )
    }

    /// Gets the first canonical reference position.
    pub fn reference_start(&self) -> Position {
        self.reference_start
    }

    /// Gets the first canonical subject position.
    pub fn subject_start(&self) -> Position {
        self.subject_start
    }

    /// Gets the number of aligned positions.
    pub fn length(&self) -> i64 {
        self.length
    }

    /// Gets the last canonical reference position.
    pub fn reference_finish(&self) -> Position {
        self.reference_start + self.length - 1
    }

    /// Gets the last canonical subject position.
    pub fn subject_finish(&self) -> Position {
        self.subject_start + self.length - 1
    }

    /// Translates a canonical subject position to the canonical reference
    /// axis.
    pub fn reference_position(&self, subject_position: Position) -> Option<Position> {
        let offset = subject_position - self.subject_start;
        (0..self.length)
            .contains(&offset)
            .then_some(self.reference_start + offset)
    }

    /// Translates a canonical reference position to the canonical subject
    /// axis.
    pub fn subject_position(&self, reference_position: Position) -> Option<Position> {
        let offset = reference_position - self.reference_start;
        (0..self.length)
            .contains(&offset)
            .then_some(self.subject_start + offset)
    }

    /// Classifies a canonical subject position relative to the segment.
    pub fn subject_placement(&self, subject_position: Position) -> Placement {
        Placement::of(subject_position, self.subject_start, self.subject_finish())
    }

    /// Classifies a canonical reference position relative to the segment.
    pub fn reference_placement(&self, reference_position: Position) -> Placement {
        Placement::of(
            reference_position,
            self.reference_start,
            self.reference_finish(),
        )
    }

    /// Gets the segment as an offset-free alignment.
    pub fn to_alignment(&self) -> Alignment {
        Alignment::normalized(
            Range::new(self.reference_start, self.reference_finish()),
            Range::new(self.subject_start, self.subject_finish()),
        )
    }

    /// Rebinds the segment to absolute coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Segment;
    /// use contigmap::canonical::Anchor;
    /// use contigmap::canonical::CanonicalSegment;
    /// use contigmap::core::Direction;
    ///
    /// let segment = CanonicalSegment::new(7, 6, 5);
    ///
    /// assert_eq!(
    ///     segment.rebind(Anchor::new(31, 0), Direction::Reverse),
    ///     Segment::new(24, 6, 5)
    /// );
    /// assert_eq!(
    ///     segment.rebind(Anchor::new(100, 0), Direction::Forward),
    ///     Segment::new(107, 6, 5)
    /// );
    /// ```
    pub fn rebind(&self, anchor: Anchor, direction: Direction) -> Segment {
        Segment::new(
            anchor.reference_offset() + direction.sign() * self.reference_start,
            anchor.subject_offset() + self.subject_start,
            self.length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_is_geometric_on_both_axes() {
        let segment = CanonicalSegment::new(10, 4, 3);

        assert_eq!(segment.subject_placement(3), Placement::AtLeft);
        assert_eq!(segment.subject_placement(6), Placement::Inside);
        assert_eq!(segment.subject_placement(7), Placement::AtRight);

        assert_eq!(segment.reference_placement(9), Placement::AtLeft);
        assert_eq!(segment.reference_placement(12), Placement::Inside);
        assert_eq!(segment.reference_placement(13), Placement::AtRight);
    }

    #[test]
    fn translation_stays_inside_the_block() {
        let segment = CanonicalSegment::new(10, 4, 3);

        assert_eq!(segment.reference_position(4), Some(10));
        assert_eq!(segment.reference_position(6), Some(12));
        assert_eq!(segment.reference_position(7), None);
        assert_eq!(segment.subject_position(11), Some(5));
        assert_eq!(segment.subject_position(9), None);
    }

    #[test]
    fn rebinding_inverts_canonicalization() -> Result<(), Box<dyn std::error::Error>> {
        for (reference, direction) in [
            (Range::new(50, 54), Direction::Forward),
            (Range::new(54, 50), Direction::Reverse),
        ] {
            let alignment = Alignment::try_new(reference, Range::new(8, 12))?;
            let anchor = Anchor::of(&alignment, direction);
            let canonical = CanonicalSegment::from_alignment(&alignment, anchor, direction);

            assert_eq!(canonical, CanonicalSegment::new(1, 1, 5));
            assert_eq!(
                canonical.rebind(anchor, direction),
                Segment::from(&alignment)
            );
        }

        Ok(())
    }
}
