//! Ungapped blocks anchored on the subject axis.

use crate::alignment::Alignment;
use crate::core::Direction;
use crate::core::Placement;
use crate::core::Position;
use crate::core::Range;

/// A contiguous, ungapped block between a reference and a subject.
///
/// A segment does not know its own orientation: the direction of the mapping
/// that owns it is supplied to every reference-side operation. Under
/// [`Direction::Reverse`], the reference coordinates *descend* from
/// `reference_start` as the subject coordinates ascend.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Segment {
    /// The reference position aligned to the first subject position.
    reference_start: Position,

    /// The first subject position.
    subject_start: Position,

    /// The number of aligned positions.
    length: i64,
}

impl Segment {
    /// Creates a new [`Segment`].
    ///
    /// A length below one is repaired to one.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Segment;
    ///
    /// let segment = Segment::new(10, 100, 6);
    /// assert_eq!(segment.subject_finish(), 105);
    ///
    /// let repaired = Segment::new(10, 100, 0);
    /// assert_eq!(repaired.length(), 1);
    /// ```
    pub fn new(reference_start: Position, subject_start: Position, length: i64) -> Self {
        Self {
            reference_start,
            subject_start,
            length: length.max(1),
        }
    }

    /// Gets the reference position aligned to the first subject position.
    pub fn reference_start(&self) -> Position {
        self.reference_start
    }

    /// Gets the first subject position.
    pub fn subject_start(&self) -> Position {
        self.subject_start
    }

    /// Gets the number of aligned positions.
    pub fn length(&self) -> i64 {
        self.length
    }

    /// Gets the last subject position.
    pub fn subject_finish(&self) -> Position {
        self.subject_start + self.length - 1
    }

    /// Gets the reference position aligned to the last subject position.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Segment;
    /// use contigmap::core::Direction;
    ///
    /// let segment = Segment::new(14, 36, 5);
    /// assert_eq!(segment.reference_finish(Direction::Forward), 18);
    /// assert_eq!(segment.reference_finish(Direction::Reverse), 10);
    /// ```
    pub fn reference_finish(&self, direction: Direction) -> Position {
        self.reference_start + direction.sign() * (self.length - 1)
    }

    /// Gets the subject range (always forward, or a single base).
    pub fn subject_range(&self) -> Range {
        Range::new(self.subject_start, self.subject_finish())
    }

    /// Gets the reference range in the sense given by `direction`.
    pub fn reference_range(&self, direction: Direction) -> Range {
        Range::new(self.reference_start, self.reference_finish(direction))
    }

    /// Translates a subject position into the reference space.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Segment;
    /// use contigmap::core::Direction;
    ///
    /// let segment = Segment::new(14, 36, 5);
    ///
    /// assert_eq!(segment.reference_position(37, Direction::Forward), Some(15));
    /// assert_eq!(segment.reference_position(37, Direction::Reverse), Some(13));
    /// assert_eq!(segment.reference_position(41, Direction::Reverse), None);
    /// ```
    pub fn reference_position(
        &self,
        subject_position: Position,
        direction: Direction,
    ) -> Option<Position> {
        let offset = subject_position - self.subject_start;

        if !(0..self.length).contains(&offset) {
            return None;
        }

        Some(self.reference_start + direction.sign() * offset)
    }

    /// Translates a reference position into the subject space.
    pub fn subject_position(
        &self,
        reference_position: Position,
        direction: Direction,
    ) -> Option<Position> {
        let offset = (reference_position - self.reference_start) * direction.sign();

        if !(0..self.length).contains(&offset) {
            return None;
        }

        Some(self.subject_start + offset)
    }

    /// Classifies a subject position relative to the segment.
    pub fn subject_placement(&self, subject_position: Position) -> Placement {
        self.subject_range().placement(subject_position)
    }

    /// Classifies a reference position relative to the segment.
    ///
    /// The answer is geometric: under [`Direction::Reverse`], a position
    /// below `reference_finish` is still [`Placement::AtLeft`].
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Segment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Placement;
    ///
    /// let segment = Segment::new(14, 36, 5);
    ///
    /// assert_eq!(segment.reference_placement(9, Direction::Reverse), Placement::AtLeft);
    /// assert_eq!(segment.reference_placement(10, Direction::Reverse), Placement::Inside);
    /// assert_eq!(segment.reference_placement(15, Direction::Reverse), Placement::AtRight);
    /// ```
    pub fn reference_placement(
        &self,
        reference_position: Position,
        direction: Direction,
    ) -> Placement {
        self.reference_range(direction).placement(reference_position)
    }

    /// Converts the segment into an [`Alignment`] in the sense given by
    /// `direction`.
    pub fn to_alignment(&self, direction: Direction) -> Alignment {
        Alignment::normalized(self.reference_range(direction), self.subject_range())
    }
}

impl From<&Alignment> for Segment {
    fn from(alignment: &Alignment) -> Self {
        Segment::new(
            alignment.reference().start(),
            alignment.subject().start(),
            alignment.length(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_translation_round_trips() {
        let segment = Segment::new(14, 36, 5);

        for subject in 36..=40 {
            let reference = segment.reference_position(subject, Direction::Reverse).unwrap();
            assert_eq!(reference, 14 - (subject - 36));
            assert_eq!(
                segment.subject_position(reference, Direction::Reverse),
                Some(subject)
            );
        }

        assert_eq!(segment.subject_position(15, Direction::Reverse), None);
        assert_eq!(segment.subject_position(9, Direction::Reverse), None);
    }

    #[test]
    fn alignment_conversion_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let alignment = Alignment::try_new(Range::new(10, 14), Range::new(40, 36))?;
        let segment = Segment::from(&alignment);

        assert_eq!(segment, Segment::new(14, 36, 5));
        assert_eq!(segment.to_alignment(alignment.direction()), alignment);

        Ok(())
    }

    #[test]
    fn single_base_segments_ignore_direction() {
        let segment = Segment::new(7, 3, 1);

        for direction in [Direction::Forward, Direction::Reverse, Direction::Unknown] {
            assert_eq!(segment.reference_finish(direction), 7);
            assert_eq!(segment.reference_position(3, direction), Some(7));
            assert_eq!(segment.subject_position(7, direction), Some(3));
        }
    }
}
