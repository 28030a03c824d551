//! Pairs of ranges that align contiguously.
//!
//! An [`Alignment`] couples a range on the reference (for example, a contig)
//! with a range of the same length on the subject (for example, a read). The
//! subject range is always stored forward: if the caller provides a reverse
//! subject range, both ranges are mirrored at construction time. Orientation
//! therefore lives entirely in the sense of the reference range.
//!
//! ```text
//! reference  10  11  12  13  14         reference  14  13  12  11  10
//!            |   |   |   |   |    ==>              |   |   |   |   |
//! subject    40  39  38  37  36         subject    36  37  38  39  40
//! ```

use crate::core::Direction;
use crate::core::Placement;
use crate::core::Position;
use crate::core::Range;
use crate::core::Translate;

pub mod segment;

pub use segment::Segment;

/// An error related to constructing an alignment.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The two ranges don't have the same length. As such, they can't
    /// contiguously map to one another.
    LengthMismatch(i64, i64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LengthMismatch(reference, subject) => write!(
                f,
                "reference range length ({reference}) doesn't match subject range length \
                 ({subject})"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A contiguous, ungapped block aligning a subject range to a reference range.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Alignment {
    /// The reference range.
    reference: Range,

    /// The subject range (never reverse).
    subject: Range,
}

impl Alignment {
    /// Attempts to create a new [`Alignment`] from a reference range and a
    /// subject range.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// let alignment = Alignment::try_new(Range::new(10, 14), Range::new(40, 36))?;
    ///
    /// // The subject range is stored forward.
    /// assert_eq!(alignment.subject(), Range::new(36, 40));
    /// assert_eq!(alignment.reference(), Range::new(14, 10));
    /// assert_eq!(alignment.direction(), Direction::Reverse);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(reference: Range, subject: Range) -> Result<Self> {
        if reference.length() != subject.length() {
            return Err(Error::LengthMismatch(reference.length(), subject.length()));
        }

        Ok(Self::normalized(reference, subject))
    }

    /// Creates an alignment from ranges already known to have equal lengths.
    pub(crate) fn normalized(reference: Range, subject: Range) -> Self {
        debug_assert_eq!(reference.length(), subject.length());

        match subject.direction() {
            Direction::Reverse => Self {
                reference: reference.reverse(),
                subject: subject.reverse(),
            },
            _ => Self { reference, subject },
        }
    }

    /// Gets the reference range.
    pub fn reference(&self) -> Range {
        self.reference
    }

    /// Gets the subject range.
    pub fn subject(&self) -> Range {
        self.subject
    }

    /// Consumes `self` and returns the reference and subject ranges.
    pub fn into_parts(self) -> (Range, Range) {
        (self.reference, self.subject)
    }

    /// Gets the number of positions aligned.
    pub fn length(&self) -> i64 {
        self.subject.length()
    }

    /// Gets the direction of the alignment.
    ///
    /// A single-base alignment carries no evidence of its orientation and is
    /// [`Direction::Unknown`].
    pub fn direction(&self) -> Direction {
        self.reference.direction()
    }

    /// Gets the alignment with the subject and reference roles swapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Range;
    ///
    /// let alignment = Alignment::try_new(Range::new(14, 10), Range::new(36, 40))?;
    /// let inverse = alignment.inverse();
    ///
    /// assert_eq!(inverse.subject(), Range::new(10, 14));
    /// assert_eq!(inverse.reference(), Range::new(40, 36));
    /// assert_eq!(inverse.inverse(), alignment);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn inverse(&self) -> Self {
        Self::normalized(self.subject, self.reference)
    }

    /// Gets the alignment with its reference range shifted by `delta`.
    pub fn shift_reference(&self, delta: i64) -> Self {
        Self::normalized(self.reference.offset(delta), self.subject)
    }

    /// Gets the alignment with its reference range mirrored around `pivot`.
    pub fn mirror_reference(&self, pivot: Position) -> Self {
        Self::normalized(self.reference.mirror(pivot), self.subject)
    }

    /// Rebinds a canonical (offset-free) alignment into absolute coordinates.
    ///
    /// The subject range is shifted by `subject_offset`. The reference range
    /// is shifted by `reference_offset` when `direction` is forward (or
    /// unknown); when `direction` is reverse, the canonical reference range is
    /// first mirrored around zero and then shifted. This is the inverse of
    /// canonicalization.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    ///
    /// let canonical = Alignment::try_new(Range::new(1, 5), Range::new(1, 5))?;
    ///
    /// let forward = canonical.apply_offsets_and_direction(9, 35, Direction::Forward);
    /// assert_eq!(forward.reference(), Range::new(10, 14));
    /// assert_eq!(forward.subject(), Range::new(36, 40));
    ///
    /// let reverse = canonical.apply_offsets_and_direction(15, 35, Direction::Reverse);
    /// assert_eq!(reverse.reference(), Range::new(14, 10));
    /// assert_eq!(reverse.subject(), Range::new(36, 40));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_offsets_and_direction(
        &self,
        reference_offset: i64,
        subject_offset: i64,
        direction: Direction,
    ) -> Self {
        let subject = self.subject.offset(subject_offset);
        let reference = match direction {
            Direction::Reverse => self.reference.mirror(0).offset(reference_offset),
            Direction::Forward | Direction::Unknown => self.reference.offset(reference_offset),
        };

        Self::normalized(reference, subject)
    }

    /// Classifies a reference position relative to the alignment.
    ///
    /// The answer is geometric along the reference axis and does not depend on
    /// the direction of the alignment (see [`crate::core::placement`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Placement;
    /// use contigmap::core::Range;
    ///
    /// let alignment = Alignment::try_new(Range::new(14, 10), Range::new(36, 40))?;
    ///
    /// assert_eq!(alignment.placement(9), Placement::AtLeft);
    /// assert_eq!(alignment.placement(12), Placement::Inside);
    /// assert_eq!(alignment.placement(15), Placement::AtRight);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn placement(&self, reference_position: Position) -> Placement {
        self.reference.placement(reference_position)
    }

    /// Classifies a subject position relative to the alignment.
    pub fn subject_placement(&self, subject_position: Position) -> Placement {
        self.subject.placement(subject_position)
    }
}

impl Translate for Alignment {
    /// Translates a subject position into the reference space.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Range;
    /// use contigmap::core::Translate as _;
    ///
    /// let alignment = Alignment::try_new(Range::new(10, 14), Range::new(40, 36))?;
    ///
    /// assert_eq!(alignment.reference_position(36), Some(14));
    /// assert_eq!(alignment.reference_position(38), Some(12));
    /// assert_eq!(alignment.reference_position(41), None);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn reference_position(&self, subject_position: Position) -> Option<Position> {
        let offset = subject_position - self.subject.start();

        if offset < 0 || offset >= self.length() {
            return None;
        }

        Some(self.reference.start() + self.direction().sign() * offset)
    }

    fn subject_position(&self, reference_position: Position) -> Option<Position> {
        let offset = (reference_position - self.reference.start()) * self.direction().sign();

        if offset < 0 || offset >= self.length() {
            return None;
        }

        Some(self.subject.start() + offset)
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.subject, self.reference)
    }
}

/// Infers the direction of a list of alignments sorted by subject position.
///
/// - An empty list yields [`Direction::Unknown`].
/// - Otherwise, the direction of the first alignment with a determinate
///   direction is returned.
/// - If every alignment is a single base, the relative order of the subject
///   and reference positions of the first two distinct alignments decides.
///
/// # Examples
///
/// ```
/// use contigmap::alignment::infer_direction;
/// use contigmap::alignment::Alignment;
/// use contigmap::core::Direction;
/// use contigmap::core::Range;
///
/// assert_eq!(infer_direction(&[]), Direction::Unknown);
///
/// let block = Alignment::try_new(Range::new(10, 14), Range::new(40, 36))?;
/// assert_eq!(infer_direction(&[block]), Direction::Reverse);
///
/// let a = Alignment::try_new(Range::new(20, 20), Range::new(5, 5))?;
/// let b = Alignment::try_new(Range::new(18, 18), Range::new(7, 7))?;
/// assert_eq!(infer_direction(&[a]), Direction::Unknown);
/// assert_eq!(infer_direction(&[a, b]), Direction::Reverse);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn infer_direction(alignments: &[Alignment]) -> Direction {
    if let Some(direction) = alignments
        .iter()
        .map(Alignment::direction)
        .find(Direction::is_known)
    {
        return direction;
    }

    let first = match alignments.first() {
        Some(first) => first,
        None => return Direction::Unknown,
    };

    let second = alignments.iter().skip(1).find(|other| {
        other.subject.start() != first.subject.start()
            && other.reference.start() != first.reference.start()
    });

    match second {
        Some(second) => {
            let subject_ascends = second.subject.start() > first.subject.start();
            let reference_ascends = second.reference.start() > first.reference.start();

            match subject_ascends == reference_ascends {
                true => Direction::Forward,
                false => Direction::Reverse,
            }
        }
        None => Direction::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::Rng as _;
    use rand::SeedableRng as _;

    use super::*;

    fn random_alignment(rng: &mut StdRng) -> Alignment {
        let length = rng.gen_range(1..50);
        let reference_start = rng.gen_range(1..1_000);
        let subject_start = rng.gen_range(1..1_000);

        let reference = match rng.gen_bool(0.5) {
            true => Range::new(reference_start, reference_start + length - 1),
            false => Range::new(reference_start + length - 1, reference_start),
        };
        let subject = match rng.gen_bool(0.5) {
            true => Range::new(subject_start, subject_start + length - 1),
            false => Range::new(subject_start + length - 1, subject_start),
        };

        Alignment::try_new(reference, subject).unwrap()
    }

    #[test]
    fn lengths_must_match() {
        let err = Alignment::try_new(Range::new(1, 10), Range::new(1, 9)).unwrap_err();
        assert_eq!(err, Error::LengthMismatch(10, 9));
        assert_eq!(
            err.to_string(),
            "reference range length (10) doesn't match subject range length (9)"
        );
    }

    #[test]
    fn subject_is_always_forward() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let alignment = random_alignment(&mut rng);
            assert_ne!(alignment.subject().direction(), Direction::Reverse);
        }
    }

    #[test]
    fn double_inverse_is_identity() {
        let mut rng = StdRng::seed_from_u64(13);

        for _ in 0..500 {
            let alignment = random_alignment(&mut rng);
            assert_eq!(alignment.inverse().inverse(), alignment);
            assert_eq!(alignment.inverse().direction(), alignment.direction());
        }
    }

    #[test]
    fn translation_round_trips_inside_the_block() {
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..200 {
            let alignment = random_alignment(&mut rng);
            let subject = alignment.subject();

            for position in subject.low()..=subject.high() {
                let reference = alignment.reference_position(position).unwrap();
                assert!(alignment.reference().contains(reference));
                assert_eq!(alignment.subject_position(reference), Some(position));
            }

            assert_eq!(alignment.reference_position(subject.low() - 1), None);
            assert_eq!(alignment.reference_position(subject.high() + 1), None);
        }
    }

    #[test]
    fn inverse_translation_swaps_axes() -> Result<()> {
        let alignment = Alignment::try_new(Range::new(10, 14), Range::new(40, 36))?;
        let inverse = alignment.inverse();

        for subject in 36..=40 {
            let reference = alignment.reference_position(subject);
            assert_eq!(inverse.subject_position(subject), reference);
        }

        Ok(())
    }

    #[test]
    fn direction_inference_uses_distinct_single_bases() -> Result<()> {
        let a = Alignment::try_new(Range::new(20, 20), Range::new(5, 5))?;
        let same = Alignment::try_new(Range::new(20, 20), Range::new(5, 5))?;
        let forward = Alignment::try_new(Range::new(22, 22), Range::new(7, 7))?;

        assert_eq!(infer_direction(&[a, same]), Direction::Unknown);
        assert_eq!(infer_direction(&[a, same, forward]), Direction::Forward);

        Ok(())
    }
}
