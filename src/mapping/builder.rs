//! A builder for a mapping.

use crate::alignment::Alignment;
use crate::core::Direction;
use crate::mapping;
use crate::mapping::Mapping;

/// An error that occurs when a required field was never provided to the
/// [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MissingError {
    /// No subject id was provided to the [`Builder`].
    SubjectId,

    /// No reference id was provided to the [`Builder`].
    ReferenceId,
}

impl std::fmt::Display for MissingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingError::SubjectId => write!(f, "subject id"),
            MissingError::ReferenceId => write!(f, "reference id"),
        }
    }
}

impl std::error::Error for MissingError {}

/// An error that occurs when a singular field was provided multiple times to
/// the [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MultipleError {
    /// The subject id was provided multiple times.
    SubjectId,

    /// The reference id was provided multiple times.
    ReferenceId,

    /// The direction was provided multiple times.
    Direction,
}

impl std::fmt::Display for MultipleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipleError::SubjectId => write!(f, "subject id"),
            MultipleError::ReferenceId => write!(f, "reference id"),
            MultipleError::Direction => write!(f, "direction"),
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

    /// The alignments do not form a valid mapping.
    Mapping(mapping::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Missing(err) => write!(f, "missing required field: {err}"),
            Error::Multiple(err) => write!(f, "singular field set multiple times: {err}"),
            Error::Mapping(err) => write!(f, "invalid mapping: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Mapping`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The subject id.
    subject_id: Option<u64>,

    /// The reference id.
    reference_id: Option<u64>,

    /// The direction to use when none can be inferred.
    direction: Option<Direction>,

    /// The alignments.
    alignments: Vec<Alignment>,
}

impl Builder {
    /// Sets the subject id.
    pub fn subject_id(mut self, id: u64) -> Result<Self> {
        if self.subject_id.is_some() {
            return Err(Error::Multiple(MultipleError::SubjectId));
        }

        self.subject_id = Some(id);
        Ok(self)
    }

    /// Sets the reference id.
    pub fn reference_id(mut self, id: u64) -> Result<Self> {
        if self.reference_id.is_some() {
            return Err(Error::Multiple(MultipleError::ReferenceId));
        }

        self.reference_id = Some(id);
        Ok(self)
    }

    /// Sets the direction used when the alignments carry no evidence of one
    /// (for example, a single-base mapping whose direction is known from
    /// elsewhere).
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Builder;
    ///
    /// let mapping = Builder::default()
    ///     .subject_id(1)?
    ///     .reference_id(2)?
    ///     .direction(Direction::Reverse)?
    ///     .push_alignment(Alignment::try_new(Range::new(5, 5), Range::new(9, 9))?)
    ///     .try_build()?;
    ///
    /// assert_eq!(mapping.direction(), Direction::Reverse);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn direction(mut self, direction: Direction) -> Result<Self> {
        if self.direction.is_some() {
            return Err(Error::Multiple(MultipleError::Direction));
        }

        self.direction = Some(direction);
        Ok(self)
    }

    /// Pushes an alignment into the [`Builder`].
    pub fn push_alignment(mut self, alignment: Alignment) -> Self {
        self.alignments.push(alignment);
        self
    }

    /// Pushes several alignments into the [`Builder`].
    pub fn extend_alignments(mut self, alignments: impl IntoIterator<Item = Alignment>) -> Self {
        self.alignments.extend(alignments);
        self
    }

    /// Consumes `self` to attempt to build a [`Mapping`].
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::core::Direction;
    /// use contigmap::core::Range;
    /// use contigmap::mapping::Builder;
    ///
    /// let mapping = Builder::default()
    ///     .subject_id(7)?
    ///     .reference_id(1)?
    ///     .push_alignment(Alignment::try_new(Range::new(30, 26), Range::new(1, 5))?)
    ///     .push_alignment(Alignment::try_new(Range::new(24, 20), Range::new(6, 10))?)
    ///     .try_build()?;
    ///
    /// assert_eq!(mapping.subject_id(), 7);
    /// assert_eq!(mapping.reference_id(), 1);
    /// assert_eq!(mapping.direction(), Direction::Reverse);
    /// assert_eq!(mapping.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Mapping> {
        let subject_id = self
            .subject_id
            .ok_or(Error::Missing(MissingError::SubjectId))?;
        let reference_id = self
            .reference_id
            .ok_or(Error::Missing(MissingError::ReferenceId))?;

        Mapping::assemble(
            subject_id,
            reference_id,
            self.alignments,
            self.direction.unwrap_or_default(),
        )
        .map_err(Error::Mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Range;

    #[test]
    fn it_fails_to_build_without_a_subject_id() {
        let err = Builder::default()
            .reference_id(1)
            .unwrap()
            .try_build()
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required field: subject id");
    }

    #[test]
    fn it_fails_when_the_reference_id_is_provided_more_than_once() {
        let err = Builder::default()
            .reference_id(1)
            .unwrap()
            .reference_id(2)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "singular field set multiple times: reference id"
        );
    }

    #[test]
    fn it_fails_to_build_without_alignments(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .subject_id(1)?
            .reference_id(1)?
            .try_build()
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid mapping: a mapping requires at least one alignment"
        );

        Ok(())
    }

    #[test]
    fn inferred_direction_wins_over_the_fallback(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mapping = Builder::default()
            .subject_id(1)?
            .reference_id(1)?
            .direction(Direction::Reverse)?
            .extend_alignments([Alignment::try_new(Range::new(1, 5), Range::new(1, 5))?])
            .try_build()?;

        assert_eq!(mapping.direction(), Direction::Forward);

        Ok(())
    }
}
