//! Translation of positions between a subject and a reference.

use crate::core::Position;

/// A capability to translate positions between the subject axis and the
/// reference axis of an aligned pair of sequences.
///
/// Both methods are total: a position that does not fall within an aligned
/// block yields `None` rather than an error.
pub trait Translate {
    /// Translates a subject position into the reference coordinate space.
    fn reference_position(&self, subject_position: Position) -> Option<Position>;

    /// Translates a reference position into the subject coordinate space.
    fn subject_position(&self, reference_position: Position) -> Option<Position>;
}
