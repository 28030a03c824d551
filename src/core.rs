//! Core functionality used across the crate.

pub mod direction;
pub mod placement;
pub mod range;
pub mod translate;

pub use direction::Direction;
pub use placement::Order;
pub use placement::Placement;
pub use range::Range;
pub use translate::Translate;

/// A 1-based position along a reference or subject axis.
///
/// Positions are signed because canonical coordinates are expressed relative
/// to an anchor and may fall on either side of it before being rebound.
pub type Position = i64;
