//! Placement of a position relative to a block, and a locator over sorted
//! lists of blocks.
//!
//! Placement is always geometric along the axis being queried: a position is
//! [`Placement::AtLeft`] of a block when it is below the lowest coordinate the
//! block covers on that axis and [`Placement::AtRight`] when it is above the
//! highest one. The orientation of a mapping never changes this answer.
//! Instead, the [`Order`] of the list being searched is stated explicitly when
//! calling [`locate()`] or [`search()`].
//!
//! ```text
//!            block: 10-14
//!   ----------[=========]----------
//!      9      10       14     15
//!   AtLeft      Inside      AtRight
//! ```

use crate::core::Position;

/// Where a position falls relative to a block.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Placement {
    /// The position is below the block.
    AtLeft,

    /// The position is covered by the block.
    Inside,

    /// The position is above the block.
    AtRight,
}

impl Placement {
    /// Classifies `position` against the inclusive bounds `[low, high]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Placement;
    ///
    /// assert_eq!(Placement::of(9, 10, 14), Placement::AtLeft);
    /// assert_eq!(Placement::of(10, 10, 14), Placement::Inside);
    /// assert_eq!(Placement::of(14, 10, 14), Placement::Inside);
    /// assert_eq!(Placement::of(15, 10, 14), Placement::AtRight);
    /// ```
    pub fn of(position: Position, low: Position, high: Position) -> Placement {
        if position < low {
            Placement::AtLeft
        } else if position > high {
            Placement::AtRight
        } else {
            Placement::Inside
        }
    }
}

/// The order of a list of blocks along the axis being queried.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Blocks appear from the lowest coordinate to the highest.
    Ascending,

    /// Blocks appear from the highest coordinate to the lowest.
    Descending,
}

/// Binary searches a sorted list of non-overlapping blocks.
///
/// `probe` reports the geometric [`Placement`] of the position being searched
/// for relative to each block. If a block contains the position, its index is
/// returned as `Ok`. Otherwise, `Err` holds the index at which a block
/// containing the position would have to be inserted to keep the list in
/// `order` (so the flanking blocks, if any, are at `index - 1` and `index`).
///
/// # Examples
///
/// ```
/// use contigmap::core::placement::search;
/// use contigmap::core::Order;
/// use contigmap::core::Placement;
///
/// let blocks = [(1, 5), (10, 14), (20, 25)];
/// let probe = |position| move |&(low, high): &(i64, i64)| Placement::of(position, low, high);
///
/// assert_eq!(search(&blocks, Order::Ascending, probe(12)), Ok(1));
/// assert_eq!(search(&blocks, Order::Ascending, probe(17)), Err(2));
///
/// let reversed = [(20, 25), (10, 14), (1, 5)];
/// assert_eq!(search(&reversed, Order::Descending, probe(12)), Ok(1));
/// assert_eq!(search(&reversed, Order::Descending, probe(17)), Err(1));
/// ```
pub fn search<T, F>(items: &[T], order: Order, mut probe: F) -> Result<usize, usize>
where
    F: FnMut(&T) -> Placement,
{
    let mut low = 0usize;
    let mut high = items.len();

    while low < high {
        let mid = low + (high - low) / 2;

        match (probe(&items[mid]), order) {
            (Placement::Inside, _) => return Ok(mid),
            (Placement::AtLeft, Order::Ascending) | (Placement::AtRight, Order::Descending) => {
                high = mid
            }
            (Placement::AtRight, Order::Ascending) | (Placement::AtLeft, Order::Descending) => {
                low = mid + 1
            }
        }
    }

    Err(low)
}

/// Finds the index of the block containing a position, if any.
///
/// This is [`search()`] without the insertion point.
///
/// # Examples
///
/// ```
/// use contigmap::core::placement::locate;
/// use contigmap::core::Order;
/// use contigmap::core::Placement;
///
/// let blocks = [(1, 5), (10, 14), (20, 25)];
///
/// assert_eq!(
///     locate(&blocks, Order::Ascending, |&(l, h)| Placement::of(21, l, h)),
///     Some(2)
/// );
/// assert_eq!(
///     locate(&blocks, Order::Ascending, |&(l, h)| Placement::of(7, l, h)),
///     None
/// );
/// ```
pub fn locate<T, F>(items: &[T], order: Order, probe: F) -> Option<usize>
where
    F: FnMut(&T) -> Placement,
{
    search(items, order, probe).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(position: Position) -> impl Fn(&(Position, Position)) -> Placement {
        move |&(low, high)| Placement::of(position, low, high)
    }

    #[test]
    fn ascending_and_descending_lists_agree() {
        let ascending = [(1, 5), (10, 14), (20, 25), (30, 30)];
        let descending = [(30, 30), (20, 25), (10, 14), (1, 5)];

        for position in -5..40 {
            let a = locate(&ascending, Order::Ascending, probe(position)).map(|i| ascending[i]);
            let d = locate(&descending, Order::Descending, probe(position)).map(|i| descending[i]);
            assert_eq!(a, d, "position {position}");
        }
    }

    #[test]
    fn insertion_points_flank_the_position() {
        let ascending = [(1, 5), (10, 14), (20, 25)];

        assert_eq!(search(&ascending, Order::Ascending, probe(0)), Err(0));
        assert_eq!(search(&ascending, Order::Ascending, probe(7)), Err(1));
        assert_eq!(search(&ascending, Order::Ascending, probe(26)), Err(3));

        let descending = [(20, 25), (10, 14), (1, 5)];

        assert_eq!(search(&descending, Order::Descending, probe(26)), Err(0));
        assert_eq!(search(&descending, Order::Descending, probe(7)), Err(2));
        assert_eq!(search(&descending, Order::Descending, probe(0)), Err(3));
    }

    #[test]
    fn empty_lists_never_contain_a_position() {
        let empty: [(Position, Position); 0] = [];
        assert_eq!(search(&empty, Order::Ascending, probe(1)), Err(0));
        assert_eq!(locate(&empty, Order::Descending, probe(1)), None);
    }
}
