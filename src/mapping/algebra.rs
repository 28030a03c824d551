//! Inversion and composition of mappings.
//!
//! Composition chains a mapping `r` (subject onto an intermediate space) with
//! a mapping `t` (that intermediate space onto a reference):
//!
//! ```text
//! read ──r──▶ contig ──t──▶ parent
//!  1-10      101-110        900-891
//! ```
//!
//! Both alignment lists are walked with one cursor each along the shared
//! intermediate axis. Every overlap between the current pair of blocks is
//! projected onto the outer axes and emitted, then the cursor whose block
//! ends first advances. Emitted blocks that are contiguous on both axes are
//! joined, so the result does not depend on how either input was split.

use crate::alignment::Alignment;
use crate::alignment::Segment;
use crate::core::Direction;
use crate::core::Range;
use crate::core::Translate as _;
use crate::mapping::Mapping;
use crate::mapping::Representation;

/// Inverts a mapping, swapping the roles of the subject and the reference.
///
/// # Examples
///
/// ```
/// use contigmap::alignment::Alignment;
/// use contigmap::core::Range;
/// use contigmap::core::Translate as _;
/// use contigmap::mapping::algebra::invert;
/// use contigmap::mapping::Mapping;
///
/// let read_to_contig = Mapping::try_new(
///     7,
///     1,
///     vec![
///         Alignment::try_new(Range::new(30, 26), Range::new(1, 5))?,
///         Alignment::try_new(Range::new(24, 20), Range::new(6, 10))?,
///     ],
/// )?;
///
/// let contig_to_read = invert(&read_to_contig);
///
/// assert_eq!(contig_to_read.subject_id(), 1);
/// assert_eq!(contig_to_read.reference_id(), 7);
/// assert_eq!(contig_to_read.reference_position(26), Some(5));
/// assert_eq!(contig_to_read.reference_position(25), None);
/// assert_eq!(invert(&contig_to_read).alignments(), read_to_contig.alignments());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn invert(mapping: &Mapping) -> Mapping {
    let mut alignments = mapping
        .alignments()
        .iter()
        .map(Alignment::inverse)
        .collect::<Vec<_>>();
    alignments.sort_by_key(|alignment| alignment.subject().start());

    let segments = alignments.iter().map(Segment::from).collect();

    Mapping::from_parts(
        mapping.reference_id(),
        mapping.subject_id(),
        mapping.direction(),
        Representation::Explicit(segments),
    )
}

/// Composes `r` (subject onto an intermediate space) with `t` (the
/// intermediate space onto a reference).
///
/// Returns `None` when the mappings do not share the intermediate space
/// (`r`'s reference id differs from `t`'s subject id), when the mappings have
/// no overlap in that space, or when an overlap fails to project.
///
/// # Examples
///
/// ```
/// use contigmap::alignment::Alignment;
/// use contigmap::core::Direction;
/// use contigmap::core::Range;
/// use contigmap::mapping::algebra::compose;
/// use contigmap::mapping::Mapping;
///
/// let read_to_contig = Mapping::try_new(
///     7,
///     1,
///     vec![Alignment::try_new(Range::new(101, 110), Range::new(1, 10))?],
/// )?;
/// let contig_to_parent = Mapping::try_new(
///     1,
///     50,
///     vec![Alignment::try_new(Range::new(1000, 801), Range::new(1, 200))?],
/// )?;
///
/// let read_to_parent = compose(&read_to_contig, &contig_to_parent).unwrap();
///
/// assert_eq!(read_to_parent.subject_id(), 7);
/// assert_eq!(read_to_parent.reference_id(), 50);
/// assert_eq!(read_to_parent.direction(), Direction::Reverse);
/// assert_eq!(
///     read_to_parent.alignments(),
///     [Alignment::try_new(Range::new(900, 891), Range::new(1, 10))?]
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compose(r: &Mapping, t: &Mapping) -> Option<Mapping> {
    if r.reference_id() != t.subject_id() {
        return None;
    }

    // Both lists are ordered along the intermediate axis.
    let mut rs = r.alignments();
    rs.sort_by_key(|alignment| alignment.reference().low());
    let ts = t.alignments();

    let mut composed = Vec::with_capacity(rs.len() + ts.len());
    let (mut i, mut j) = (0, 0);

    while i < rs.len() && j < ts.len() {
        let (a, b) = (&rs[i], &ts[j]);
        let (a_low, a_high) = (a.reference().low(), a.reference().high());
        let (b_low, b_high) = (b.subject().low(), b.subject().high());

        let low = a_low.max(b_low);
        let high = a_high.min(b_high);

        if low <= high {
            let subject = Range::new(a.subject_position(low)?, a.subject_position(high)?);
            let reference = Range::new(b.reference_position(low)?, b.reference_position(high)?);
            composed.push(Alignment::try_new(reference, subject).ok()?);
        }

        match a_high.cmp(&b_high) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }

    composed.shrink_to_fit();

    Mapping::assemble(
        r.subject_id(),
        t.reference_id(),
        coalesce(composed),
        r.direction().compose(t.direction()),
    )
    .ok()
}

/// Joins alignments that are contiguous on both axes.
fn coalesce(mut alignments: Vec<Alignment>) -> Vec<Alignment> {
    alignments.sort_by_key(|alignment| alignment.subject().start());

    let mut joined: Vec<Alignment> = Vec::with_capacity(alignments.len());

    for next in alignments {
        if let Some(last) = joined.last_mut() {
            if let Some(longer) = join(last, &next) {
                *last = longer;
                continue;
            }
        }

        joined.push(next);
    }

    joined
}

/// Joins `b` onto the end of `a` if they are contiguous on both axes and
/// agree on direction.
fn join(a: &Alignment, b: &Alignment) -> Option<Alignment> {
    if b.subject().start() != a.subject().end() + 1 {
        return None;
    }

    let direction = match b.reference().start() - a.reference().end() {
        1 => Direction::Forward,
        -1 => Direction::Reverse,
        _ => return None,
    };

    let agrees = |alignment: &Alignment| {
        !alignment.direction().is_known() || alignment.direction() == direction
    };

    if !(agrees(a) && agrees(b)) {
        return None;
    }

    Some(Alignment::normalized(
        Range::new(a.reference().start(), b.reference().end()),
        Range::new(a.subject().start(), b.subject().end()),
    ))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::Rng as _;
    use rand::SeedableRng as _;

    use super::*;
    use crate::core::Position;

    /// Generates one link of a chain: a gapped mapping from `subject_id`
    /// (starting near `subject_start`) onto `reference_id`.
    fn link(
        rng: &mut StdRng,
        subject_id: u64,
        reference_id: u64,
        subject_start: Position,
        reference_start: Position,
    ) -> Mapping {
        let direction = match rng.gen_bool(0.5) {
            true => Direction::Forward,
            false => Direction::Reverse,
        };
        let sign = direction.sign();

        let mut subject = subject_start;
        let mut reference = reference_start;
        let mut alignments = Vec::new();

        for _ in 0..rng.gen_range(2..8) {
            let length = rng.gen_range(2..60);
            alignments.push(
                Alignment::try_new(
                    Range::new(reference, reference + sign * (length - 1)),
                    Range::new(subject, subject + length - 1),
                )
                .unwrap(),
            );

            subject += length + rng.gen_range(0..6);
            reference += sign * (length + rng.gen_range(0..6));
        }

        Mapping::try_new(subject_id, reference_id, alignments).unwrap()
    }

    #[test]
    fn double_inversion_is_identity() {
        let mut rng = StdRng::seed_from_u64(41);

        for _ in 0..200 {
            let mapping = link(&mut rng, 1, 2, 1, 1_000);
            let twice = invert(&invert(&mapping));

            assert_eq!(twice.subject_id(), 1);
            assert_eq!(twice.reference_id(), 2);
            assert_eq!(twice.direction(), mapping.direction());
            assert_eq!(twice.alignments(), mapping.alignments());
        }
    }

    #[test]
    fn composition_is_associative() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut composed = 0;

        for _ in 0..300 {
            let a = link(&mut rng, 1, 2, 1, 500);
            let b = link(&mut rng, 2, 3, 480, 2_000);
            let c = link(&mut rng, 3, 4, 1_700, 9_000);

            let left = compose(&a, &b).and_then(|ab| compose(&ab, &c));
            let right = compose(&b, &c).and_then(|bc| compose(&a, &bc));

            assert_eq!(
                left.as_ref().map(Mapping::alignments),
                right.as_ref().map(Mapping::alignments)
            );

            if let (Some(left), Some(right)) = (left, right) {
                assert_eq!(left.direction(), right.direction());
                composed += 1;
            }
        }

        assert!(composed > 0);
    }

    #[test]
    fn composing_with_the_inverse_gives_the_identity_on_covered_positions(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mapping = Mapping::try_new(
            1,
            2,
            vec![
                Alignment::try_new(Range::new(10, 15), Range::new(100, 105))?,
                Alignment::try_new(Range::new(20, 25), Range::new(106, 111))?,
            ],
        )?;

        let identity = compose(&mapping, &invert(&mapping)).unwrap();

        assert_eq!(identity.subject_id(), 1);
        assert_eq!(identity.reference_id(), 1);
        assert_eq!(identity.direction(), Direction::Forward);
        assert_eq!(
            identity.alignments(),
            [Alignment::try_new(Range::new(100, 111), Range::new(100, 111))?]
        );

        Ok(())
    }

    #[test]
    fn gaps_in_the_outer_mapping_split_blocks() -> Result<(), Box<dyn std::error::Error>> {
        let read_to_contig = Mapping::try_new(
            7,
            1,
            vec![Alignment::try_new(Range::new(11, 30), Range::new(1, 20))?],
        )?;
        let contig_to_parent = Mapping::try_new(
            1,
            9,
            vec![
                Alignment::try_new(Range::new(101, 120), Range::new(1, 20))?,
                Alignment::try_new(Range::new(131, 150), Range::new(21, 40))?,
            ],
        )?;

        let read_to_parent = compose(&read_to_contig, &contig_to_parent).unwrap();

        assert_eq!(
            read_to_parent.alignments(),
            [
                Alignment::try_new(Range::new(111, 120), Range::new(1, 10))?,
                Alignment::try_new(Range::new(131, 140), Range::new(11, 20))?,
            ]
        );

        Ok(())
    }

    #[test]
    fn unrelated_or_disjoint_mappings_do_not_compose() -> Result<(), Box<dyn std::error::Error>> {
        let r = Mapping::try_new(
            7,
            1,
            vec![Alignment::try_new(Range::new(11, 30), Range::new(1, 20))?],
        )?;
        let elsewhere = Mapping::try_new(
            1,
            9,
            vec![Alignment::try_new(Range::new(1, 10), Range::new(500, 509))?],
        )?;
        let unrelated = Mapping::try_new(
            2,
            9,
            vec![Alignment::try_new(Range::new(1, 20), Range::new(11, 30))?],
        )?;

        assert!(compose(&r, &elsewhere).is_none());
        assert!(compose(&r, &unrelated).is_none());

        Ok(())
    }

    #[test]
    fn unknown_direction_propagates() -> Result<(), Box<dyn std::error::Error>> {
        let single = Mapping::try_new(
            7,
            1,
            vec![Alignment::try_new(Range::new(15, 15), Range::new(3, 3))?],
        )?;
        let reverse = Mapping::try_new(
            1,
            9,
            vec![Alignment::try_new(Range::new(100, 81), Range::new(1, 20))?],
        )?;

        let composed = compose(&single, &reverse).unwrap();
        assert_eq!(composed.direction(), Direction::Unknown);
        assert_eq!(composed.reference_position(3), Some(86));

        Ok(())
    }
}
