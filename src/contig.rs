//! Contigs: reads placed onto a shared coordinate space.
//!
//! A [`Contig`] owns the [`Mapping`] of every read assembled into it, an
//! interval index over their spans, and (once computed) its consensus. A
//! contig may itself be placed onto a parent (for example, a scaffold), in
//! which case read mappings can be lifted through it by composition.

use std::sync::Arc;

use rayon::prelude::*;
use rust_lapper as lapper;
use tracing::debug;
use tracing::error;

use crate::canonical::Registry;
use crate::consensus::sweep;
use crate::consensus::sweep::Config;
use crate::consensus::sweep::Statistics;
use crate::consensus::Algorithm;
use crate::consensus::Consensus;
use crate::consensus::Kind;
use crate::core::Position;
use crate::core::Range;
use crate::mapping::algebra;
use crate::mapping::Mapping;
use crate::read::Read;
use crate::record::AssembledFrom;

pub mod builder;

pub use builder::Builder;

/// An error related to a [`Contig`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The parent mapping does not place this contig.
    ForeignParent {
        /// The contig id.
        contig: u64,

        /// The subject id of the parent mapping.
        subject: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ForeignParent { contig, subject } => write!(
                f,
                "parent mapping places sequence {subject} rather than contig {contig}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A read together with its placement on a contig.
#[derive(Clone, Debug)]
pub struct AssembledRead {
    /// The read.
    read: Arc<Read>,

    /// The mapping of the read onto the contig.
    mapping: Mapping,
}

impl AssembledRead {
    /// Gets the read.
    pub fn read(&self) -> &Read {
        &self.read
    }

    /// Gets the mapping of the read onto the contig.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }
}

/// The interval index over the spans of the reads.
type Index = lapper::Lapper<u64, usize>;

/// A contig.
#[derive(Debug)]
pub struct Contig {
    /// The id.
    id: u64,

    /// The assembled reads, sorted by the first column they cover.
    reads: Vec<AssembledRead>,

    /// The index of the spans of `reads`, keyed relative to `origin`.
    index: Index,

    /// The lowest column covered by any read.
    origin: Position,

    /// The consensus, once computed.
    consensus: Option<Consensus>,

    /// The placement of this contig onto its parent.
    parent: Option<Mapping>,
}

impl Contig {
    /// Creates a contig from reads that are known to be placed onto it.
    fn new(id: u64, mut reads: Vec<AssembledRead>) -> Self {
        reads.sort_by_key(|assembled| (assembled.mapping.reference_start(), assembled.read.id()));

        let origin = reads
            .first()
            .map(|assembled| assembled.mapping.reference_start())
            .unwrap_or(1);

        let intervals = reads
            .iter()
            .enumerate()
            .map(|(i, assembled)| lapper::Interval {
                start: key(origin, assembled.mapping.reference_start()),
                stop: key(origin, assembled.mapping.reference_finish()) + 1,
                val: i,
            })
            .collect();

        Self {
            id,
            reads,
            index: lapper::Lapper::new(intervals),
            origin,
            consensus: None,
            parent: None,
        }
    }

    /// Gets the id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Gets the assembled reads, sorted by the first column they cover.
    pub fn reads(&self) -> &[AssembledRead] {
        &self.reads
    }

    /// Gets an assembled read by read id.
    pub fn read(&self, id: u64) -> Option<&AssembledRead> {
        self.reads.iter().find(|assembled| assembled.read.id() == id)
    }

    /// Gets the reads whose spans overlap the columns `start..=end` (in
    /// either order), sorted by the first column they cover.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::contig::Builder;
    /// use contigmap::core::Range;
    /// use contigmap::read::Read;
    ///
    /// let contig = Builder::default()
    ///     .id(100)?
    ///     .push_read(Read::new(1))
    ///     .push_alignment(1, Alignment::try_new(Range::new(1, 50), Range::new(1, 50))?)
    ///     .push_read(Read::new(2))
    ///     .push_alignment(2, Alignment::try_new(Range::new(60, 10), Range::new(1, 51))?)
    ///     .push_read(Read::new(3))
    ///     .push_alignment(3, Alignment::try_new(Range::new(55, 90), Range::new(1, 36))?)
    ///     .try_build()?;
    ///
    /// let ids = |start, end| {
    ///     contig
    ///         .overlapping(start, end)
    ///         .iter()
    ///         .map(|assembled| assembled.read().id())
    ///         .collect::<Vec<_>>()
    /// };
    ///
    /// assert_eq!(ids(52, 52), [2]);
    /// assert_eq!(ids(55, 51), [2, 3]);
    /// assert!(ids(91, 95).is_empty());
    /// assert_eq!(contig.depth_at(20), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn overlapping(&self, start: Position, end: Position) -> Vec<&AssembledRead> {
        let (low, high) = (start.min(end), start.max(end));

        if high < self.origin {
            return Vec::new();
        }

        let mut found = self
            .index
            .find(key(self.origin, low), key(self.origin, high) + 1)
            .map(|interval| interval.val)
            .collect::<Vec<_>>();
        found.sort_unstable();

        found.into_iter().map(|i| &self.reads[i]).collect()
    }

    /// Gets the number of reads whose spans cover a column.
    pub fn depth_at(&self, column: Position) -> usize {
        self.overlapping(column, column).len()
    }

    /// Gets the columns spanned by the reads, or `None` for a contig with no
    /// reads.
    pub fn span(&self) -> Option<Range> {
        let end = self
            .reads
            .iter()
            .map(|assembled| assembled.mapping.reference_finish())
            .max()?;

        Some(Range::new(self.origin, end))
    }

    /// Gets the records describing every read placement, grouped by read.
    pub fn assembled_from(&self) -> Vec<AssembledFrom> {
        self.reads
            .iter()
            .flat_map(|assembled| assembled.mapping.assembled_from())
            .collect()
    }

    /// Computes and stores the consensus of the contig.
    pub fn compute_consensus(
        &mut self,
        algorithm: &mut dyn Algorithm,
        config: &Config,
    ) -> Result<Statistics, sweep::Error> {
        debug!(contig = self.id, reads = self.reads.len(), "computing consensus");

        let reads = self
            .reads
            .iter()
            .map(|assembled| (&assembled.mapping, assembled.read.as_ref()))
            .collect::<Vec<_>>();

        let (consensus, statistics) = sweep::run(&reads, algorithm, config)?;
        self.consensus = Some(consensus);

        Ok(statistics)
    }

    /// Gets the consensus, if it has been computed.
    pub fn consensus(&self) -> Option<&Consensus> {
        self.consensus.as_ref()
    }

    /// Drops the sequence data of every read, keeping the placements.
    ///
    /// Reads shared with other owners are replaced by copies without data;
    /// the shared instances are left untouched.
    pub fn release_reads(&mut self) {
        for assembled in &mut self.reads {
            match Arc::get_mut(&mut assembled.read) {
                Some(read) => read.release(),
                None => assembled.read = Arc::new(assembled.read.without_sequence()),
            }
        }
    }

    /// Replaces every read mapping with its canonical form, sharing
    /// structurally equal shapes through `registry`.
    pub fn canonicalize(&mut self, registry: &Registry) {
        for assembled in &mut self.reads {
            assembled.mapping = assembled.mapping.to_canonical(registry);
        }
    }

    /// Gets the placement of this contig onto its parent.
    pub fn parent(&self) -> Option<&Mapping> {
        self.parent.as_ref()
    }

    /// Places this contig onto a parent, returning any previous placement.
    pub fn set_parent(&mut self, parent: Mapping) -> Result<Option<Mapping>, Error> {
        if parent.subject_id() != self.id {
            return Err(Error::ForeignParent {
                contig: self.id,
                subject: parent.subject_id(),
            });
        }

        Ok(self.parent.replace(parent))
    }

    /// Lifts the mapping of a read through this contig onto its parent.
    ///
    /// Returns `None` when the read is not part of the contig, when the
    /// contig has no parent, or when the read does not overlap the part of
    /// the contig placed onto the parent.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::alignment::Alignment;
    /// use contigmap::contig::Builder;
    /// use contigmap::core::Range;
    /// use contigmap::core::Translate as _;
    /// use contigmap::mapping::Mapping;
    /// use contigmap::read::Read;
    ///
    /// let scaffold = Mapping::try_new(
    ///     100,
    ///     9,
    ///     vec![Alignment::try_new(Range::new(1000, 801), Range::new(1, 200))?],
    /// )?;
    ///
    /// let contig = Builder::default()
    ///     .id(100)?
    ///     .parent(scaffold)?
    ///     .push_read(Read::new(7))
    ///     .push_alignment(7, Alignment::try_new(Range::new(101, 110), Range::new(1, 10))?)
    ///     .try_build()?;
    ///
    /// let lifted = contig.lift_to_parent(7).unwrap();
    /// assert_eq!(lifted.subject_id(), 7);
    /// assert_eq!(lifted.reference_id(), 9);
    /// assert_eq!(lifted.reference_position(1), Some(900));
    ///
    /// assert!(contig.lift_to_parent(8).is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn lift_to_parent(&self, read_id: u64) -> Option<Mapping> {
        let assembled = self.read(read_id)?;
        algebra::compose(&assembled.mapping, self.parent.as_ref()?)
    }
}

/// Computes the consensus of every contig, in parallel.
///
/// Every contig gets its own algorithm of the given kind. Contigs whose
/// sweep fails are logged and keep no consensus; the other contigs are
/// unaffected.
pub fn compute_all(
    contigs: &mut [Contig],
    kind: Kind,
    config: &Config,
) -> Vec<Result<Statistics, sweep::Error>> {
    contigs
        .par_iter_mut()
        .map(|contig| {
            let mut algorithm = kind.build();
            let result = contig.compute_consensus(algorithm.as_mut(), config);

            if let Err(err) = &result {
                error!(contig = contig.id(), "abandoning consensus: {err}");
            }

            result
        })
        .collect()
}

/// Converts a column to an index key relative to `origin`.
fn key(origin: Position, position: Position) -> u64 {
    u64::try_from(position - origin).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Alignment;
    use crate::mapping::LookupError;
    use crate::read::Chemistry;

    fn read(id: u64, dna: &[u8]) -> Read {
        Read::new(id)
            .with_chemistry(Chemistry::Primer)
            .with_sequence(dna.to_vec(), vec![30; dna.len()])
    }

    fn contig() -> Result<Contig, Box<dyn std::error::Error>> {
        Ok(Builder::default()
            .id(5)?
            .push_read(read(1, b"ACGTACGT"))
            .push_alignment(1, Alignment::try_new(Range::new(11, 18), Range::new(1, 8))?)
            .push_read(read(2, b"ACGTAC"))
            .push_alignment(2, Alignment::try_new(Range::new(20, 15), Range::new(1, 6))?)
            .try_build()?)
    }

    #[test]
    fn reads_are_sorted_and_indexed() -> Result<(), Box<dyn std::error::Error>> {
        let contig = contig()?;

        let ids = contig
            .reads()
            .iter()
            .map(|assembled| assembled.read().id())
            .collect::<Vec<_>>();
        assert_eq!(ids, [1, 2]);

        assert_eq!(contig.span(), Some(Range::new(11, 20)));
        assert_eq!(contig.depth_at(10), 0);
        assert_eq!(contig.depth_at(11), 1);
        assert_eq!(contig.depth_at(16), 2);
        assert_eq!(contig.depth_at(20), 1);
        assert_eq!(contig.depth_at(21), 0);

        Ok(())
    }

    #[test]
    fn consensus_is_computed_and_reads_released() -> Result<(), Box<dyn std::error::Error>> {
        let mut contig = contig()?;
        assert!(contig.consensus().is_none());

        let mut algorithm = Kind::Majority.build();
        let statistics = contig.compute_consensus(algorithm.as_mut(), &Config::default())?;
        assert_eq!(statistics.columns, 10);

        let consensus = contig.consensus().unwrap();
        assert_eq!(consensus.start(), 11);
        assert_eq!(consensus.base_at(11), Some(b'A'));

        // Read 2 is reverse: column 20 holds the complement of its first base.
        assert_eq!(consensus.base_at(20), Some(b'T'));

        contig.release_reads();
        assert!(contig.reads().iter().all(|assembled| assembled.read().dna().is_none()));
        assert!(contig.consensus().is_some());

        let err = contig
            .compute_consensus(algorithm.as_mut(), &Config::default())
            .unwrap_err();
        assert_eq!(err, sweep::Error::MissingData(LookupError::MissingDna(1)));

        Ok(())
    }

    #[test]
    fn records_cover_every_read() -> Result<(), Box<dyn std::error::Error>> {
        let contig = contig()?;
        let records = contig
            .assembled_from()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        assert_eq!(records, ["5\t1\t11\t18\t1\t8", "5\t2\t20\t15\t1\t6"]);

        Ok(())
    }

    #[test]
    fn canonical_forms_are_shared() -> Result<(), Box<dyn std::error::Error>> {
        let registry = Registry::default();

        let mut contig = Builder::default()
            .id(5)?
            .push_read(read(1, b"ACGT"))
            .push_alignment(1, Alignment::try_new(Range::new(11, 14), Range::new(1, 4))?)
            .push_read(read(2, b"ACGT"))
            .push_alignment(2, Alignment::try_new(Range::new(31, 34), Range::new(1, 4))?)
            .try_build()?;

        contig.canonicalize(&registry);

        assert_eq!(registry.len(), 1);
        assert!(contig.reads().iter().all(|assembled| assembled.mapping().is_canonical()));
        assert_eq!(contig.depth_at(32), 1);

        Ok(())
    }

    #[test]
    fn parents_must_place_the_contig() -> Result<(), Box<dyn std::error::Error>> {
        let mut contig = contig()?;

        let foreign = Mapping::try_new(
            6,
            9,
            vec![Alignment::try_new(Range::new(1, 10), Range::new(1, 10))?],
        )?;
        assert_eq!(
            contig.set_parent(foreign).unwrap_err(),
            Error::ForeignParent {
                contig: 5,
                subject: 6
            }
        );

        let parent = Mapping::try_new(
            5,
            9,
            vec![Alignment::try_new(Range::new(101, 120), Range::new(1, 20))?],
        )?;
        assert!(contig.set_parent(parent)?.is_none());
        assert_eq!(contig.parent().map(Mapping::reference_id), Some(9));

        Ok(())
    }

    #[test]
    fn independent_contigs_are_computed_in_parallel() -> Result<(), Box<dyn std::error::Error>> {
        let mut contigs = vec![
            contig()?,
            Builder::default()
                .id(6)?
                .push_read(Read::new(3))
                .push_alignment(3, Alignment::try_new(Range::new(1, 4), Range::new(1, 4))?)
                .try_build()?,
        ];

        let results = compute_all(&mut contigs, Kind::Bayesian, &Config::default());

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(contigs[0].consensus().is_some());
        assert!(contigs[1].consensus().is_none());

        Ok(())
    }
}
