//! The consensus sweep across the columns of a contig.
//!
//! Mappings are ordered by the first contig column they cover. Two cursors
//! bound the mappings that may cover the current column: the right cursor
//! admits mappings that start at or before the column and the left cursor
//! drops mappings that finished before it. Both only ever move forward, so
//! the whole contig costs time proportional to the number of reads plus the
//! number of columns. Oversize mappings break the ordering assumption the
//! left cursor relies on, so they sit in a separate list consulted at every
//! column.

use tracing::debug;
use tracing::warn;

use crate::consensus::Algorithm;
use crate::core::Position;
use crate::mapping::LookupError;
use crate::mapping::Mapping;
use crate::read;
use crate::read::Read;

/// The default reference span above which a mapping is oversize.
pub const DEFAULT_OVERSIZE_THRESHOLD: usize = 2_000;

/// An error related to a consensus sweep.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// No mappings were provided.
    Empty,

    /// A read entering the sweep lacks its DNA or quality values.
    MissingData(LookupError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Empty => write!(f, "no reads to compute a consensus from"),
            Error::MissingData(err) => write!(f, "missing data: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Configuration
////////////////////////////////////////////////////////////////////////////////////////

/// The configuration of a sweep.
///
/// ```
/// use contigmap::consensus::sweep::Config;
///
/// let config = Config::default()
///     .with_oversize_threshold(500)
///     .with_fold_pads(false);
///
/// assert_eq!(config.oversize_threshold(), 500);
/// assert!(!config.fold_pads());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// The reference span above which a mapping is oversize.
    oversize_threshold: usize,

    /// Whether pads are folded into the columns they fall on.
    fold_pads: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oversize_threshold: DEFAULT_OVERSIZE_THRESHOLD,
            fold_pads: true,
        }
    }
}

impl Config {
    /// Gets the reference span above which a mapping is oversize.
    pub fn oversize_threshold(&self) -> usize {
        self.oversize_threshold
    }

    /// Gets whether pads are folded.
    pub fn fold_pads(&self) -> bool {
        self.fold_pads
    }

    /// Sets the reference span above which a mapping is oversize.
    pub fn with_oversize_threshold(mut self, threshold: usize) -> Self {
        self.oversize_threshold = threshold;
        self
    }

    /// Sets whether pads are folded.
    pub fn with_fold_pads(mut self, fold_pads: bool) -> Self {
        self.fold_pads = fold_pads;
        self
    }
}

/// Counters gathered during a sweep.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    /// The number of columns called.
    pub columns: usize,

    /// The number of contributions the algorithm accepted.
    pub contributions: usize,

    /// The number of contributions the algorithm rejected.
    pub rejected: usize,

    /// The number of lookups that pointed past the end of a read.
    pub malformed: usize,
}

impl std::ops::AddAssign for Statistics {
    fn add_assign(&mut self, other: Self) {
        self.columns += other.columns;
        self.contributions += other.contributions;
        self.rejected += other.rejected;
        self.malformed += other.malformed;
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Output
////////////////////////////////////////////////////////////////////////////////////////

/// The consensus sequence of a contig.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Consensus {
    /// The called bases.
    dna: Vec<u8>,

    /// The score of every called base.
    quality: Vec<u8>,

    /// The contig column of the first base.
    start: Position,
}

impl Consensus {
    /// Gets the called bases.
    pub fn dna(&self) -> &[u8] {
        &self.dna
    }

    /// Gets the scores of the called bases.
    pub fn quality(&self) -> &[u8] {
        &self.quality
    }

    /// Gets the contig column of the first base.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Gets the contig column of the last base.
    pub fn end(&self) -> Position {
        self.start + self.dna.len() as Position - 1
    }

    /// Gets the number of bases.
    pub fn len(&self) -> usize {
        self.dna.len()
    }

    /// Returns whether no bases were called.
    pub fn is_empty(&self) -> bool {
        self.dna.is_empty()
    }

    /// Gets the base called at a contig column.
    pub fn base_at(&self, column: Position) -> Option<u8> {
        read::at(&self.dna, column - self.start + 1)
    }

    /// Gets the score of the base called at a contig column.
    pub fn quality_at(&self, column: Position) -> Option<u8> {
        read::at(&self.quality, column - self.start + 1)
    }

    /// Gets the bases with pads removed, as written to a FASTA record.
    pub fn unpadded(&self) -> Vec<u8> {
        self.dna
            .iter()
            .copied()
            .filter(|base| *base != read::PAD)
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Sweep
////////////////////////////////////////////////////////////////////////////////////////

/// The two cursors bounding the mappings that may cover a column.
#[derive(Debug, Default)]
struct Window {
    /// The first mapping that has not finished.
    left: usize,

    /// One past the last mapping that has started.
    right: usize,
}

impl Window {
    /// Moves the window to a column given the `(start, finish)` spans of
    /// mappings ordered by start.
    fn advance(
        &mut self,
        spans: &[(Position, Position)],
        column: Position,
    ) -> std::ops::Range<usize> {
        while self.right < spans.len() && spans[self.right].0 <= column {
            self.right += 1;
        }

        while self.left < self.right && spans[self.left].1 < column {
            self.left += 1;
        }

        self.left..self.right
    }
}

/// Computes the consensus of the reads placed on a contig.
///
/// Every read must carry its DNA and quality values; otherwise the sweep
/// fails with [`Error::MissingData`] before calling any column. A placement
/// that points past the end of its read is skipped for that column and
/// counted in [`Statistics::malformed`].
///
/// # Examples
///
/// ```
/// use contigmap::alignment::Alignment;
/// use contigmap::consensus::sweep;
/// use contigmap::consensus::sweep::Config;
/// use contigmap::consensus::Majority;
/// use contigmap::core::Range;
/// use contigmap::mapping::Mapping;
/// use contigmap::read::Chemistry;
/// use contigmap::read::Read;
///
/// let forward = Read::new(1)
///     .with_chemistry(Chemistry::Primer)
///     .with_sequence(b"ACGT".to_vec(), vec![30; 4]);
/// let reverse = Read::new(2)
///     .with_chemistry(Chemistry::Primer)
///     .with_sequence(b"AAC".to_vec(), vec![20; 3]);
///
/// let a = Mapping::try_new(1, 9, vec![Alignment::try_new(Range::new(1, 4), Range::new(1, 4))?])?;
/// let b = Mapping::try_new(2, 9, vec![Alignment::try_new(Range::new(5, 3), Range::new(1, 3))?])?;
///
/// let (consensus, statistics) = sweep::run(
///     &[(&a, &forward), (&b, &reverse)],
///     &mut Majority::default(),
///     &Config::default(),
/// )?;
///
/// assert_eq!(consensus.start(), 1);
/// assert_eq!(consensus.dna(), b"ACGTT");
/// assert_eq!(consensus.quality(), [30, 30, 50, 50, 20]);
/// assert_eq!(statistics.contributions, 7);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run(
    reads: &[(&Mapping, &Read)],
    algorithm: &mut dyn Algorithm,
    config: &Config,
) -> Result<(Consensus, Statistics)> {
    for (_, read) in reads {
        read.dna().ok_or(Error::MissingData(LookupError::MissingDna(read.id())))?;
        read.quality()
            .ok_or(Error::MissingData(LookupError::MissingQuality(read.id())))?;
    }

    let start = reads
        .iter()
        .map(|(mapping, _)| mapping.reference_start())
        .min()
        .ok_or(Error::Empty)?;
    let end = reads
        .iter()
        .map(|(mapping, _)| mapping.reference_finish())
        .max()
        .ok_or(Error::Empty)?;

    let (oversize, mut windowed): (Vec<_>, Vec<_>) = reads
        .iter()
        .copied()
        .partition(|(mapping, _)| is_oversize(mapping, config));
    windowed.sort_by_key(|(mapping, _)| mapping.reference_start());

    let spans = windowed
        .iter()
        .map(|(mapping, _)| (mapping.reference_start(), mapping.reference_finish()))
        .collect::<Vec<_>>();

    debug!(
        start,
        end,
        reads = reads.len(),
        oversize = oversize.len(),
        "starting consensus sweep"
    );

    let columns = usize::try_from(end - start + 1).unwrap_or_default();
    let mut dna = Vec::with_capacity(columns);
    let mut quality = Vec::with_capacity(columns);
    let mut statistics = Statistics::default();
    let mut window = Window::default();

    for column in start..=end {
        algorithm.reset();

        let active = window.advance(&spans, column);

        for (mapping, read) in windowed[active].iter().chain(oversize.iter()) {
            fold(mapping, read, column, algorithm, config, &mut statistics)?;
        }

        dna.push(algorithm.best_base());
        quality.push(algorithm.best_score());
        statistics.columns += 1;
    }

    debug!(
        columns = statistics.columns,
        contributions = statistics.contributions,
        rejected = statistics.rejected,
        malformed = statistics.malformed,
        "finished consensus sweep"
    );

    Ok((
        Consensus {
            dna,
            quality,
            start,
        },
        statistics,
    ))
}

/// Returns whether the reference span of a mapping exceeds the oversize
/// threshold.
fn is_oversize(mapping: &Mapping, config: &Config) -> bool {
    usize::try_from(mapping.reference_range().length())
        .map(|length| length > config.oversize_threshold)
        .unwrap_or(false)
}

/// Folds the contribution of one read to one column into the algorithm.
fn fold(
    mapping: &Mapping,
    read: &Read,
    column: Position,
    algorithm: &mut dyn Algorithm,
    config: &Config,
    statistics: &mut Statistics,
) -> Result<()> {
    let hit = match mapping.try_base_and_quality(read, column) {
        Ok(Some(hit)) => hit,
        Ok(None) => return Ok(()),
        Err(err @ LookupError::PositionOutOfBounds { .. }) => {
            warn!(read = read.id(), column, "skipping malformed placement: {err}");
            statistics.malformed += 1;
            return Ok(());
        }
        Err(err) => return Err(Error::MissingData(err)),
    };

    if hit.quality == 0 || (hit.is_pad() && !config.fold_pads) {
        return Ok(());
    }

    match algorithm.add_base(hit.base, hit.quality, mapping.direction(), read.chemistry()) {
        Ok(()) => statistics.contributions += 1,
        Err(err) => {
            debug!(read = read.id(), column, "rejected contribution: {err}");
            statistics.rejected += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Alignment;
    use crate::consensus::Bayesian;
    use crate::consensus::Majority;
    use crate::core::Range;
    use crate::read::Chemistry;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn read(id: u64, dna: &[u8], quality: u8) -> Read {
        Read::new(id)
            .with_chemistry(Chemistry::Terminator)
            .with_sequence(dna.to_vec(), vec![quality; dna.len()])
    }

    fn mapping(id: u64, contig: (Position, Position), read: (Position, Position)) -> Mapping {
        Mapping::try_new(
            id,
            100,
            vec![Alignment::try_new(Range::new(contig.0, contig.1), Range::new(read.0, read.1))
                .unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn the_window_admits_and_drops_mappings_in_order() {
        let spans = [(1, 50), (10, 60), (55, 90)];
        let mut window = Window::default();

        for column in 1..52 {
            window.advance(&spans, column);
        }

        assert_eq!(window.advance(&spans, 52), 1..2);
        assert_eq!(window.advance(&spans, 53), 1..2);
        assert_eq!(window.advance(&spans, 54), 1..2);
        assert_eq!(window.advance(&spans, 55), 1..3);
        assert_eq!(window.advance(&spans, 61), 2..3);
    }

    #[test]
    fn gaps_between_reads_are_called_as_no_call() -> TestResult {
        let (a, b) = (read(1, b"AAAA", 30), read(2, b"CCCC", 30));
        let (ma, mb) = (mapping(1, (1, 4), (1, 4)), mapping(2, (7, 10), (1, 4)));

        let (consensus, statistics) =
            run(&[(&mb, &b), (&ma, &a)], &mut Majority::default(), &Config::default())?;

        assert_eq!(consensus.dna(), b"AAAANNCCCC");
        assert_eq!(consensus.quality_at(5), Some(0));
        assert_eq!(consensus.base_at(7), Some(b'C'));
        assert_eq!(consensus.end(), 10);
        assert_eq!(statistics.columns, 10);
        assert_eq!(statistics.contributions, 8);

        Ok(())
    }

    #[test]
    fn oversize_reads_cover_every_column() -> TestResult {
        let long = read(1, &[b'G'; 40], 20);
        let short = read(2, b"GGGG", 20);
        let late = read(3, b"GGGG", 20);

        let ml = mapping(1, (1, 40), (1, 40));
        let ms = mapping(2, (2, 5), (1, 4));
        let mt = mapping(3, (30, 33), (1, 4));

        let config = Config::default().with_oversize_threshold(10);
        let (consensus, statistics) = run(
            &[(&ms, &short), (&ml, &long), (&mt, &late)],
            &mut Majority::default(),
            &config,
        )?;

        assert_eq!(consensus.len(), 40);
        assert!(consensus.dna().iter().all(|base| *base == b'G'));
        assert_eq!(consensus.quality_at(1), Some(20));
        assert_eq!(consensus.quality_at(3), Some(40));
        assert_eq!(consensus.quality_at(31), Some(40));
        assert_eq!(statistics.contributions, 48);

        Ok(())
    }

    #[test]
    fn pads_are_folded_unless_disabled() -> TestResult {
        let gapped = read(1, b"ACGTAC", 30);
        let mg = Mapping::try_new(
            1,
            100,
            vec![
                Alignment::try_new(Range::new(1, 3), Range::new(1, 3))?,
                Alignment::try_new(Range::new(5, 7), Range::new(4, 6))?,
            ],
        )?;

        let (padded, _) = run(&[(&mg, &gapped)], &mut Majority::default(), &Config::default())?;
        assert_eq!(padded.dna(), b"ACG*TAC");
        assert_eq!(padded.unpadded(), b"ACGTAC");

        let config = Config::default().with_fold_pads(false);
        let (unfolded, _) = run(&[(&mg, &gapped)], &mut Majority::default(), &config)?;
        assert_eq!(unfolded.dna(), b"ACGNTAC");

        Ok(())
    }

    #[test]
    fn malformed_placements_are_skipped() -> TestResult {
        let short = read(1, b"TT", 30);
        let good = read(2, b"TTTT", 30);
        let (ms, mg) = (mapping(1, (1, 4), (1, 4)), mapping(2, (1, 4), (1, 4)));

        let (consensus, statistics) =
            run(&[(&ms, &short), (&mg, &good)], &mut Bayesian::default(), &Config::default())?;

        assert_eq!(consensus.dna(), b"TTTT");
        assert_eq!(statistics.malformed, 2);
        assert_eq!(statistics.contributions, 6);

        Ok(())
    }

    #[test]
    fn missing_data_abandons_the_contig() {
        let empty = Read::new(1);
        let ma = mapping(1, (1, 4), (1, 4));

        let err = run(&[(&ma, &empty)], &mut Majority::default(), &Config::default()).unwrap_err();
        assert_eq!(err, Error::MissingData(LookupError::MissingDna(1)));
        assert_eq!(err.to_string(), "missing data: read 1 has no DNA");

        let err = run(&[], &mut Majority::default(), &Config::default()).unwrap_err();
        assert_eq!(err, Error::Empty);
    }

    #[test]
    fn unknown_chemistry_is_rejected_not_fatal() -> TestResult {
        let unknown = Read::new(1).with_sequence(b"AC".to_vec(), vec![30, 30]);
        let ma = mapping(1, (1, 2), (1, 2));

        let (consensus, statistics) =
            run(&[(&ma, &unknown)], &mut Majority::default(), &Config::default())?;

        assert_eq!(consensus.dna(), b"NN");
        assert_eq!(statistics.rejected, 2);

        Ok(())
    }
}
