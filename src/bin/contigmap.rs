//! A binary to call the consensus of every contig described by an assembly
//! record file.
//!
//! ```shell
//! cargo run --release --bin=contigmap --features=binaries -- records.tsv.gz reads.fastq.gz
//! ```
//!
//! It achieves this by carrying out the following:
//!
//! * Loading every read from a FASTQ file. Read names must be the numeric
//!   read ids used by the record file; a `primer` or `terminator` token in the
//!   description sets the chemistry of the read.
//! * Grouping the records by contig and assembling a mapping for each read.
//! * Sweeping every contig (in parallel) and writing the consensus as FASTA.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use contigmap::alignment::Alignment;
use contigmap::canonical::Registry;
use contigmap::consensus::sweep::Config;
use contigmap::consensus::sweep::DEFAULT_OVERSIZE_THRESHOLD;
use contigmap::consensus::Kind;
use contigmap::contig;
use contigmap::contig::Contig;
use contigmap::core::Position;
use contigmap::read::Chemistry;
use contigmap::read::Read;
use contigmap::read::Store;
use flate2::read::GzDecoder;
use noodles::fasta;
use noodles::fastq;
use regex::Regex;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////////////
// Regions
////////////////////////////////////////////////////////////////////////////////////////

/// A contig, optionally narrowed to a window of columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Region {
    /// The contig id.
    contig: u64,

    /// The first and last columns to emit (inclusive).
    window: Option<(Position, Position)>,
}

/// The pattern of a region.
static REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?::(-?\d+)-(-?\d+))?$").unwrap());

impl Region {
    /// Returns whether the region keeps a column.
    fn keeps(&self, column: Position) -> bool {
        match self.window {
            Some((start, end)) => start <= column && column <= end,
            None => true,
        }
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(groups) = REGEX.captures(s) else {
            bail!("invalid region `{s}`: expected `<contig>` or `<contig>:<start>-<end>`");
        };

        let contig = groups[1].parse().context("parsing the contig id")?;

        let window = match (groups.get(2), groups.get(3)) {
            (Some(start), Some(end)) => {
                let start = start.as_str().parse::<Position>().context("parsing the start")?;
                let end = end.as_str().parse::<Position>().context("parsing the end")?;

                if start > end {
                    bail!("invalid region `{s}`: start is after end");
                }

                Some((start, end))
            }
            _ => None,
        };

        Ok(Self { contig, window })
    }
}


////////////////////////////////////////////////////////////////////////////////////////
// Inputs
////////////////////////////////////////////////////////////////////////////////////////

/// Opens a file for buffered reading, decompressing it if it ends in `.gz`.
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Loads every read of a FASTQ file.
fn load_reads(path: &Path) -> Result<Store> {
    let mut reader = fastq::io::Reader::new(open(path)?);
    let mut reads = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading FASTQ record {}", i + 1))?;

        let name = std::str::from_utf8(record.name()).context("decoding a read name")?;
        let id = name
            .parse::<u64>()
            .with_context(|| format!("read name `{name}` is not a numeric read id"))?;

        let chemistry = String::from_utf8_lossy(record.description())
            .split_whitespace()
            .find_map(|token| token.parse::<Chemistry>().ok())
            .unwrap_or_default();

        let quality = record
            .quality_scores()
            .iter()
            .map(|score| score.saturating_sub(b'!'))
            .collect();

        reads.push(
            Read::new(id)
                .with_name(name)
                .with_chemistry(chemistry)
                .with_sequence(record.sequence().to_vec(), quality),
        );
    }

    let store = reads.into_iter().collect::<Store>();
    info!("loaded {} reads from {}", store.len(), path.display());

    Ok(store)
}

/// Gathers the alignments of every read onto every contig.
///
/// Records for the same read need not be consecutive.
fn load_placements(
    path: &Path,
    region: Option<&Region>,
) -> Result<BTreeMap<u64, BTreeMap<u64, Vec<Alignment>>>> {
    let mut reader = contigmap::Reader::new(open(path)?);
    let mut contigs = BTreeMap::<u64, BTreeMap<u64, Vec<Alignment>>>::new();

    for result in reader.groups() {
        let group = result.with_context(|| format!("reading {}", path.display()))?;

        if region.is_some_and(|region| region.contig != group.contig_id()) {
            continue;
        }

        contigs
            .entry(group.contig_id())
            .or_default()
            .entry(group.read_id())
            .or_default()
            .extend(group.alignments());
    }

    Ok(contigs)
}

/// Builds the contigs, sharing canonical shapes through `registry`.
fn build_contigs(
    placements: BTreeMap<u64, BTreeMap<u64, Vec<Alignment>>>,
    reads: &Store,
    registry: &Registry,
) -> Result<Vec<Contig>> {
    let mut contigs = Vec::with_capacity(placements.len());

    for (contig_id, by_read) in placements {
        let mut builder = contig::Builder::default().id(contig_id)?;

        for (read_id, alignments) in by_read {
            let Some(read) = reads.get(read_id) else {
                warn!(contig = contig_id, "skipping read {read_id}: not present in FASTQ");
                continue;
            };

            builder = builder.push_read(read.clone());

            for alignment in alignments {
                builder = builder.push_alignment(read_id, alignment);
            }
        }

        let mut contig = builder
            .try_build()
            .with_context(|| format!("building contig {contig_id}"))?;
        contig.canonicalize(registry);

        debug!(contig = contig_id, reads = contig.reads().len(), "built contig");
        contigs.push(contig);
    }

    Ok(contigs)
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// Calls the consensus of the contigs in an assembly record file.
#[derive(Parser)]
struct Args {
    /// The assembly record file (may be gzipped).
    records: PathBuf,

    /// The FASTQ file holding the reads (may be gzipped).
    reads: PathBuf,

    /// The consensus algorithm (`bayesian` or `majority`).
    #[arg(short, long, default_value_t = Kind::Bayesian)]
    algorithm: Kind,

    /// Reads whose mapping is longer than this are left out of the consensus.
    #[arg(long, default_value_t = DEFAULT_OVERSIZE_THRESHOLD)]
    oversize_threshold: usize,

    /// Treat pads within reads as missing data rather than as votes.
    #[arg(long, default_value_t = false)]
    skip_pads: bool,

    /// Remove pad columns from the written consensus.
    #[arg(short, long, default_value_t = false)]
    unpadded: bool,

    /// Only call a single contig (`<contig>`), optionally narrowed to a
    /// window of columns (`<contig>:<start>-<end>`).
    #[arg(short, long)]
    region: Option<Region>,

    /// Where to write the FASTA output (standard output by default).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity,
}

fn throw(args: &Args) -> Result<()> {
    let reads = load_reads(&args.reads)?;
    let placements = load_placements(&args.records, args.region.as_ref())?;

    if placements.is_empty() {
        bail!("no contigs found in {}", args.records.display());
    }

    let registry = Registry::default();
    let mut contigs = build_contigs(placements, &reads, &registry)?;
    drop(reads);

    let counts = registry.counts();
    info!(
        "{} contigs share {} canonical shapes ({} reused)",
        contigs.len(),
        registry.len(),
        counts.hits
    );

    let config = Config::default()
        .with_oversize_threshold(args.oversize_threshold)
        .with_fold_pads(!args.skip_pads);

    let results = contig::compute_all(&mut contigs, args.algorithm, &config);

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = fasta::io::Writer::new(output);

    let mut failed = 0;

    for (contig, result) in contigs.iter_mut().zip(results) {
        let statistics = match result {
            Ok(statistics) => statistics,
            Err(_) => {
                failed += 1;
                continue;
            }
        };

        info!(
            contig = contig.id(),
            columns = statistics.columns,
            contributions = statistics.contributions,
            rejected = statistics.rejected,
            malformed = statistics.malformed,
            "called consensus"
        );

        contig.release_reads();

        let Some(consensus) = contig.consensus() else {
            continue;
        };

        let keep = |column: &Position| args.region.map_or(true, |region| region.keeps(*column));
        let columns = (consensus.start()..=consensus.end()).filter(keep);

        let sequence = columns
            .filter_map(|column| consensus.base_at(column))
            .filter(|base| !(args.unpadded && *base == contigmap::read::PAD))
            .collect::<Vec<_>>();

        let definition = fasta::record::Definition::new(
            format!("contig{}", contig.id()),
            Some(format!("{}-{}", consensus.start(), consensus.end()).into()),
        );

        writer
            .write_record(&fasta::Record::new(
                definition,
                fasta::record::Sequence::from(sequence),
            ))
            .with_context(|| format!("writing contig {}", contig.id()))?;
    }

    if failed > 0 {
        bail!("{failed} of {} contigs failed", contigs.len());
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(std::io::stderr)
            .init(),
    };

    throw(&args)
}
