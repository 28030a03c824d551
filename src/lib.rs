//! `contigmap` is a crate for mapping coordinates between sequencing reads and
//! the contigs they were assembled into, and for calling the consensus
//! sequence of those contigs.
//!
//! The crate provides three main points of entry:
//!
//! - Describing how a read sits on a contig with a [`mapping::Mapping`] and
//!   translating positions, bases, and qualities through it.
//! - Combining mappings with [`mapping::algebra`] (inversion and composition).
//! - Calling the consensus of a [`contig::Contig`] with a pluggable
//!   [`consensus::Algorithm`].
//!
//! ## Mappings
//!
//! A mapping is built from one or more [`alignment::Alignment`]s: ungapped
//! blocks pairing a subject (read) range with a reference (contig) range.
//! Coordinates are 1-based and inclusive, and a block is reverse when exactly
//! one of its ranges runs backwards. Once assembled, the subject ranges of a
//! mapping always run forward and the orientation is held by its
//! [`core::Direction`].
//!
//! Mappings can be held explicitly or as a shared
//! [`canonical::CanonicalMapping`] plus an anchor. Reads with the same gap
//! pattern share one canonical shape through a [`canonical::Registry`];
//! both representations answer every query identically.
//!
//! ```
//! use contigmap::alignment::Alignment;
//! use contigmap::core::Direction;
//! use contigmap::core::Range;
//! use contigmap::core::Translate as _;
//! use contigmap::mapping::Mapping;
//! use contigmap::read::Read;
//!
//! // Read 7 sits on contig 1 in reverse, with a one-column pad at 23.
//! let mapping = Mapping::try_new(
//!     7,
//!     1,
//!     vec![
//!         Alignment::try_new(Range::new(28, 24), Range::new(1, 5))?,
//!         Alignment::try_new(Range::new(22, 18), Range::new(6, 10))?,
//!     ],
//! )?;
//!
//! assert_eq!(mapping.direction(), Direction::Reverse);
//! assert_eq!(mapping.reference_position(6), Some(22));
//! assert_eq!(mapping.subject_position(23), None);
//!
//! let read = Read::new(7).with_sequence(b"AACCGGTTAC".to_vec(), vec![30; 10]);
//!
//! // Bases come back oriented to the contig.
//! assert_eq!(mapping.base_and_quality(&read, 28).map(|hit| hit.base), Some(b'T'));
//! assert_eq!(mapping.base_and_quality(&read, 23).map(|hit| hit.base), Some(b'*'));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Consensus
//!
//! A [`contig::Contig`] gathers the mappings of its reads. Its consensus is
//! computed by sweeping every column once, folding each covering read's base
//! (or pad) into a [`consensus::Algorithm`].
//!
//! ```
//! use contigmap::consensus::sweep::Config;
//! use contigmap::consensus::Kind;
//! use contigmap::contig::Builder;
//! use contigmap::read::Chemistry;
//! use contigmap::read::Read;
//!
//! // Read 8 lies reverse across columns 5 to 12.
//! let data = b"1\t7\t1\t8\t1\t8\n1\t8\t12\t5\t1\t8\n";
//! let mut reader = contigmap::Reader::new(&data[..]);
//!
//! let mut builder = Builder::default()
//!     .id(1)?
//!     .push_read(
//!         Read::new(7)
//!             .with_chemistry(Chemistry::Primer)
//!             .with_sequence(b"ACGTACGT".to_vec(), vec![30; 8]),
//!     )
//!     .push_read(
//!         Read::new(8)
//!             .with_chemistry(Chemistry::Terminator)
//!             .with_sequence(b"ACGTACGT".to_vec(), vec![40; 8]),
//!     );
//!
//! for result in reader.groups() {
//!     let group = result?;
//!     builder = builder.push_mapping(group.into_mapping()?);
//! }
//!
//! let mut contig = builder.try_build()?;
//! let mut algorithm = Kind::Bayesian.build();
//! contig.compute_consensus(algorithm.as_mut(), &Config::default())?;
//!
//! let consensus = contig.consensus().unwrap();
//! assert_eq!(consensus.dna(), b"ACGTACGTACGT");
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod alignment;
pub mod canonical;
pub mod consensus;
pub mod contig;
pub mod core;
pub mod line;
pub mod mapping;
pub mod read;
pub mod reader;
pub mod record;

pub use line::Line;

pub use self::reader::Reader;
