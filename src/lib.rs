//! # polypolish
//!
//! A library for building per-position pileups of short-read alignments against a draft
//! genome assembly, the evidence-gathering step of short-read polishing.
//!
//! Reads are expected to be aligned to *all* of their possible locations, so a read from a
//! repeat contributes evidence to every copy of the repeat. Upstream filters may flag read
//! positions as untrustworthy (for example where equally good placements disagree); those
//! positions are masked and leave no evidence.
//!
//! ## Features
//!
//! - **Exact coordinate bookkeeping**: reference, read and operation coordinates walked together
//! - **Insertion attachment**: inserted bases join the evidence of the preceding column
//! - **Trust propagation**: deletions inherit the trust of the last match/mismatch
//! - **Masking**: untrustworthy read positions are excluded from the pileup
//! - **Parallel contigs**: one pileup per contig, built on a thread pool
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use polypolish::{build_pileup, AlignmentRecord};
//!
//! let record = AlignmentRecord::from_cigar(2, "3M1I2M1D1M", "ACGTACG").unwrap();
//! let mut alignments = HashMap::new();
//! alignments.insert("read_1".to_string(), vec![record]);
//!
//! let pileup = build_pileup(&["read_1"], &alignments, 10).unwrap();
//! assert_eq!(pileup[4], ["GT"]);
//! assert_eq!(pileup[7], ["-"]);
//! assert!(pileup[9].is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Alignment records, alignment sets and reference sequences
//! - [`pileup`]: Coordinate walker, pileup builder and per-contig dispatch
//! - [`parsing`]: FASTA and SAM loaders with compression detection
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pileup;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::alignment::{AlignmentError, AlignmentRecord, OpKind, Operation};
pub use core::alignment_set::{AlignmentSet, ContigAlignments};
pub use core::reference::ReferenceSequence;
pub use pileup::builder::{build_pileup, Pileup, PileupError};
pub use pileup::genome::{build_genome_pileups, ContigPileup, PileupSummary};
