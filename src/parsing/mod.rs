//! Readers for the inputs that feed pileup construction.
//!
//! - **Compression detection**: plain or gzip, decided from leading magic bytes
//! - **FASTA**: the draft assembly being polished
//! - **SAM**: short reads aligned to every possible location in the assembly
//!
//! ## Example
//!
//! ```rust,no_run
//! use polypolish::parsing::{fasta::load_fasta, sam::load_alignments};
//! use std::path::{Path, PathBuf};
//!
//! let references = load_fasta(Path::new("assembly.fasta")).unwrap();
//! let (alignments, stats) =
//!     load_alignments(&[PathBuf::from("alignments.sam")], &references, 10).unwrap();
//! println!("{} alignments used", stats.used);
//! ```
//!
//! ## SAM fields used
//!
//! | Field | Use |
//! |-------|-----|
//! | QNAME + FLAG | Read identifier (`/1`, `/2` appended for mates) |
//! | RNAME, POS | Contig and 0-based reference start |
//! | CIGAR | Match/insertion/deletion operations, leading clips set the read start |
//! | SEQ | Read bases (`*` borrows bases from another record of the read) |
//! | NM  | Mismatches plus indel bases, compared with `--max-errors` |

pub mod compression;
pub mod fasta;
pub mod sam;
