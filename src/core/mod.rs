//! Core data types for pileup construction.
//!
//! - [`AlignmentRecord`](alignment::AlignmentRecord): one placement of one read, with its
//!   operations, bases and masked read positions
//! - [`AlignmentSet`](alignment_set::AlignmentSet): alignments grouped by contig and read
//! - [`ReferenceSequence`](reference::ReferenceSequence): a contig of the draft assembly
//! - [`sequence`]: nucleotide helpers
//!
//! ## Coordinates
//!
//! All coordinates are 0-based. Reference coordinates index the contig; read coordinates index
//! the read's stored bases, independent of where it aligned.

pub mod alignment;
pub mod alignment_set;
pub mod reference;
pub mod sequence;
