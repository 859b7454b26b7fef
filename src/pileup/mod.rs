//! Pileup construction.
//!
//! - [`walker`]: turns one alignment record into per-column contributions, applying the read mask
//! - [`builder`]: aggregates contributions from many reads into a [`Pileup`](builder::Pileup)
//! - [`genome`]: builds a pileup for every contig of an assembly in parallel
//!
//! ## Evidence strings
//!
//! | Evidence | Meaning |
//! |----------|---------|
//! | `A`      | Read base aligned (match or mismatch) to this position |
//! | `-`      | Reference base deleted in the read |
//! | `ACT`    | Read base here, followed by the bases the read inserts before the next position |

pub mod builder;
pub mod genome;
pub mod walker;
