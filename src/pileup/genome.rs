//! Pileups for every contig of an assembly.
//!
//! Contributions never cross contigs, so each contig's table is built independently on a rayon
//! pool. Each worker owns its table, which keeps per-column ordering identical to a serial run.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::core::alignment_set::AlignmentSet;
use crate::core::reference::ReferenceSequence;
use crate::pileup::builder::{build_pileup, Pileup, PileupError};

/// Helper function to convert usize count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// The pileup of one contig alongside the contig it was built for
#[derive(Debug, Clone)]
pub struct ContigPileup<'a> {
    pub reference: &'a ReferenceSequence,
    pub pileup: Pileup,
}

/// Coverage summary of one contig's pileup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PileupSummary {
    pub name: String,
    pub length: usize,
    pub covered_positions: usize,
    pub total_depth: usize,
    pub mean_depth: f64,
}

impl ContigPileup<'_> {
    #[must_use]
    pub fn summary(&self) -> PileupSummary {
        let length = self.pileup.len();
        let total_depth = self.pileup.total_depth();
        let mean_depth = if length == 0 {
            0.0
        } else {
            count_to_f64(total_depth) / count_to_f64(length)
        };

        PileupSummary {
            name: self.reference.name.clone(),
            length,
            covered_positions: self.pileup.covered_positions(),
            total_depth,
            mean_depth,
        }
    }
}

fn build_contig_pileup<'a>(
    reference: &'a ReferenceSequence,
    alignments: &AlignmentSet,
) -> Result<ContigPileup<'a>, PileupError> {
    let (pileup, reads) = match alignments.contig(&reference.name) {
        Some(contig) => (
            build_pileup(
                contig.read_order.as_slice(),
                &contig.by_read,
                reference.length(),
            )?,
            contig.read_count(),
        ),
        None => (Pileup::new(reference.length()), 0),
    };

    debug!(
        contig = %reference.name,
        reads,
        covered = pileup.covered_positions(),
        depth = pileup.total_depth(),
        "Built pileup"
    );

    Ok(ContigPileup { reference, pileup })
}

/// Build one pileup per reference contig, returned in assembly order.
///
/// # Errors
///
/// Returns `PileupError::ThreadPool` if the worker pool cannot be created, or the first error
/// from [`build_pileup`] for any contig.
pub fn build_genome_pileups<'a>(
    references: &'a [ReferenceSequence],
    alignments: &AlignmentSet,
    threads: usize,
) -> Result<Vec<ContigPileup<'a>>, PileupError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PileupError::ThreadPool(e.to_string()))?;

    pool.install(|| {
        references
            .par_iter()
            .map(|reference| build_contig_pileup(reference, alignments))
            .collect()
    })
}
