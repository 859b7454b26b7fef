use std::collections::HashMap;
use std::ops::Index;

use thiserror::Error;

use crate::core::alignment::{AlignmentError, AlignmentRecord};
use crate::pileup::walker;

#[derive(Error, Debug)]
pub enum PileupError {
    #[error("Read '{read}' alignment {alignment}: {source}")]
    InvalidAlignment {
        read: String,
        alignment: usize,
        source: AlignmentError,
    },

    #[error(
        "Read '{read}' alignment {alignment} reaches reference position {column}, \
         beyond reference length {reference_length}"
    )]
    ColumnOutOfRange {
        read: String,
        alignment: usize,
        column: usize,
        reference_length: usize,
    },

    #[error("Failed to start worker threads: {0}")]
    ThreadPool(String),
}

/// Per-reference-position evidence table.
///
/// Holds exactly one column per reference position. A column is the ordered list of evidence
/// strings contributed by trusted alignments; an empty column means no trusted evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pileup {
    columns: Vec<Vec<String>>,
}

impl Pileup {
    #[must_use]
    pub fn new(reference_length: usize) -> Self {
        Self {
            columns: vec![Vec::new(); reference_length],
        }
    }

    /// Number of columns (the reference length)
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn column(&self, pos: usize) -> Option<&[String]> {
        self.columns.get(pos).map(Vec::as_slice)
    }

    /// Number of evidence strings at a position (0 outside the table)
    #[must_use]
    pub fn depth(&self, pos: usize) -> usize {
        self.columns.get(pos).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.columns.iter().map(Vec::as_slice)
    }

    /// Positions with at least one evidence string
    #[must_use]
    pub fn covered_positions(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_empty()).count()
    }

    #[must_use]
    pub fn total_depth(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    fn append(&mut self, column: usize, evidence: String) {
        self.columns[column].push(evidence);
    }
}

impl Index<usize> for Pileup {
    type Output = [String];

    fn index(&self, pos: usize) -> &Self::Output {
        &self.columns[pos]
    }
}

/// Build the evidence table for one reference sequence.
///
/// Reads are processed in `read_order`, each read's alignments in list order, and every trusted
/// contribution is appended to its column in the order the walker produced it. A read missing
/// from `alignments_by_read` has no alignments.
///
/// # Errors
///
/// Fails on the first alignment that is malformed (`PileupError::InvalidAlignment`) or that
/// reaches outside `[0, reference_length)` (`PileupError::ColumnOutOfRange`). Untrusted
/// contributions are range-checked too, so a masked base past the end is still reported.
#[allow(clippy::implicit_hasher)] // Default hasher is fine for read names
pub fn build_pileup<S: AsRef<str>>(
    read_order: &[S],
    alignments_by_read: &HashMap<String, Vec<AlignmentRecord>>,
    reference_length: usize,
) -> Result<Pileup, PileupError> {
    let mut pileup = Pileup::new(reference_length);

    for read in read_order {
        let read = read.as_ref();
        let Some(alignments) = alignments_by_read.get(read) else {
            continue;
        };

        for (index, alignment) in alignments.iter().enumerate() {
            // Range-check the whole span before walking it
            if alignment.reference_end() > reference_length {
                return Err(PileupError::ColumnOutOfRange {
                    read: read.to_string(),
                    alignment: index,
                    column: alignment.reference_start().max(reference_length),
                    reference_length,
                });
            }

            let contributions =
                walker::walk(alignment).map_err(|source| PileupError::InvalidAlignment {
                    read: read.to_string(),
                    alignment: index,
                    source,
                })?;

            for contribution in contributions {
                if contribution.column >= reference_length {
                    return Err(PileupError::ColumnOutOfRange {
                        read: read.to_string(),
                        alignment: index,
                        column: contribution.column,
                        reference_length,
                    });
                }
                if contribution.trusted {
                    pileup.append(contribution.column, contribution.evidence);
                }
            }
        }
    }

    Ok(pileup)
}
