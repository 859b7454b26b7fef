//! Walks one alignment record across the reference, read and operation coordinate spaces.
//!
//! The walker keeps two counters (`ref_pos`, `read_pos`) and the trust state of the most recent
//! match/mismatch. Deletions consume no read coordinate, so they take that trust state instead of
//! computing their own. Insertions consume no reference coordinate, so they are appended to the
//! contribution just emitted for the preceding column.

use crate::core::alignment::{AlignmentError, AlignmentRecord, OpKind};

/// Deletion marker for one deleted reference base
pub const DELETION: &str = "-";

/// Evidence one alignment contributes to one reference column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// 0-based reference column
    pub column: usize,

    /// A base, a deletion marker, or a base followed by inserted bases
    pub evidence: String,

    /// False if any read position behind this evidence is masked
    pub trusted: bool,
}

pub struct CoordinateWalker<'a> {
    record: &'a AlignmentRecord,
    ref_pos: usize,
    read_pos: usize,
    // No match seen yet means leading deletions are untrusted
    last_trusted: bool,
    contributions: Vec<Contribution>,
}

impl<'a> CoordinateWalker<'a> {
    #[must_use]
    pub fn new(record: &'a AlignmentRecord) -> Self {
        Self {
            record,
            ref_pos: record.reference_start(),
            read_pos: record.read_start(),
            last_trusted: false,
            contributions: Vec::new(),
        }
    }

    /// Walk every operation and return the contributions in reference order.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::InsertionBeforeStart` if the alignment opens with an insertion at
    /// reference position 0, which would have no column to attach to.
    pub fn walk(mut self) -> Result<Vec<Contribution>, AlignmentError> {
        for op in self.record.operations() {
            match op.kind() {
                OpKind::Match => self.step_match(op.length()),
                OpKind::Insertion => self.step_insertion(op.length())?,
                OpKind::Deletion => self.step_deletion(op.length()),
            }
        }
        Ok(self.contributions)
    }

    fn step_match(&mut self, length: usize) {
        for _ in 0..length {
            let base = self.record.read_sequence()[self.read_pos];
            let trusted = !self.record.is_masked(self.read_pos);
            self.last_trusted = trusted;
            self.contributions.push(Contribution {
                column: self.ref_pos,
                evidence: char::from(base).to_string(),
                trusted,
            });
            self.ref_pos += 1;
            self.read_pos += 1;
        }
    }

    fn step_insertion(&mut self, length: usize) -> Result<(), AlignmentError> {
        let end = self.read_pos + length;
        let inserted: String = self.record.read_sequence()[self.read_pos..end]
            .iter()
            .map(|&b| char::from(b))
            .collect();
        let trusted = !(self.read_pos..end).any(|pos| self.record.is_masked(pos));

        // The last contribution always sits at ref_pos - 1
        match self.contributions.last_mut() {
            Some(previous) => {
                previous.evidence.push_str(&inserted);
                previous.trusted &= trusted;
            }
            None => {
                let column =
                    self.ref_pos
                        .checked_sub(1)
                        .ok_or(AlignmentError::InsertionBeforeStart {
                            read_pos: self.read_pos,
                        })?;
                self.contributions.push(Contribution {
                    column,
                    evidence: inserted,
                    trusted,
                });
            }
        }

        self.read_pos += length;
        Ok(())
    }

    fn step_deletion(&mut self, length: usize) {
        for _ in 0..length {
            self.contributions.push(Contribution {
                column: self.ref_pos,
                evidence: DELETION.to_string(),
                trusted: self.last_trusted,
            });
            self.ref_pos += 1;
        }
    }
}

/// Walk a record; see [`CoordinateWalker::walk`].
///
/// # Errors
///
/// Returns `AlignmentError::InsertionBeforeStart` for a leading insertion at reference position 0.
pub fn walk(record: &AlignmentRecord) -> Result<Vec<Contribution>, AlignmentError> {
    CoordinateWalker::new(record).walk()
}
