use std::collections::HashMap;

use crate::core::alignment::AlignmentRecord;

/// Alignments against one reference contig, grouped by read.
///
/// `read_order` lists each read once, in the order it was first seen; a read listed there always
/// has at least one record in `by_read`.
#[derive(Debug, Clone, Default)]
pub struct ContigAlignments {
    pub read_order: Vec<String>,
    pub by_read: HashMap<String, Vec<AlignmentRecord>>,
}

impl ContigAlignments {
    pub fn push(&mut self, read_id: impl Into<String>, record: AlignmentRecord) {
        let read_id = read_id.into();
        match self.by_read.get_mut(&read_id) {
            Some(records) => records.push(record),
            None => {
                self.read_order.push(read_id.clone());
                self.by_read.insert(read_id, vec![record]);
            }
        }
    }

    #[must_use]
    pub fn read_count(&self) -> usize {
        self.read_order.len()
    }

    #[must_use]
    pub fn alignment_count(&self) -> usize {
        self.by_read.values().map(Vec::len).sum()
    }
}

/// All usable alignments, keyed by reference contig name
#[derive(Debug, Clone, Default)]
pub struct AlignmentSet {
    contigs: HashMap<String, ContigAlignments>,
}

impl AlignmentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, contig: &str, read_id: impl Into<String>, record: AlignmentRecord) {
        self.contigs
            .entry(contig.to_string())
            .or_default()
            .push(read_id, record);
    }

    /// Alignments for one contig; `None` when nothing aligned there
    #[must_use]
    pub fn contig(&self, name: &str) -> Option<&ContigAlignments> {
        self.contigs.get(name)
    }

    #[must_use]
    pub fn alignment_count(&self) -> usize {
        self.contigs
            .values()
            .map(ContigAlignments::alignment_count)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}
