use std::fmt;

/// A named sequence from the draft assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSequence {
    /// Sequence name (first word of the FASTA header)
    pub name: String,

    /// Uppercase bases
    pub sequence: Vec<u8>,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    /// Base at a 0-based position, if it exists
    #[must_use]
    pub fn base_at(&self, pos: usize) -> Option<char> {
        self.sequence.get(pos).map(|&b| char::from(b))
    }
}

impl fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bp)", self.name, self.length())
    }
}
