//! Alignment records: one placement of one read against a reference.
//!
//! An [`AlignmentRecord`] is validated when it is built, so everything that walks it later
//! (see [`crate::pileup::walker`]) can rely on the operation list staying inside the read.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Invalid CIGAR string '{0}'")]
    InvalidCigar(String),

    #[error("Operation {index} ({kind}) has zero length")]
    ZeroLengthOperation { index: usize, kind: OpKind },

    #[error(
        "Operations consume {consumed} read bases from read position {read_start}, \
         but the read has only {read_length} bases"
    )]
    ReadOverrun {
        read_start: usize,
        consumed: usize,
        read_length: usize,
    },

    #[error("Operation lengths overflow the coordinate range")]
    LengthOverflow,

    #[error("Masked read position {position} is outside the read (length {read_length})")]
    MaskOutOfRange { position: usize, read_length: usize },

    #[error("Insertion at read position {read_pos} comes before reference position 0")]
    InsertionBeforeStart { read_pos: usize },
}

/// Kind of a pairwise alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Match or mismatch: consumes one reference and one read coordinate per unit
    Match,
    /// Bases present in the read but not the reference
    Insertion,
    /// Reference bases missing from the read
    Deletion,
}

impl OpKind {
    #[must_use]
    pub fn consumes_reference(self) -> bool {
        matches!(self, OpKind::Match | OpKind::Deletion)
    }

    #[must_use]
    pub fn consumes_read(self) -> bool {
        matches!(self, OpKind::Match | OpKind::Insertion)
    }

    /// CIGAR symbol for this kind
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            OpKind::Match => 'M',
            OpKind::Insertion => 'I',
            OpKind::Deletion => 'D',
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single (kind, length) alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    kind: OpKind,
    length: usize,
}

impl Operation {
    #[must_use]
    pub fn new(kind: OpKind, length: usize) -> Self {
        Self { kind, length }
    }

    #[must_use]
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

/// Parse a CIGAR string made of `M`/`=`/`X`, `I` and `D` operations.
///
/// Clipping and skip operations are not accepted here; callers reading SAM records map those
/// before building a record.
///
/// # Errors
///
/// Returns `AlignmentError::InvalidCigar` for unknown operations, missing lengths or lengths
/// that do not parse.
pub fn parse_cigar(cigar: &str) -> Result<Vec<Operation>, AlignmentError> {
    let mut operations = Vec::new();
    let mut num_start = 0;

    for (i, c) in cigar.char_indices() {
        if c.is_ascii_digit() {
            continue;
        }
        let length: usize = cigar[num_start..i]
            .parse()
            .map_err(|_| AlignmentError::InvalidCigar(cigar.to_string()))?;
        let kind = match c {
            'M' | '=' | 'X' => OpKind::Match,
            'I' => OpKind::Insertion,
            'D' => OpKind::Deletion,
            _ => return Err(AlignmentError::InvalidCigar(cigar.to_string())),
        };
        operations.push(Operation::new(kind, length));
        num_start = i + 1;
    }

    // Trailing digits with no operation
    if num_start != cigar.len() {
        return Err(AlignmentError::InvalidCigar(cigar.to_string()));
    }

    Ok(operations)
}

/// One placement of one read against the reference.
///
/// Immutable once built: every constructor validates that the operations stay within the read
/// and that every masked position is a real read coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    reference_start: usize,
    operations: Vec<Operation>,
    read_sequence: Vec<u8>,
    read_start: usize,
    masked_read_positions: HashSet<usize>,
}

impl AlignmentRecord {
    /// Build a record whose first operation starts at read position 0 with nothing masked.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::ZeroLengthOperation` if any operation is empty, or
    /// `AlignmentError::ReadOverrun` if the operations consume more bases than the read has.
    pub fn new(
        reference_start: usize,
        operations: Vec<Operation>,
        read_sequence: impl Into<Vec<u8>>,
    ) -> Result<Self, AlignmentError> {
        let record = Self {
            reference_start,
            operations,
            read_sequence: read_sequence.into(),
            read_start: 0,
            masked_read_positions: HashSet::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Build a record from a CIGAR string such as `11M1I2M2D`.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::InvalidCigar` if the CIGAR does not parse, otherwise the same
    /// errors as [`AlignmentRecord::new`].
    pub fn from_cigar(
        reference_start: usize,
        cigar: &str,
        read_sequence: impl Into<Vec<u8>>,
    ) -> Result<Self, AlignmentError> {
        Self::new(reference_start, parse_cigar(cigar)?, read_sequence)
    }

    /// Start walking at `read_start` instead of 0 (e.g. after a leading soft clip).
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::ReadOverrun` if the operations no longer fit in the read.
    pub fn with_read_start(mut self, read_start: usize) -> Result<Self, AlignmentError> {
        self.read_start = read_start;
        self.validate()?;
        Ok(self)
    }

    /// Replace the set of untrustworthy read positions.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::MaskOutOfRange` if a position is outside the read.
    pub fn with_masked_read_positions(
        mut self,
        positions: impl IntoIterator<Item = usize>,
    ) -> Result<Self, AlignmentError> {
        self.masked_read_positions = positions.into_iter().collect();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), AlignmentError> {
        for (index, op) in self.operations.iter().enumerate() {
            if op.length == 0 {
                return Err(AlignmentError::ZeroLengthOperation {
                    index,
                    kind: op.kind,
                });
            }
        }

        let consumed = self
            .checked_span(OpKind::consumes_read)
            .ok_or(AlignmentError::LengthOverflow)?;
        let read_end = self
            .read_start
            .checked_add(consumed)
            .ok_or(AlignmentError::LengthOverflow)?;
        if read_end > self.read_sequence.len() {
            return Err(AlignmentError::ReadOverrun {
                read_start: self.read_start,
                consumed,
                read_length: self.read_sequence.len(),
            });
        }

        self.checked_span(OpKind::consumes_reference)
            .and_then(|span| self.reference_start.checked_add(span))
            .ok_or(AlignmentError::LengthOverflow)?;

        // Report the smallest offender so the message is stable
        if let Some(&position) = self
            .masked_read_positions
            .iter()
            .filter(|&&p| p >= self.read_sequence.len())
            .min()
        {
            return Err(AlignmentError::MaskOutOfRange {
                position,
                read_length: self.read_sequence.len(),
            });
        }

        Ok(())
    }

    fn checked_span(&self, consumes: fn(OpKind) -> bool) -> Option<usize> {
        self.operations
            .iter()
            .filter(|op| consumes(op.kind))
            .try_fold(0usize, |total, op| total.checked_add(op.length))
    }

    #[must_use]
    pub fn reference_start(&self) -> usize {
        self.reference_start
    }

    /// Exclusive end of the reference span covered by match and deletion operations
    #[must_use]
    pub fn reference_end(&self) -> usize {
        self.reference_start + self.reference_span()
    }

    #[must_use]
    pub fn reference_span(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.kind.consumes_reference())
            .map(|op| op.length)
            .sum()
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn read_sequence(&self) -> &[u8] {
        &self.read_sequence
    }

    #[must_use]
    pub fn read_start(&self) -> usize {
        self.read_start
    }

    #[must_use]
    pub fn is_masked(&self, read_pos: usize) -> bool {
        self.masked_read_positions.contains(&read_pos)
    }
}
