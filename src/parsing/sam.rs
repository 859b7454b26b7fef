//! Loader for short-read alignments in SAM format using noodles.
//!
//! Every mapped record becomes an [`AlignmentRecord`] grouped by contig and read. Reads are
//! expected to be aligned to all of their possible locations, so most reads in repeats carry
//! several records. Secondary records often store `*` instead of bases; those borrow the bases
//! of another record of the same read, reverse-complemented when the strands differ.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::RecordBuf;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::alignment::{AlignmentError, AlignmentRecord, OpKind, Operation};
use crate::core::alignment_set::AlignmentSet;
use crate::core::reference::ReferenceSequence;
use crate::core::sequence::reverse_complement;
use crate::parsing::compression::open_reader;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Too many contigs: {0} exceeds maximum allowed (100000)")]
    TooManyContigs(usize),

    #[error("Invalid alignment for read '{read}': {source}")]
    Alignment {
        read: String,
        source: AlignmentError,
    },
}

/// Counts of what happened to the SAM records that were read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub records: usize,
    pub unmapped: usize,
    pub too_many_errors: usize,
    pub used: usize,
}

/// A mapped record whose bases may still need to be borrowed from another record
struct PendingAlignment {
    read_id: String,
    contig: String,
    reference_start: usize,
    cigar: ConvertedCigar,
    sequence: Option<Vec<u8>>,
    is_reverse: bool,
}

/// Bases of a read as stored in a record without hard clips
struct StoredSequence {
    bases: Vec<u8>,
    is_reverse: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ConvertedCigar {
    operations: Vec<Operation>,
    leading_soft_clip: usize,
    leading_hard_clip: usize,
    has_hard_clip: bool,
}

/// Load alignments from one or more SAM files (plain or gzipped).
///
/// Records with an `NM` tag above `max_errors` are skipped. Masked read positions are left
/// empty.
///
/// # Errors
///
/// Returns `ParseError::Io`/`ParseError::UnsupportedFormat` if a file cannot be opened,
/// `ParseError::Noodles` if a header or record fails to parse, `ParseError::InvalidFormat` for
/// records without a name or position, alignments to contigs missing from the assembly, or reads
/// whose bases are not stored anywhere, `ParseError::UnsupportedFormat` for `N` CIGAR operations,
/// and `ParseError::Alignment` if a CIGAR does not fit its read.
pub fn load_alignments(
    paths: &[PathBuf],
    references: &[ReferenceSequence],
    max_errors: u32,
) -> Result<(AlignmentSet, LoadStats), ParseError> {
    let contig_lengths: HashMap<&str, usize> = references
        .iter()
        .map(|r| (r.name.as_str(), r.length()))
        .collect();

    let mut stats = LoadStats::default();
    let mut pending = Vec::new();
    let mut stored = HashMap::new();

    for path in paths {
        let before = stats;
        read_sam_file(
            path,
            &contig_lengths,
            max_errors,
            &mut pending,
            &mut stored,
            &mut stats,
        )?;
        info!(
            path = %path.display(),
            records = stats.records - before.records,
            unmapped = stats.unmapped - before.unmapped,
            "Loaded SAM"
        );
    }

    let mut alignments = AlignmentSet::new();
    for alignment in pending {
        let contig = alignment.contig.clone();
        let read_id = alignment.read_id.clone();
        let record = resolve_alignment(alignment, &stored)?;
        alignments.push(&contig, read_id, record);
        stats.used += 1;
    }

    if stats.too_many_errors > 0 {
        warn!(
            skipped = stats.too_many_errors,
            max_errors, "Skipped alignments with too many mismatches and indels"
        );
    }

    Ok((alignments, stats))
}

fn read_sam_file(
    path: &Path,
    contig_lengths: &HashMap<&str, usize>,
    max_errors: u32,
    pending: &mut Vec<PendingAlignment>,
    stored: &mut HashMap<String, StoredSequence>,
    stats: &mut LoadStats,
) -> Result<(), ParseError> {
    let mut reader = sam::io::Reader::new(open_reader(path)?);

    let header = reader
        .read_header()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;

    let mut warned_contigs = HashSet::new();

    for result in reader.record_bufs(&header) {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse SAM record: {e}")))?;
        stats.records += 1;

        let flags = record.flags();
        if flags.is_unmapped() {
            stats.unmapped += 1;
            continue;
        }

        let name = record.name().map(|n| n.to_string()).ok_or_else(|| {
            ParseError::InvalidFormat("SAM record without a read name".to_string())
        })?;
        let read_id = read_identifier(&name, flags);

        let (contig, header_length) = record
            .reference_sequence_id()
            .and_then(|id| header.reference_sequences().get_index(id))
            .map(|(name, map)| (name.to_string(), map.length().get()))
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!("mapped read '{read_id}' has no reference"))
            })?;

        let Some(&assembly_length) = contig_lengths.get(contig.as_str()) else {
            return Err(ParseError::InvalidFormat(format!(
                "read '{read_id}' aligns to '{contig}', which is not in the assembly"
            )));
        };
        if header_length != assembly_length && warned_contigs.insert(contig.clone()) {
            warn!(
                contig = %contig,
                sam_length = header_length,
                assembly_length,
                "SAM header length differs from the assembly"
            );
        }

        let reference_start = record
            .alignment_start()
            .map(|position| usize::from(position) - 1)
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!("mapped read '{read_id}' has no position"))
            })?;

        let cigar = convert_cigar(&record)?;
        let is_reverse = flags.is_reverse_complemented();
        let sequence = stored_bases(&record);

        // Only full-length bases can be lent to other records
        if let Some(bases) = sequence.as_ref().filter(|_| !cigar.has_hard_clip) {
            stored
                .entry(read_id.clone())
                .or_insert_with(|| StoredSequence {
                    bases: bases.clone(),
                    is_reverse,
                });
        }

        if edit_distance(&record).is_some_and(|errors| errors > i64::from(max_errors)) {
            stats.too_many_errors += 1;
            continue;
        }

        pending.push(PendingAlignment {
            read_id,
            contig,
            reference_start,
            cigar,
            sequence,
            is_reverse,
        });
    }

    Ok(())
}

/// Mates of a pair are distinct reads, so they get `/1` and `/2` suffixes
fn read_identifier(name: &str, flags: Flags) -> String {
    if flags.is_segmented() && flags.is_first_segment() {
        format!("{name}/1")
    } else if flags.is_segmented() && flags.is_last_segment() {
        format!("{name}/2")
    } else {
        name.to_string()
    }
}

fn stored_bases(record: &RecordBuf) -> Option<Vec<u8>> {
    let bases = record.sequence().as_ref();
    if bases.is_empty() {
        None
    } else {
        Some(bases.iter().map(u8::to_ascii_uppercase).collect())
    }
}

/// Number of mismatches and indel bases (`NM` tag), if present
fn edit_distance(record: &RecordBuf) -> Option<i64> {
    match record.data().get(&Tag::EDIT_DISTANCE)? {
        Value::Int8(n) => Some(i64::from(*n)),
        Value::UInt8(n) => Some(i64::from(*n)),
        Value::Int16(n) => Some(i64::from(*n)),
        Value::UInt16(n) => Some(i64::from(*n)),
        Value::Int32(n) => Some(i64::from(*n)),
        Value::UInt32(n) => Some(i64::from(*n)),
        _ => None,
    }
}

/// Map SAM CIGAR operations onto match/insertion/deletion.
///
/// Clips before the first walked operation shift the read start; later clips and pads consume
/// nothing that is walked.
fn convert_cigar(record: &RecordBuf) -> Result<ConvertedCigar, ParseError> {
    let mut converted = ConvertedCigar::default();

    for op in record.cigar().as_ref() {
        let length = op.len();
        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                converted.operations.push(Operation::new(OpKind::Match, length));
            }
            Kind::Insertion => {
                converted
                    .operations
                    .push(Operation::new(OpKind::Insertion, length));
            }
            Kind::Deletion => {
                converted
                    .operations
                    .push(Operation::new(OpKind::Deletion, length));
            }
            Kind::SoftClip => {
                if converted.operations.is_empty() {
                    converted.leading_soft_clip += length;
                }
            }
            Kind::HardClip => {
                converted.has_hard_clip = true;
                if converted.operations.is_empty() {
                    converted.leading_hard_clip += length;
                }
            }
            Kind::Pad => {}
            Kind::Skip => {
                return Err(ParseError::UnsupportedFormat(
                    "CIGAR skip (N) operations are not supported".to_string(),
                ));
            }
        }
    }

    Ok(converted)
}

fn resolve_alignment(
    alignment: PendingAlignment,
    stored: &HashMap<String, StoredSequence>,
) -> Result<AlignmentRecord, ParseError> {
    let PendingAlignment {
        read_id,
        reference_start,
        cigar,
        sequence,
        is_reverse,
        ..
    } = alignment;

    let (bases, read_start) = match sequence {
        Some(bases) => (bases, cigar.leading_soft_clip),
        None => {
            let source = stored.get(&read_id).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "read '{read_id}' has no bases stored in any alignment"
                ))
            })?;
            let bases = if source.is_reverse == is_reverse {
                source.bases.clone()
            } else {
                reverse_complement(&source.bases)
            };
            // Borrowed bases are full length, so hard-clipped bases count too
            (bases, cigar.leading_hard_clip + cigar.leading_soft_clip)
        }
    };

    AlignmentRecord::new(reference_start, cigar.operations, bases)
        .and_then(|record| record.with_read_start(read_start))
        .map_err(|source| ParseError::Alignment {
            read: read_id,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "@HD\tVN:1.6\n@SQ\tSN:contig_1\tLN:20\n@SQ\tSN:contig_2\tLN:8\n";

    fn references() -> Vec<ReferenceSequence> {
        vec![
            ReferenceSequence::new("contig_1", "AAACCCGGGTTTACGTACGT"),
            ReferenceSequence::new("contig_2", "GGGGCCCC"),
        ]
    }

    fn write_sam(records: &[&str]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(".sam").unwrap();
        temp.write_all(HEADER.as_bytes()).unwrap();
        for record in records {
            writeln!(temp, "{record}").unwrap();
        }
        temp.flush().unwrap();
        temp
    }

    fn load(records: &[&str], max_errors: u32) -> Result<(AlignmentSet, LoadStats), ParseError> {
        let temp = write_sam(records);
        load_alignments(&[temp.path().to_path_buf()], &references(), max_errors)
    }

    #[test]
    fn test_load_alignments() {
        let (alignments, stats) = load(
            &[
                "read_a\t0\tcontig_1\t4\t60\t5M\t*\t0\t0\tCCCGG\t*\tNM:i:0",
                "read_b\t0\tcontig_2\t2\t60\t2M1D2M\t*\t0\t0\tGGCC\t*\tNM:i:1",
                "read_c\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*",
            ],
            10,
        )
        .unwrap();

        assert_eq!(
            stats,
            LoadStats {
                records: 3,
                unmapped: 1,
                too_many_errors: 0,
                used: 2
            }
        );

        let contig_1 = alignments.contig("contig_1").unwrap();
        assert_eq!(contig_1.read_order, vec!["read_a"]);
        let record = &contig_1.by_read["read_a"][0];
        assert_eq!(record.reference_start(), 3);
        assert_eq!(record.read_sequence(), b"CCCGG");
        assert_eq!(record.operations(), [Operation::new(OpKind::Match, 5)]);

        let record = &alignments.contig("contig_2").unwrap().by_read["read_b"][0];
        assert_eq!(record.reference_start(), 1);
        assert_eq!(
            record.operations(),
            [
                Operation::new(OpKind::Match, 2),
                Operation::new(OpKind::Deletion, 1),
                Operation::new(OpKind::Match, 2),
            ]
        );
    }

    #[test]
    fn test_secondary_borrows_bases() {
        let (alignments, _) = load(
            &[
                "read_a\t0\tcontig_1\t4\t60\t5M\t*\t0\t0\tCCCGG\t*",
                "read_a\t256\tcontig_1\t14\t0\t5M\t*\t0\t0\t*\t*",
                "read_a\t272\tcontig_2\t1\t0\t5M\t*\t0\t0\t*\t*",
            ],
            10,
        )
        .unwrap();

        let contig_1 = alignments.contig("contig_1").unwrap();
        assert_eq!(contig_1.by_read["read_a"].len(), 2);
        assert_eq!(contig_1.by_read["read_a"][1].read_sequence(), b"CCCGG");

        // Opposite strand gets the reverse complement
        let contig_2 = alignments.contig("contig_2").unwrap();
        assert_eq!(contig_2.by_read["read_a"][0].read_sequence(), b"CCGGG");
    }

    #[test]
    fn test_missing_bases() {
        let err = load(&["read_a\t256\tcontig_1\t4\t0\t5M\t*\t0\t0\t*\t*"], 10)
            .unwrap_err();
        assert!(err.to_string().contains("no bases stored"));
    }

    #[test]
    fn test_soft_and_hard_clips() {
        let (alignments, _) = load(
            &[
                "read_a\t0\tcontig_1\t4\t60\t2S3M1S\t*\t0\t0\tTTCCCA\t*",
                "read_a\t256\tcontig_1\t10\t0\t1H2S3M\t*\t0\t0\t*\t*",
            ],
            10,
        )
        .unwrap();

        let records = &alignments.contig("contig_1").unwrap().by_read["read_a"];
        assert_eq!(records[0].read_start(), 2);
        assert_eq!(records[0].operations(), [Operation::new(OpKind::Match, 3)]);
        assert_eq!(records[1].read_start(), 3);
    }

    #[test]
    fn test_mates_are_distinct_reads() {
        let (alignments, _) = load(
            &[
                "pair\t65\tcontig_1\t1\t60\t4M\tcontig_1\t10\t0\tAAAC\t*",
                "pair\t129\tcontig_1\t10\t60\t4M\tcontig_1\t1\t0\tGTTT\t*",
            ],
            10,
        )
        .unwrap();

        let contig_1 = alignments.contig("contig_1").unwrap();
        assert_eq!(contig_1.read_order, vec!["pair/1", "pair/2"]);
    }

    #[test]
    fn test_too_many_errors() {
        let (alignments, stats) = load(
            &[
                "read_a\t0\tcontig_1\t1\t60\t5M\t*\t0\t0\tTTTTT\t*\tNM:i:5",
                "read_b\t0\tcontig_1\t1\t60\t5M\t*\t0\t0\tAAACC\t*\tNM:i:0",
            ],
            4,
        )
        .unwrap();

        assert_eq!(stats.too_many_errors, 1);
        assert_eq!(stats.used, 1);
        assert_eq!(
            alignments.contig("contig_1").unwrap().read_order,
            vec!["read_b"]
        );
    }

    #[test]
    fn test_contig_missing_from_assembly() {
        let temp = write_sam(&["read_a\t0\tcontig_2\t1\t60\t4M\t*\t0\t0\tGGGG\t*"]);
        let err =
            load_alignments(&[temp.path().to_path_buf()], &references()[..1], 10).unwrap_err();
        assert!(err.to_string().contains("not in the assembly"));
    }

    #[test]
    fn test_skip_operation_unsupported() {
        let err = load(&["read_a\t0\tcontig_1\t1\t60\t2M5N2M\t*\t0\t0\tAAGT\t*"], 10)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_cigar_longer_than_read() {
        let err = load(&["read_a\t0\tcontig_1\t1\t60\t6M\t*\t0\t0\tAAAC\t*"], 10);
        // noodles may reject the record itself; either way loading fails
        assert!(err.is_err());
    }
}
