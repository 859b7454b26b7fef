//! Loader for draft assemblies in FASTA format using noodles.
//!
//! Plain and gzip/bgzip compressed files are both accepted; compression is detected from the
//! file content, not its extension.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use noodles::fasta;
use tracing::debug;

use crate::core::reference::ReferenceSequence;
use crate::parsing::compression::open_reader;
use crate::parsing::sam::ParseError;
use crate::utils::validation::check_contig_limit;

/// Load every sequence of a FASTA file, uppercasing bases.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::UnsupportedFormat` for
/// bzip2/zip input, `ParseError::Noodles` if a record fails to parse,
/// `ParseError::InvalidFormat` for an empty file, an unnamed or empty sequence, or a duplicated
/// name, and `ParseError::TooManyContigs` if the limit is exceeded.
pub fn load_fasta(path: &Path) -> Result<Vec<ReferenceSequence>, ParseError> {
    let mut reader = fasta::io::Reader::new(open_reader(path)?);
    let references = parse_fasta_reader(&mut reader)?;

    debug!(
        path = %path.display(),
        sequences = references.len(),
        "Loaded FASTA"
    );

    Ok(references)
}

fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<ReferenceSequence>, ParseError> {
    let mut references: Vec<ReferenceSequence> = Vec::new();
    let mut names = HashSet::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        // Check contig limit for DOS protection
        if check_contig_limit(references.len()).is_some() {
            return Err(ParseError::TooManyContigs(references.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        if name.is_empty() {
            return Err(ParseError::InvalidFormat(
                "FASTA contains an unnamed sequence".to_string(),
            ));
        }

        let sequence: Vec<u8> = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();
        if sequence.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "sequence '{name}' is empty"
            )));
        }

        if !names.insert(name.clone()) {
            return Err(ParseError::InvalidFormat(format!(
                "sequence name '{name}' is duplicated"
            )));
        }

        references.push(ReferenceSequence::new(name, sequence));
    }

    if references.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(references)
}
