//! Compression detection from leading magic bytes.
//!
//! Inputs may be plain text or gzip (including bgzip, which is multi-member gzip). bzip2 and
//! zip are recognised only so they can be rejected with a useful message.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::parsing::sam::ParseError;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b, 0x08];
const BZIP2_MAGIC: &[u8] = &[0x42, 0x5a, 0x68];
const ZIP_MAGIC: &[u8] = &[0x50, 0x4b, 0x03, 0x04];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Bzip2,
    Zip,
}

impl Compression {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Compression::Plain => "plain text",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::Zip => "zip",
        }
    }
}

/// Classify the first bytes of a file
#[must_use]
pub fn sniff_compression(start: &[u8]) -> Compression {
    if start.starts_with(GZIP_MAGIC) {
        Compression::Gzip
    } else if start.starts_with(BZIP2_MAGIC) {
        Compression::Bzip2
    } else if start.starts_with(ZIP_MAGIC) {
        Compression::Zip
    } else {
        Compression::Plain
    }
}

/// Detect the compression of a file, rejecting formats that cannot be read.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read, or
/// `ParseError::UnsupportedFormat` for bzip2 and zip files.
pub fn detect_compression(path: &Path) -> Result<Compression, ParseError> {
    let mut start = Vec::with_capacity(ZIP_MAGIC.len());
    File::open(path)?
        .take(ZIP_MAGIC.len() as u64)
        .read_to_end(&mut start)?;

    match sniff_compression(&start) {
        compression @ (Compression::Plain | Compression::Gzip) => Ok(compression),
        unsupported => Err(ParseError::UnsupportedFormat(format!(
            "{} is {} compressed - use gzip instead",
            path.display(),
            unsupported.display_name()
        ))),
    }
}

/// Open a file for buffered reading, decompressing gzip transparently.
///
/// # Errors
///
/// Same as [`detect_compression`].
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let compression = detect_compression(path)?;
    let file = File::open(path)?;

    Ok(match compression {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sniff_compression() {
        assert_eq!(sniff_compression(b"\x1f\x8b\x08\x00rest"), Compression::Gzip);
        assert_eq!(sniff_compression(b"BZh91AY"), Compression::Bzip2);
        assert_eq!(sniff_compression(b"PK\x03\x04"), Compression::Zip);
        assert_eq!(sniff_compression(b">contig\nACGT"), Compression::Plain);
        assert_eq!(sniff_compression(b"\x1f"), Compression::Plain);
        assert_eq!(sniff_compression(b""), Compression::Plain);
    }

    #[test]
    fn test_open_gzipped() {
        let mut temp = NamedTempFile::with_suffix(".gz").unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"line one\nline two\n").unwrap();
        temp.write_all(&encoder.finish().unwrap()).unwrap();
        temp.flush().unwrap();

        assert_eq!(detect_compression(temp.path()).unwrap(), Compression::Gzip);
        let lines: Vec<String> = open_reader(temp.path())
            .unwrap()
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[test]
    fn test_open_plain_and_tiny_files() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"A").unwrap();
        temp.flush().unwrap();
        assert_eq!(detect_compression(temp.path()).unwrap(), Compression::Plain);

        let mut contents = String::new();
        open_reader(temp.path())
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "A");
    }

    #[test]
    fn test_reject_bzip2_and_zip() {
        for magic in [&b"BZh91AY&SY"[..], &b"PK\x03\x04\x14\x00"[..]] {
            let mut temp = NamedTempFile::new().unwrap();
            temp.write_all(magic).unwrap();
            temp.flush().unwrap();

            let err = detect_compression(temp.path()).unwrap_err();
            assert!(matches!(err, ParseError::UnsupportedFormat(_)));
            assert!(err.to_string().contains("use gzip instead"));
        }
    }

    #[test]
    fn test_missing_file() {
        let result = detect_compression(Path::new("/nonexistent/reads.sam"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
