//! Centralized validation and helper functions.

/// Maximum number of contigs allowed in a single assembly (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Upper bound on worker threads
pub const MAX_THREADS: usize = 1024;

/// Validation errors for command-line settings
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Thread count must be between 1 and {MAX_THREADS}, got {0}")]
    InvalidThreadCount(usize),
    #[error("Input file does not exist: {0}")]
    MissingFile(String),
}

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_contig_limit(references.len()).is_some() {
///     return Err(...);
/// }
/// references.push(new_reference); // Safe to add
/// ```
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Validate a worker thread count.
///
/// # Errors
///
/// Returns `ValidationError::InvalidThreadCount` for 0 or more than [`MAX_THREADS`].
pub fn validate_threads(threads: usize) -> Result<usize, ValidationError> {
    if threads == 0 || threads > MAX_THREADS {
        Err(ValidationError::InvalidThreadCount(threads))
    } else {
        Ok(threads)
    }
}

/// Check that every input path exists.
///
/// # Errors
///
/// Returns `ValidationError::MissingFile` naming the first missing path.
pub fn check_files_exist<'a>(
    paths: impl IntoIterator<Item = &'a std::path::Path>,
) -> Result<(), ValidationError> {
    for path in paths {
        if !path.exists() {
            return Err(ValidationError::MissingFile(path.display().to_string()));
        }
    }
    Ok(())
}
