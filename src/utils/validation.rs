//! Centralized validation and helper functions.

use std::path::Path;

/// Maximum number of alignment records accepted from one input (DOS protection)
pub const MAX_ALIGNMENTS: usize = 100_000;

/// Largest target or subject length accepted from input
pub const MAX_SEQUENCE_LENGTH: i64 = 1_000_000_000;

/// IUPAC nucleotide codes, including gaps
const IUPAC_CODES: &str = "ACGTURYSWKMBDHVN-";

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_record_limit(records.len()).is_some() {
///     return Err(...);
/// }
/// records.push(record); // Safe to add
/// ```
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_ALIGNMENTS {
        Some(format!(
            "Too many alignments: adding another would exceed maximum of {MAX_ALIGNMENTS}"
        ))
    } else {
        None
    }
}

/// Validate a sequence length read from input.
/// Returns an error message if the length is not usable.
#[must_use]
pub fn check_sequence_length(length: i64) -> Option<String> {
    if length < 1 {
        Some(format!("Sequence length must be positive, got {length}"))
    } else if length > MAX_SEQUENCE_LENGTH {
        Some(format!(
            "Sequence length {length} exceeds maximum of {MAX_SEQUENCE_LENGTH}"
        ))
    } else {
        None
    }
}

/// Check that every character is an IUPAC nucleotide code (case-insensitive).
///
/// # Examples
///
/// ```
/// use assembly_planner::utils::validation::is_valid_sequence;
///
/// assert!(is_valid_sequence("ACGTNacgtn"));
/// assert!(!is_valid_sequence("ACGT1"));
/// assert!(!is_valid_sequence(""));
/// ```
#[must_use]
pub fn is_valid_sequence(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| IUPAC_CODES.contains(c.to_ascii_uppercase()))
}

/// Normalize a sequence to uppercase with whitespace removed.
/// Returns None if the result is empty or contains non-IUPAC characters.
#[must_use]
pub fn normalize_sequence(s: &str) -> Option<String> {
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    is_valid_sequence(&normalized).then_some(normalized)
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Lowercased extension with any compression suffix removed
#[must_use]
pub fn base_extension(path: &Path) -> Option<String> {
    let stem = if is_gzipped(path) {
        Path::new(path.file_stem()?)
    } else {
        path
    };
    stem.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}
