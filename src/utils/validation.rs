//! Centralized validation and helper functions.
//!
//! The numeric predicates bound SAM fields to the widths of their BAM
//! counterparts so that text records stay losslessly convertible.

/// Maximum number of reference sequences allowed in a single header (DOS protection)
pub const MAX_REFERENCES: usize = 1_000_000;

const WORD_BITS: u32 = 31;

/// Coordinate width of the BAI binning scheme.
pub const INDEX_WORD_BITS: u32 = 29;

/// Check that `i` fits in a signed 32-bit integer.
#[must_use]
pub fn valid_int32(i: i64) -> bool {
    i64::from(i32::MIN) <= i && i <= i64::from(i32::MAX)
}

/// Check that `i` is a valid sequence or operation length (`1..=2^31-1`).
#[must_use]
pub fn valid_len(i: i64) -> bool {
    1 <= i && i <= (1 << WORD_BITS) - 1
}

/// Check that `i` is a valid zero-based position; `-1` means unknown.
///
/// # Examples
///
/// ```
/// use samstream::utils::validation::valid_pos;
///
/// assert!(valid_pos(-1));
/// assert!(valid_pos(0));
/// assert!(!valid_pos((1 << 31) - 1));
/// ```
#[must_use]
pub fn valid_pos(i: i64) -> bool {
    -1 <= i && i <= (1 << WORD_BITS) - 2
}

/// Check that `i` is a valid observed template length.
#[must_use]
pub fn valid_tmplt_len(i: i64) -> bool {
    -(1 << WORD_BITS) <= i && i <= (1 << WORD_BITS) - 1
}

/// Check that `i` is a zero-based position the binning index can address.
#[must_use]
pub fn valid_index_pos(i: i64) -> bool {
    -1 <= i && i <= (1 << INDEX_WORD_BITS) - 2
}

/// Check a reference sequence name against the SAM `[:rname:]` grammar.
///
/// `*` and `=` are reserved and may not start a name.
///
/// # Examples
///
/// ```
/// use samstream::utils::validation::is_valid_reference_name;
///
/// assert!(is_valid_reference_name("chr1"));
/// assert!(is_valid_reference_name("HLA-A*01:01:01:01"));
/// assert!(!is_valid_reference_name("*"));
/// assert!(!is_valid_reference_name("chr 1"));
/// ```
#[must_use]
pub fn is_valid_reference_name(name: &str) -> bool {
    fn allowed(b: u8) -> bool {
        b.is_ascii_graphic()
            && !matches!(
                b,
                b'\\' | b',' | b'"' | b'`' | b'\'' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'<' | b'>'
            )
    }

    match name.as_bytes() {
        [] => false,
        [first, rest @ ..] => {
            allowed(*first) && !matches!(first, b'*' | b'=') && rest.iter().all(|&b| allowed(b))
        }
    }
}

/// Validate that a string is a valid MD5 checksum (32 hex characters).
///
/// # Examples
///
/// ```
/// use samstream::utils::validation::is_valid_md5;
///
/// assert!(is_valid_md5("6aef897c3d6ff0c78aff06ac189178dd"));
/// assert!(!is_valid_md5("not-an-md5"));
/// assert!(!is_valid_md5("6aef897c3d6ff0c78aff06ac189178d")); // 31 chars
/// ```
#[must_use]
pub fn is_valid_md5(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize an MD5 string to lowercase.
/// Returns None if the input is not a valid MD5.
#[must_use]
pub fn normalize_md5(s: &str) -> Option<String> {
    if is_valid_md5(s) {
        Some(s.to_lowercase())
    } else {
        None
    }
}

/// Check if adding another reference would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new reference.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_reference_limit(count: usize) -> Option<String> {
    if count >= MAX_REFERENCES {
        Some(format!(
            "Too many reference sequences: adding another would exceed maximum of {MAX_REFERENCES}"
        ))
    } else {
        None
    }
}
