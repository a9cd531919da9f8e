//! Client filename sanitization

/// Characters that let a filename address another directory or volume.
const SEPARATORS: [char; 3] = ['/', '\\', ':'];

/// Strip path and volume separators from an untrusted filename.
///
/// Every other character is kept in order; `..` runs are left alone since
/// without separators they cannot climb out of the session directory.
/// The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

/// Whether a sanitized name can be used as the last segment of a storage key.
pub fn is_usable_filename(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}
