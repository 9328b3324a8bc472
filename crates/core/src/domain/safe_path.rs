// Filesystem-safe identifier sanitization
// Consumed by results-pointer lookups and output directory naming.

/// Characters that misbehave in at least one supported filesystem.
const FS_UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', ';'];

/// Longest sanitized name produced, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Map an arbitrary identifier string to a filesystem-safe equivalent.
///
/// Deterministic: unsafe characters become `_`, a leading dot is
/// neutralized so the result never names a hidden entry, and the output
/// is bounded to [`MAX_NAME_LEN`] characters. Distinct identifiers
/// within one job stay distinct as long as they differ in their first
/// [`MAX_NAME_LEN`] characters by more than unsafe-character choice.
pub fn to_safe_path(input: &str) -> String {
    let mut out: String = input
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| if FS_UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    if out.starts_with('.') {
        out.replace_range(..1, "_");
    }
    out
}
