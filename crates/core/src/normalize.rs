//! Canonical text form used for every answer comparison.

/// Characters stripped before comparison.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Lowercase, strip punctuation, collapse whitespace runs and trim.
///
/// Absent input normalizes to the empty string. The result is a fixed point:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// ```
/// # use lesson_core::normalize;
/// assert_eq!(normalize("  Cleared, within   48 (hours)! "), "cleared within 48 hours");
/// assert_eq!(normalize(None), "");
/// ```
#[must_use]
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };

    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
