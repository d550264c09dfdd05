//! Token estimation

/// Rough token count for a corpus: chars / 4.
///
/// Counts Unicode code points rather than bytes so CJK text and emoji are not
/// over-counted.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}
