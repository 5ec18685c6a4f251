//! Query tokenization.

/// Split a raw query into search terms on runs of whitespace.
///
/// Empty tokens never appear in the output, so an all-blank query yields no terms.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_string).collect()
}
