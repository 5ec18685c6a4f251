//! Substring relevance heuristic used to rank titles and object names.
//!
//! Cheap and deterministic: one pass over the candidate per query term, no
//! external ranking model.

use std::borrow::Cow;

/// Multiplier when a match starts the text or follows `.` or `:`.
pub const SEGMENT_START_BONUS: f64 = 3.0;

/// Multiplier when a match follows `-` or `_`.
pub const WORD_BOUNDARY_BONUS: f64 = 2.0;

/// Score one query term against a candidate text.
///
/// Returns `None` when `term` does not occur in `text` (after lowercasing both
/// if `case_insensitive`). Otherwise the score is the fraction of `text`
/// covered by all occurrences of `term`, scaled by a bonus for where the
/// first occurrence starts:
/// - start of text, or after `.`/`:`: ×3
/// - after `-`/`_`: ×2
pub fn score(text: &str, term: &str, case_insensitive: bool) -> Option<f64> {
    let (text, term) = normalize(text, term, case_insensitive);

    let position = text.find(term.as_ref())?;
    if term.is_empty() {
        return Some(0.0);
    }

    let occurrences = text.matches(term.as_ref()).count();
    let term_len = term.chars().count();
    let text_len = text.chars().count();
    let base = (occurrences * term_len) as f64 / text_len as f64;

    let bonus = match text[..position].chars().next_back() {
        None | Some('.' | ':') => SEGMENT_START_BONUS,
        Some('-' | '_') => WORD_BOUNDARY_BONUS,
        Some(_) => 1.0,
    };

    Some(base * bonus)
}

/// Score every term against `text` and sum the results.
///
/// Matching is conjunctive: if any term is missing the candidate is rejected.
pub fn score_all<S: AsRef<str>>(text: &str, terms: &[S], case_insensitive: bool) -> Option<f64> {
    terms
        .iter()
        .map(|term| score(text, term.as_ref(), case_insensitive))
        .sum()
}

fn normalize<'a>(
    text: &'a str,
    term: &'a str,
    case_insensitive: bool,
) -> (Cow<'a, str>, Cow<'a, str>) {
    if case_insensitive {
        (
            Cow::Owned(text.to_lowercase()),
            Cow::Owned(term.to_lowercase()),
        )
    } else {
        (Cow::Borrowed(text), Cow::Borrowed(term))
    }
}
