//! Spaces between adjacent inline runs.
//!
//! Content streams often leave out the space between two runs that belong to
//! different structure elements ("end.Next"). When inline siblings are joined
//! a single space is inserted at such a boundary.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Sentence-ending punctuation at the end of the left run
    static ref RE_SENTENCE_END: Regex = Regex::new(r"[.!?;:]$").unwrap();

    /// Opening bracket, quote or hyphen at the end of the left run
    static ref RE_OPENING_END: Regex = Regex::new(r#"[(\[{"'\u{2018}\u{201C}\-]$"#).unwrap();

    /// Word character at the start of the right run
    static ref RE_WORD_START: Regex = Regex::new(r"^\w").unwrap();

    /// Word character directly followed by closing punctuation
    static ref RE_CLOSING_AFTER_WORD: Regex = Regex::new(r#"^\w[)\]}"'\u{2019}\u{201D}]"#).unwrap();
}

/// One inline run, as seen by the spacing heuristic.
#[derive(Debug, Clone, Copy)]
pub struct InlineRun<'a> {
    /// Plain text of the run
    pub text: &'a str,
    /// Rendered as `sup` or `sub`
    pub is_script: bool,
    /// Text came from an ActualText override
    pub has_actual_text: bool,
}

/// True if a space belongs between `left` and `right`.
pub fn needs_space(left: &InlineRun<'_>, right: &InlineRun<'_>) -> bool {
    let (l, r) = (left.text, right.text);
    if l.is_empty() || r.is_empty() {
        return false;
    }
    if l.ends_with(char::is_whitespace) || r.starts_with(char::is_whitespace) {
        return false;
    }
    if left.is_script || right.is_script {
        return false;
    }
    if !(left.has_actual_text || right.has_actual_text || RE_SENTENCE_END.is_match(l)) {
        return false;
    }
    RE_WORD_START.is_match(r) && !RE_OPENING_END.is_match(l) && !RE_CLOSING_AFTER_WORD.is_match(r)
}
