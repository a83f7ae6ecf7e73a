use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_SLUG_CHARS_REGEX: Regex = Regex::new(r"[^a-z0-9\s-]").unwrap();
    static ref WHITESPACE_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Combining Diacritical Marks block, left behind by canonical decomposition.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Derive a URL-safe slug from a tag title.
///
/// Accents are folded ("café" becomes "cafe"), the result is lowercased,
/// anything outside `[a-z0-9]`, whitespace and `-` is dropped, and every
/// whitespace run becomes a single `-`. Surrounding whitespace is not trimmed,
/// so `"  a b "` yields `"-a-b-"`.
pub fn derive_slug(input: &str) -> String {
    let folded: String = input.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = folded.to_lowercase();
    let stripped = NON_SLUG_CHARS_REGEX.replace_all(&lowered, "");
    WHITESPACE_RUN_REGEX.replace_all(&stripped, "-").into_owned()
}
