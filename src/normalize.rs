//! Shared text normalization for cross-catalog matching.
//!
//! Both similarity signals in `scoring` compare normalized strings, so any
//! change here shifts every match score. Run tests after changes.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

/// Separator punctuation folded to a word boundary, so "Artist A / Artist B"
/// and "Artist A - Artist B" tokenize the same way.
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\-–—&:,;+]+").unwrap());

/// Anything that is not a word character, whitespace, or an apostrophe.
/// Apostrophes survive so contractions like "don't" are not destroyed.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s']+").unwrap());

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Check if a character is a Unicode combining mark (diacritical mark).
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to lowercase ASCII: NFKD decomposition, drop combining
/// marks, transliterate whatever remains (Cyrillic, Hebrew, CJK).
/// e.g. "Sigur Rós" → "sigur ros", "Ágætis" → "agaetis"
fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

/// Canonicalize a free-text metadata string into comparable form.
///
/// NFKC composition, apostrophe-variant unification, ASCII folding with
/// case folding, separator punctuation to spaces, remaining punctuation
/// stripped, whitespace collapsed. Idempotent.
pub fn normalize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let composed: String = s.nfkc().collect();
    let composed = composed.replace(['\u{2019}', '\u{2018}', '\u{0060}', '\u{02BC}'], "'");
    let folded = fold_to_ascii(&composed);
    let spaced = SEPARATORS.replace_all(&folded, " ");
    let stripped = NON_WORD.replace_all(&spaced, " ");
    MULTI_SPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Split a string into its set of normalized words. Duplicates and order are
/// discarded; empty input yields the empty set.
pub fn tokenize(s: &str) -> FxHashSet<String> {
    normalize(s).split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Svefn-g-englar"), "svefn g englar");
        assert_eq!(normalize("AC/DC"), "ac dc");
        assert_eq!(normalize("Crosby, Stills & Nash"), "crosby stills nash");
        assert_eq!(normalize("Song  (Remastered)"), "song remastered");
    }

    #[test]
    fn test_normalize_apostrophe_variants() {
        assert_eq!(normalize("don’t"), "don't");
        assert_eq!(normalize("don‘t"), "don't");
        assert_eq!(normalize("don`t"), "don't");
        assert_eq!(normalize("donʼt"), "don't");
    }

    #[test]
    fn test_normalize_folds_diacritics() {
        assert_eq!(normalize("Sigur Rós"), "sigur ros");
        assert_eq!(normalize("Ágætis byrjun"), "agaetis byrjun");
        assert_eq!(normalize("Motörhead"), "motorhead");
        assert_eq!(normalize("Beyoncé"), "beyonce");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "Svefn-g-englar",
            "Sigur Rós / múm — tónlist",
            "Don’t Stop Me Now (Live; 1979)",
            "  spaced   out  ",
            "Кино",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_tokenize_set_semantics() {
        let tokens = tokenize("la la land");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("la"));
        assert!(tokens.contains("land"));
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("...").is_empty());
    }
}
