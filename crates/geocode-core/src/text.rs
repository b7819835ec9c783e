//! Name-folding and fuzzy-matching helpers shared by the name index and the
//! forward scorer.
//!
//! `lower_key` is what the name index is keyed by (I2: plain Unicode-aware
//! lowercasing, nothing more). `fold_key` additionally transliterates to
//! ASCII and is used only inside the scorer, for rule R7.

/// The name-index key for `s`: its own lowercasing, no diacritic folding.
pub fn lower_key(s: &str) -> String {
    s.to_lowercase()
}

/// Maximum query length the facade accepts, in Unicode scalar values.
const MAX_QUERY_SCALARS: usize = 256;

/// Collapses whitespace runs to a single space, trims the ends, and
/// truncates to the first 256 Unicode scalar values — the first step of
/// every forward-geocoding call, before qualifier extraction ever sees the
/// query.
pub fn normalize_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_QUERY_SCALARS).collect()
}

/// A diacritic-insensitive folding of `s`, used only by scorer rule R7.
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Splits a GeoNames `alternatenames` field into its comma-separated pieces,
/// trimmed of surrounding whitespace, skipping empty pieces.
pub fn split_alt_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Levenshtein edit distance between two folded strings, used by scorer
/// rule R6.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_key_does_not_fold_diacritics() {
        assert_eq!(lower_key("München"), "münchen");
        assert_ne!(lower_key("München"), "munchen");
    }

    #[test]
    fn fold_key_folds_diacritics() {
        assert_eq!(fold_key("München"), "munchen");
        assert_eq!(fold_key("Łódź"), "lodz");
    }

    #[test]
    fn splits_and_trims_alt_names() {
        let pieces = split_alt_names("Mumbai, Bombay ,  , Bambai");
        assert_eq!(pieces, vec!["Mumbai", "Bombay", "Bambai"]);
    }

    #[test]
    fn edit_distance_basic() {
        assert_eq!(edit_distance("london", "london"), 0);
        assert_eq!(edit_distance("londn", "london"), 1);
    }

    #[test]
    fn normalize_query_collapses_whitespace_and_trims() {
        assert_eq!(normalize_query("  Paris   TX  "), "Paris TX");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn normalize_query_truncates_to_256_scalars() {
        let long = "a".repeat(500);
        assert_eq!(normalize_query(&long).chars().count(), 256);
    }
}
