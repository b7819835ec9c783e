//! C5 — Qualifier Extractor.
//!
//! Peels country / US-state / international-admin-division qualifiers off
//! a forward-geocoding query in four passes over the residual query
//! *string*, not its comma-separated segments — `"Austin, TX"` and
//! `"Austin TX"` both work. See `SPEC_FULL.md` §4.4.

use crate::model::GeoCorpus;
use crate::text::lower_key;

/// Qualifiers recovered from a query, plus the tokens the scorer works
/// from.
#[derive(Debug, Default, Clone)]
pub struct ExtractedQuery {
    pub country_iso2: Option<String>,
    pub admin1_code: Option<String>,
    /// Every 2–3 char ALL-CAPS token in the *original* query — a weak
    /// region/country hint (R1/R2).
    pub abbrev_slice: Vec<String>,
    /// Whitespace-split tokens of the residual query once all qualifier
    /// passes have run.
    pub name_slice: Vec<String>,
}

/// Derived once per corpus: `(code, name)` pairs for every `AdminDivision`
/// whose country is `US`, built from the loaded table rather than a
/// hardcoded USPS list.
pub struct UsStateTables {
    entries: Vec<(String, String)>,
}

impl UsStateTables {
    pub fn build(corpus: &GeoCorpus) -> Self {
        let mut entries: Vec<(String, String)> = corpus
            .admin_divisions
            .iter()
            .filter(|a| corpus.interner.get(a.country_iso2).eq_ignore_ascii_case("US"))
            .map(|a| {
                (
                    corpus.interner.get(a.code).to_string(),
                    corpus.interner.get(a.name).to_string(),
                )
            })
            .collect();
        entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        UsStateTables { entries }
    }
}

/// Every 2–3 character ALL-CAPS token in `query`, trimmed of trailing
/// commas/periods.
fn collect_abbrev_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|tok| tok.trim_end_matches([',', '.']))
        .filter(|tok| {
            let len = tok.chars().count();
            (2..=3).contains(&len) && tok.chars().all(|c| c.is_ascii_uppercase())
        })
        .map(str::to_string)
        .collect()
}

/// If `residual` equals `candidate` (case-insensitive), or has it as a
/// `", "`/`" "`-separated prefix or suffix, returns the residual with the
/// match removed and trimmed.
fn strip_qualifier(residual: &str, candidate: &str) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }
    let folded_residual = lower_key(residual);
    let folded_candidate = lower_key(candidate);
    if folded_residual == folded_candidate {
        return Some(String::new());
    }

    let residual_chars: Vec<char> = residual.chars().collect();
    let folded_chars: Vec<char> = folded_residual.chars().collect();
    let cand_chars: Vec<char> = folded_candidate.chars().collect();
    if folded_chars.len() != residual_chars.len() {
        // Lowercasing changed the char count (rare non-ASCII edge case);
        // byte/char-position slicing below would be unsafe, so skip.
        return None;
    }

    for sep in [", ", " "] {
        let sep_chars: Vec<char> = sep.chars().collect();

        let prefix_len = cand_chars.len() + sep_chars.len();
        if folded_chars.len() >= prefix_len
            && folded_chars[..cand_chars.len()] == cand_chars[..]
            && folded_chars[cand_chars.len()..prefix_len] == sep_chars[..]
        {
            let rest: String = residual_chars[prefix_len..].iter().collect();
            return Some(rest.trim().to_string());
        }

        let suffix_len = sep_chars.len() + cand_chars.len();
        if folded_chars.len() >= suffix_len {
            let start = folded_chars.len() - suffix_len;
            if folded_chars[start..start + sep_chars.len()] == sep_chars[..]
                && folded_chars[start + sep_chars.len()..] == cand_chars[..]
            {
                let rest: String = residual_chars[..start].iter().collect();
                return Some(rest.trim().to_string());
            }
        }
    }
    None
}

fn longest_country_names_first(corpus: &GeoCorpus) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = corpus
        .countries
        .iter()
        .map(|c| (corpus.interner.get(c.iso2), corpus.interner.get(c.name)))
        .collect();
    pairs.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    pairs
}

/// Extracts qualifiers from `query` (already normalized by the facade)
/// against `corpus`'s loaded countries/admin divisions and the derived US
/// state tables. Never fails: unmatched input yields every qualifier
/// absent and `name_slice` equal to `query`'s own tokens.
pub fn extract(query: &str, corpus: &GeoCorpus, us_states: &UsStateTables) -> ExtractedQuery {
    let abbrev_slice = collect_abbrev_tokens(query);

    let mut residual = query.to_string();
    let mut country_iso2: Option<String> = None;
    let mut admin1_code: Option<String> = None;

    // Pass 1: country name, longest first so "Guinea-Bissau" isn't
    // shadowed by "Guinea".
    for (iso2, name) in longest_country_names_first(corpus) {
        if let Some(rest) = strip_qualifier(&residual, name) {
            country_iso2 = Some(iso2.to_string());
            residual = rest;
            break;
        }
    }

    // Pass 2: US state code.
    if admin1_code.is_none() {
        for (code, _name) in &us_states.entries {
            if let Some(rest) = strip_qualifier(&residual, code) {
                admin1_code = Some(code.clone());
                if country_iso2.is_none() {
                    country_iso2 = Some("US".to_string());
                }
                residual = rest;
                break;
            }
        }
    }

    // Pass 3: full US state name.
    if admin1_code.is_none() {
        for (code, name) in &us_states.entries {
            if let Some(rest) = strip_qualifier(&residual, name) {
                admin1_code = Some(code.clone());
                if country_iso2.is_none() {
                    country_iso2 = Some("US".to_string());
                }
                residual = rest;
                break;
            }
        }
    }

    // Pass 4: international admin division, read off the residual's last
    // whitespace token.
    if admin1_code.is_none() {
        let tokens: Vec<&str> = residual.split_whitespace().collect();
        if tokens.len() >= 2 {
            let last = tokens[tokens.len() - 1].trim_end_matches([',', ' ']);
            let candidate = last.to_uppercase();
            if (2..=3).contains(&candidate.chars().count()) {
                let accepted = if let Some(iso2) = country_iso2.clone() {
                    corpus.find_admin_division(&iso2, &candidate).is_some()
                } else {
                    let matches: Vec<&crate::model::AdminDivision> = corpus
                        .admin_divisions
                        .iter()
                        .filter(|a| corpus.interner.get(a.code).eq_ignore_ascii_case(&candidate))
                        .collect();
                    if matches.len() == 1 {
                        country_iso2 = Some(corpus.interner.get(matches[0].country_iso2).to_string());
                        true
                    } else {
                        false
                    }
                };
                if accepted {
                    admin1_code = Some(candidate);
                    residual = tokens[..tokens.len() - 1].join(" ");
                }
            }
        }
    }

    let name_slice: Vec<String> = residual
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .split_whitespace()
        .map(str::to_string)
        .collect();

    ExtractedQuery {
        country_iso2,
        admin1_code,
        abbrev_slice,
        name_slice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoCorpus, RawAdmin, RawCity, RawCountry};

    fn fixture() -> GeoCorpus {
        let cities = vec![RawCity {
            name: "Paris".into(),
            alt_names: vec![],
            lat: 33.66,
            lng: -95.56,
            country_iso2: "US".into(),
            admin1_code: "TX".into(),
            population: 25000,
        }];
        let countries = vec![
            RawCountry { iso2: "US".into(), name: "United States".into() },
            RawCountry { iso2: "FR".into(), name: "France".into() },
            RawCountry { iso2: "GN".into(), name: "Guinea".into() },
            RawCountry { iso2: "GW".into(), name: "Guinea-Bissau".into() },
        ];
        let admin = vec![RawAdmin {
            country_iso2: "US".into(),
            code: "TX".into(),
            name: "Texas".into(),
        }];
        GeoCorpus::build(cities, countries, admin)
    }

    #[test]
    fn strips_country_name() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Paris, France", &corpus, &us_states);
        assert_eq!(result.name_slice, vec!["Paris"]);
        assert_eq!(result.country_iso2.as_deref(), Some("FR"));
    }

    #[test]
    fn strips_us_state_code_and_infers_country_without_comma() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Paris TX", &corpus, &us_states);
        assert_eq!(result.name_slice, vec!["Paris"]);
        assert_eq!(result.country_iso2.as_deref(), Some("US"));
        assert_eq!(result.admin1_code.as_deref(), Some("TX"));
    }

    #[test]
    fn strips_us_state_name() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Paris, Texas", &corpus, &us_states);
        assert_eq!(result.admin1_code.as_deref(), Some("TX"));
        assert_eq!(result.country_iso2.as_deref(), Some("US"));
    }

    #[test]
    fn country_already_set_is_never_overridden() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Paris, Texas, France", &corpus, &us_states);
        assert_eq!(result.country_iso2.as_deref(), Some("FR"));
    }

    #[test]
    fn longest_country_name_wins_over_substring_match() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Bissau, Guinea-Bissau", &corpus, &us_states);
        assert_eq!(result.country_iso2.as_deref(), Some("GW"));
    }

    #[test]
    fn collects_abbrev_tokens_from_original_query() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("NYC USA", &corpus, &us_states);
        assert!(result.abbrev_slice.contains(&"NYC".to_string()));
    }

    #[test]
    fn unmatched_query_yields_name_slice_only() {
        let corpus = fixture();
        let us_states = UsStateTables::build(&corpus);
        let result = extract("Nonexistentopolis", &corpus, &us_states);
        assert!(result.country_iso2.is_none());
        assert!(result.admin1_code.is_none());
        assert_eq!(result.name_slice, vec!["Nonexistentopolis"]);
    }
}
