//! C6 — Forward Scorer.
//!
//! Gathers name-index candidates for a query plus its extracted
//! qualifiers, then either scores them against the rule table below (the
//! default) or runs a strict priority ladder over exact-name matches only
//! (`exact_city` option). See `SPEC_FULL.md` §4.5.

use crate::model::{CityRecord, GeoCorpus};
use crate::qualifiers::ExtractedQuery;
use crate::text::{edit_distance, fold_key, lower_key};
use std::collections::HashSet;

const BONUS_REGION_ABBREV: i64 = 5;
const BONUS_COUNTRY_ABBREV: i64 = 3;
const BONUS_COUNTRY_QUALIFIER: i64 = 4;
const BONUS_REGION_QUALIFIER: i64 = 4;
const BONUS_ALT_NAME_CI: i64 = 3;
const BONUS_ALT_NAME_CS: i64 = 5;
const BONUS_EXACT_NAME: i64 = 7;
const BONUS_FUZZY_TOKEN: i64 = 5;
const BONUS_TOKEN_CONTAINS: i64 = 2;
const BONUS_TOKEN_EQUALS: i64 = 1;
const BONUS_POPULATED: i64 = 1;
const BONUS_HIGHEST_POPULATION: i64 = 1;
const MIN_POPULATION_FOR_BONUS: u64 = 1000;

/// Query-time knobs for [`best_match`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOptions {
    pub exact_city: bool,
    pub fuzzy_distance: u32,
}

fn collect_from_key(corpus: &GeoCorpus, key: &str, seen: &mut HashSet<u32>, out: &mut Vec<u32>) {
    if let Some(indices) = corpus.name_index.get(key) {
        for &idx in indices {
            if seen.insert(idx) {
                out.push(idx);
            }
        }
    }
}

/// §4.5.1: the three index lookups every mode shares, plus the opt-in
/// fuzzy scan.
fn gather_candidates(
    corpus: &GeoCorpus,
    query: &str,
    extracted: &ExtractedQuery,
    fuzzy_distance: u32,
) -> Vec<u32> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    collect_from_key(corpus, &lower_key(query), &mut seen, &mut out);

    if !extracted.name_slice.is_empty() {
        let joined = lower_key(&extracted.name_slice.join(" "));
        collect_from_key(corpus, &joined, &mut seen, &mut out);
    }
    for token in &extracted.name_slice {
        collect_from_key(corpus, &lower_key(token), &mut seen, &mut out);
    }

    if fuzzy_distance > 0 {
        for (key, indices) in &corpus.name_index {
            let hits_any_token = extracted.name_slice.iter().any(|t| {
                t.chars().count() > 2 && edit_distance(&lower_key(t), key) <= fuzzy_distance as usize
            });
            if hits_any_token {
                for &idx in indices {
                    if seen.insert(idx) {
                        out.push(idx);
                    }
                }
            }
        }
    }

    out
}

fn alt_names<'a>(corpus: &'a GeoCorpus, city: &CityRecord) -> Vec<&'a str> {
    city.alt_names.iter().map(|&id| corpus.interner.get(id)).collect()
}

/// R7: the query equals the candidate's name, case-insensitively, or
/// matches once both are diacritic-folded.
fn is_exact_name_match(query: &str, city_name: &str) -> bool {
    lower_key(query) == lower_key(city_name) || fold_key(query) == fold_key(city_name)
}

fn region_matches(corpus: &GeoCorpus, city: &CityRecord, extracted: &ExtractedQuery) -> bool {
    match &extracted.admin1_code {
        Some(want) => corpus
            .city_admin1_code(city)
            .map_or(false, |actual| actual.eq_ignore_ascii_case(want)),
        None => false,
    }
}

fn country_matches(corpus: &GeoCorpus, city: &CityRecord, extracted: &ExtractedQuery) -> bool {
    match &extracted.country_iso2 {
        Some(want) => corpus
            .city_country_iso2(city)
            .map_or(false, |actual| actual.eq_ignore_ascii_case(want)),
        None => false,
    }
}

/// The R1–R10 bonus-only rule table (§4.5.2). No rule ever subtracts.
fn score_candidate(corpus: &GeoCorpus, idx: u32, query: &str, extracted: &ExtractedQuery) -> i64 {
    let city = &corpus.cities[idx as usize];
    let city_name = corpus.city_name(city);
    let mut score = 0i64;

    for abbrev in &extracted.abbrev_slice {
        if abbrev.len() != 2 {
            continue;
        }
        if let Some(region) = corpus.city_admin1_code(city) {
            if abbrev.eq_ignore_ascii_case(region) {
                score += BONUS_REGION_ABBREV; // R1
            }
        }
        if let Some(country) = corpus.city_country_iso2(city) {
            if abbrev.eq_ignore_ascii_case(country) {
                score += BONUS_COUNTRY_ABBREV; // R2
            }
        }
    }

    if country_matches(corpus, city, extracted) {
        score += BONUS_COUNTRY_QUALIFIER; // R3
    }
    if region_matches(corpus, city, extracted) {
        score += BONUS_REGION_QUALIFIER; // R4
    }

    let alts = alt_names(corpus, city);
    if alts.iter().any(|a| a.eq_ignore_ascii_case(query)) {
        score += BONUS_ALT_NAME_CI; // R5
    }
    if alts.iter().any(|&a| a == query) {
        score += BONUS_ALT_NAME_CS; // R6
    }

    if is_exact_name_match(query, city_name) {
        score += BONUS_EXACT_NAME; // R7
    }

    let folded_name = lower_key(city_name);
    for token in &extracted.name_slice {
        let folded_token = lower_key(token);
        if folded_name.contains(&folded_token) {
            score += BONUS_TOKEN_CONTAINS; // R9
        }
        if folded_name == folded_token {
            score += BONUS_TOKEN_EQUALS; // R10
        }
    }

    score
}

fn fuzzy_token_bonus(corpus: &GeoCorpus, idx: u32, extracted: &ExtractedQuery, fuzzy_distance: u32) -> i64 {
    if fuzzy_distance == 0 {
        return 0;
    }
    let city_name = corpus.city_name(&corpus.cities[idx as usize]);
    let folded_name = lower_key(city_name);
    let mut bonus = 0i64;
    for token in &extracted.name_slice {
        if token.chars().count() > 2 {
            let d = edit_distance(&lower_key(token), &folded_name);
            if d <= fuzzy_distance as usize {
                bonus += BONUS_FUZZY_TOKEN; // R8
            }
        }
    }
    bonus
}

/// Fast path: `state_code` set and both R7 (exact name) and R4 (region
/// match) apply.
fn fast_path_hit(corpus: &GeoCorpus, idx: u32, query: &str, extracted: &ExtractedQuery) -> bool {
    if extracted.admin1_code.is_none() {
        return false;
    }
    let city = &corpus.cities[idx as usize];
    region_matches(corpus, city, extracted) && is_exact_name_match(query, corpus.city_name(city))
}

fn pick_highest_population(corpus: &GeoCorpus, indices: &[u32]) -> u32 {
    *indices
        .iter()
        .max_by_key(|&&idx| {
            (
                corpus.cities[idx as usize].population,
                std::cmp::Reverse(idx),
            )
        })
        .expect("indices is non-empty")
}

/// §4.5.3: exact-match mode's strict priority ladder.
fn exact_match_select(
    corpus: &GeoCorpus,
    candidates: &[u32],
    query: &str,
    extracted: &ExtractedQuery,
) -> Option<u32> {
    let rejoined = extracted.name_slice.join(" ");
    let survivors: Vec<u32> = candidates
        .iter()
        .copied()
        .filter(|&idx| {
            let name = corpus.city_name(&corpus.cities[idx as usize]);
            name.eq_ignore_ascii_case(query) || name.eq_ignore_ascii_case(&rejoined)
        })
        .collect();

    if survivors.len() == 1 {
        return Some(survivors[0]);
    }
    if survivors.is_empty() {
        return None;
    }

    let region_and_country: Vec<u32> = survivors
        .iter()
        .copied()
        .filter(|&idx| {
            let city = &corpus.cities[idx as usize];
            region_matches(corpus, city, extracted) && country_matches(corpus, city, extracted)
        })
        .collect();
    if !region_and_country.is_empty() {
        return Some(pick_highest_population(corpus, &region_and_country));
    }

    let region_only: Vec<u32> = survivors
        .iter()
        .copied()
        .filter(|&idx| region_matches(corpus, &corpus.cities[idx as usize], extracted))
        .collect();
    if !region_only.is_empty() {
        return Some(pick_highest_population(corpus, &region_only));
    }

    let country_only: Vec<u32> = survivors
        .iter()
        .copied()
        .filter(|&idx| country_matches(corpus, &corpus.cities[idx as usize], extracted))
        .collect();
    if !country_only.is_empty() {
        return Some(pick_highest_population(corpus, &country_only));
    }

    Some(pick_highest_population(corpus, &survivors))
}

fn apply_population_preference(corpus: &GeoCorpus, scored: &mut [(u32, i64)]) {
    for (idx, score) in scored.iter_mut() {
        if corpus.cities[*idx as usize].population >= MIN_POPULATION_FOR_BONUS {
            *score += BONUS_POPULATED;
        }
    }
    if let Some(&(top_idx, _)) = scored.iter().max_by_key(|&&(idx, _)| {
        (corpus.cities[idx as usize].population, std::cmp::Reverse(idx))
    }) {
        if let Some(entry) = scored.iter_mut().find(|(idx, _)| *idx == top_idx) {
            entry.1 += BONUS_HIGHEST_POPULATION;
        }
    }
}

fn select_best(corpus: &GeoCorpus, scored: &[(u32, i64)]) -> Option<u32> {
    let mut best: Option<(u32, i64)> = None;
    for &(idx, score) in scored {
        best = Some(match best {
            None => (idx, score),
            Some((cur_idx, cur_score)) => {
                let pop_cur = corpus.cities[cur_idx as usize].population;
                let pop_cand = corpus.cities[idx as usize].population;
                let better = (score, pop_cand, std::cmp::Reverse(idx))
                    > (cur_score, pop_cur, std::cmp::Reverse(cur_idx));
                if better {
                    (idx, score)
                } else {
                    (cur_idx, cur_score)
                }
            }
        });
    }
    best.filter(|&(_, score)| score > 0).map(|(idx, _)| idx)
}

/// Picks the single best-matching city index for `query`/`extracted`, or
/// `None` if nothing qualifies. `query` is the normalized original query
/// (not the qualifier-stripped residual) — R5–R7 compare against it
/// directly.
pub fn best_match(
    corpus: &GeoCorpus,
    query: &str,
    extracted: &ExtractedQuery,
    options: &ForwardOptions,
) -> Option<u32> {
    let candidates = gather_candidates(corpus, query, extracted, options.fuzzy_distance);
    if candidates.is_empty() {
        return None;
    }

    if options.exact_city {
        return exact_match_select(corpus, &candidates, query, extracted);
    }

    for &idx in &candidates {
        if fast_path_hit(corpus, idx, query, extracted) {
            return Some(idx);
        }
    }

    let mut scored: Vec<(u32, i64)> = candidates
        .iter()
        .map(|&idx| {
            let score = score_candidate(corpus, idx, query, extracted)
                + fuzzy_token_bonus(corpus, idx, extracted, options.fuzzy_distance);
            (idx, score)
        })
        .collect();

    if extracted.country_iso2.is_none() {
        apply_population_preference(corpus, &mut scored);
    }

    select_best(corpus, &scored)
}

/// `CityRecord` accessor used by callers that already resolved an index.
pub fn record<'a>(corpus: &'a GeoCorpus, idx: u32) -> &'a CityRecord {
    &corpus.cities[idx as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoCorpus, RawCity, RawCountry};
    use crate::qualifiers::{extract, UsStateTables};

    fn fixture() -> GeoCorpus {
        let cities = vec![
            RawCity {
                name: "Paris".into(),
                alt_names: vec![],
                lat: 48.8566,
                lng: 2.3522,
                country_iso2: "FR".into(),
                admin1_code: "".into(),
                population: 2_161_000,
            },
            RawCity {
                name: "Paris".into(),
                alt_names: vec![],
                lat: 33.66,
                lng: -95.56,
                country_iso2: "US".into(),
                admin1_code: "TX".into(),
                population: 25_000,
            },
            RawCity {
                name: "Mumbai".into(),
                alt_names: vec!["Bombay".into()],
                lat: 19.0760,
                lng: 72.8777,
                country_iso2: "IN".into(),
                admin1_code: "16".into(),
                population: 12_442_373,
            },
            RawCity {
                name: "London".into(),
                alt_names: vec![],
                lat: 51.5074,
                lng: -0.1278,
                country_iso2: "GB".into(),
                admin1_code: "".into(),
                population: 8_982_000,
            },
        ];
        let countries = vec![
            RawCountry { iso2: "FR".into(), name: "France".into() },
            RawCountry { iso2: "US".into(), name: "United States".into() },
            RawCountry { iso2: "IN".into(), name: "India".into() },
            RawCountry { iso2: "GB".into(), name: "United Kingdom".into() },
        ];
        GeoCorpus::build(cities, countries, vec![])
    }

    fn run(corpus: &GeoCorpus, query: &str, options: &ForwardOptions) -> Option<u32> {
        let us_states = UsStateTables::build(corpus);
        let extracted = extract(query, corpus, &us_states);
        best_match(corpus, query, &extracted, options)
    }

    #[test]
    fn alias_resolves_to_canonical_city() {
        let corpus = fixture();
        let idx = run(&corpus, "Bombay", &ForwardOptions::default()).unwrap();
        assert_eq!(corpus.city_name(&corpus.cities[idx as usize]), "Mumbai");
    }

    #[test]
    fn country_qualifier_disambiguates() {
        let corpus = fixture();
        let idx = run(&corpus, "Paris, TX", &ForwardOptions::default()).unwrap();
        let city = &corpus.cities[idx as usize];
        assert_eq!(corpus.city_country_iso2(city), Some("US"));
        assert_eq!(corpus.city_admin1_code(city), Some("TX"));
    }

    #[test]
    fn fuzzy_match_finds_misspelling_when_opted_in() {
        let corpus = fixture();
        let options = ForwardOptions { exact_city: false, fuzzy_distance: 1 };
        let idx = run(&corpus, "Londn", &options).unwrap();
        assert_eq!(corpus.city_name(&corpus.cities[idx as usize]), "London");
    }

    #[test]
    fn fuzzy_disabled_by_default_misses_misspelling() {
        let corpus = fixture();
        assert!(run(&corpus, "Londn", &ForwardOptions::default()).is_none());
    }

    #[test]
    fn exact_mode_rejects_fuzzy_candidate() {
        let corpus = fixture();
        let options = ForwardOptions { exact_city: true, fuzzy_distance: 1 };
        assert!(run(&corpus, "Londn", &options).is_none());
    }

    #[test]
    fn exact_mode_picks_highest_population_on_country_tie() {
        let corpus = fixture();
        let options = ForwardOptions { exact_city: true, ..Default::default() };
        let idx = run(&corpus, "London", &options).unwrap();
        assert_eq!(corpus.city_name(&corpus.cities[idx as usize]), "London");
    }

    #[test]
    fn empty_query_never_panics_and_returns_none() {
        let corpus = fixture();
        assert!(run(&corpus, "", &ForwardOptions::default()).is_none());
    }

    #[test]
    fn nonsense_query_yields_no_match_without_fuzzy() {
        let corpus = fixture();
        assert!(run(&corpus, "Zxqwvbn", &ForwardOptions::default()).is_none());
    }
}
