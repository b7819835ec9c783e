//! C8 — Public Facade.
//!
//! The crate's only intended entry point for query-time code: construct a
//! [`GeoCoder`] (or fetch the process-wide singleton via [`GeoCoder::load`])
//! and call [`GeoCoder::geocode`] / [`GeoCoder::reverse_geocode`]. Both
//! query methods are total: they never panic and never return `Result`,
//! producing [`CityMatch::empty`] instead when nothing qualifies.

use crate::error::Result;
use crate::model::GeoCorpus;
use crate::qualifiers::{self, UsStateTables};
use crate::scorer::{self, ForwardOptions};
use crate::text::normalize_query;
use crate::{loader, reverse};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

static SINGLETON: OnceCell<GeoCoder> = OnceCell::new();

/// Construction-time options: where source/cache data lives and whether a
/// network fetch is permitted when the data directory is empty.
#[derive(Debug, Clone, Default)]
pub struct GeoCoderOptions {
    pub data_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub allow_fetch: bool,
}

impl GeoCoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn allow_fetch(mut self, allow: bool) -> Self {
        self.allow_fetch = allow;
        self
    }
}

/// A single resolved city, or the empty sentinel when nothing qualified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityMatch {
    pub name: Option<String>,
    pub country_iso2: Option<String>,
    pub admin1_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub population: Option<u64>,
}

impl CityMatch {
    /// The empty record returned instead of `None`/`Err` when no city
    /// qualifies. Every field is absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Aggregate corpus counts, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct CorpusStats {
    pub cities: usize,
    pub countries: usize,
    pub admin_divisions: usize,
}

pub struct GeoCoder {
    corpus: GeoCorpus,
    us_states: UsStateTables,
}

impl GeoCoder {
    /// Builds (or loads from cache) a corpus and wraps it in a facade.
    /// Returns `Err` only for genuine I/O/parse failures; never panics.
    pub fn create(options: GeoCoderOptions) -> Result<Self> {
        let corpus = loader::load_or_build(&options)?;
        let us_states = UsStateTables::build(&corpus);
        Ok(GeoCoder { corpus, us_states })
    }

    /// The process-wide singleton, built once from default options on first
    /// call and shared by every subsequent caller.
    pub fn load() -> Result<&'static GeoCoder> {
        SINGLETON.get_or_try_init(|| GeoCoder::create(GeoCoderOptions::default()))
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            cities: self.corpus.cities.len(),
            countries: self.corpus.countries.len(),
            admin_divisions: self.corpus.admin_divisions.len(),
        }
    }

    /// Forward geocoding: free text -> best-matching city, or the empty
    /// sentinel. Never panics, regardless of `query`'s content.
    pub fn geocode(&self, query: &str, options: &ForwardOptions) -> CityMatch {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return CityMatch::empty();
        }
        let extracted = qualifiers::extract(&normalized, &self.corpus, &self.us_states);
        match scorer::best_match(&self.corpus, &normalized, &extracted, options) {
            Some(idx) => self.to_city_match(idx),
            None => CityMatch::empty(),
        }
    }

    /// Reverse geocoding: `(lat, lng)` -> nearest qualifying city, or the
    /// empty sentinel. Never panics, including for NaN or out-of-range
    /// coordinates (they simply fail to match anything).
    pub fn reverse_geocode(&self, lat: f64, lng: f64) -> CityMatch {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return CityMatch::empty();
        }
        match reverse::resolve(&self.corpus, lat, lng) {
            Some(idx) => self.to_city_match(idx),
            None => CityMatch::empty(),
        }
    }

    pub fn city_country<'a>(&self, m: &'a CityMatch) -> Option<&'a str> {
        m.country_iso2.as_deref()
    }

    pub fn city_region<'a>(&self, m: &'a CityMatch) -> Option<&'a str> {
        m.admin1_code.as_deref()
    }

    fn to_city_match(&self, idx: u32) -> CityMatch {
        let city = &self.corpus.cities[idx as usize];
        CityMatch {
            name: Some(self.corpus.city_name(city).to_string()),
            country_iso2: self.corpus.city_country_iso2(city).map(str::to_string),
            admin1_code: self.corpus.city_admin1_code(city).map(str::to_string),
            lat: Some(city.lat),
            lng: Some(city.lng),
            population: Some(city.population),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawCity, RawCountry};

    fn coder() -> GeoCoder {
        let cities = vec![
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
                name: "Berlin".into(),
                alt_names: vec![],
                lat: 52.5200,
                lng: 13.4050,
                country_iso2: "DE".into(),
                admin1_code: "".into(),
                population: 3_645_000,
            },
        ];
        let countries = vec![
            RawCountry { iso2: "IN".into(), name: "India".into() },
            RawCountry { iso2: "DE".into(), name: "Germany".into() },
        ];
        let corpus = GeoCorpus::build(cities, countries, vec![]);
        let us_states = UsStateTables::build(&corpus);
        GeoCoder { corpus, us_states }
    }

    #[test]
    fn geocode_resolves_alias() {
        let coder = coder();
        let m = coder.geocode("Bombay", &ForwardOptions::default());
        assert_eq!(m.name.as_deref(), Some("Mumbai"));
        assert_eq!(coder.city_country(&m), Some("IN"));
    }

    #[test]
    fn geocode_never_panics_on_garbage_input() {
        let coder = coder();
        for q in ["", ",,,", "\u{0}", "a".repeat(10_000).as_str()] {
            let _ = coder.geocode(q, &ForwardOptions::default());
        }
    }

    #[test]
    fn unmatched_query_returns_empty_sentinel() {
        let coder = coder();
        let m = coder.geocode("Nonexistentopolis", &ForwardOptions::default());
        assert!(m.is_empty());
    }

    #[test]
    fn reverse_geocode_never_panics_on_nan_or_extremes() {
        let coder = coder();
        assert!(coder.reverse_geocode(f64::NAN, 0.0).is_empty());
        assert!(coder.reverse_geocode(0.0, f64::INFINITY).is_empty());
        assert!(coder.reverse_geocode(999.0, -999.0).is_empty());
    }

    #[test]
    fn reverse_geocode_finds_nearby_city() {
        let coder = coder();
        let m = coder.reverse_geocode(52.5, 13.4);
        assert_eq!(m.name.as_deref(), Some("Berlin"));
    }
}
