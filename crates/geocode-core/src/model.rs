//! The data model: interned records plus the two indexes built over them.

use crate::interner::StringInterner;
use crate::s2::{cell_from_lat_lng, CellId};
use crate::text::lower_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The level at which [`CellIndex`] buckets cities. Coarse enough that a
/// 13-cell neighborhood search (§4.6) covers a useful radius, fine enough
/// that any one bucket stays small.
pub const CELL_INDEX_LEVEL: u8 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: u32,
    pub alt_names: Vec<u32>,
    pub country_iso2: Option<u32>,
    pub admin1_code: Option<u32>,
    pub lat: f64,
    pub lng: f64,
    pub population: u64,
    pub cell_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryInfo {
    pub iso2: u32,
    pub name: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDivision {
    pub country_iso2: u32,
    pub code: u32,
    pub name: u32,
}

/// Inverted index: folded (lowercased-only, I2) name -> city record indices.
pub type NameIndex = HashMap<String, Vec<u32>>;

/// Inverted index: level-[`CELL_INDEX_LEVEL`] S2 cell id -> city record indices.
pub type CellIndex = HashMap<u64, Vec<u32>>;

/// A fully-built, read-only corpus (I4). Constructed once via [`GeoCorpus::build`]
/// or deserialized from a cache file.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeoCorpus {
    pub interner: StringInterner,
    pub cities: Vec<CityRecord>,
    pub countries: Vec<CountryInfo>,
    pub admin_divisions: Vec<AdminDivision>,
    pub name_index: NameIndex,
    pub cell_index: CellIndex,
}

/// One parsed `cities1000.txt` row, prior to interning.
pub struct RawCity {
    pub name: String,
    pub alt_names: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub country_iso2: String,
    pub admin1_code: String,
    pub population: u64,
}

/// One parsed `countryInfo.txt` row.
pub struct RawCountry {
    pub iso2: String,
    pub name: String,
}

/// One parsed `admin1CodesASCII.txt` row: `key` is the `"<ISO2>.<code>"`
/// first column, already split by the loader.
pub struct RawAdmin {
    pub country_iso2: String,
    pub code: String,
    pub name: String,
}

impl GeoCorpus {
    /// Builds a corpus from parsed GeoNames rows, interning every string
    /// exactly once and building both indexes.
    pub fn build(cities: Vec<RawCity>, countries: Vec<RawCountry>, admin: Vec<RawAdmin>) -> Self {
        let mut interner = StringInterner::new();

        let countries: Vec<CountryInfo> = countries
            .into_iter()
            .map(|c| CountryInfo {
                iso2: interner.intern(&c.iso2.to_uppercase()),
                name: interner.intern(&c.name),
            })
            .collect();

        let admin_divisions: Vec<AdminDivision> = admin
            .into_iter()
            .map(|a| AdminDivision {
                country_iso2: interner.intern(&a.country_iso2.to_uppercase()),
                code: interner.intern(&a.code),
                name: interner.intern(&a.name),
            })
            .collect();

        let mut cities = cities;
        cities.sort_by(|a, b| lower_key(&a.name).cmp(&lower_key(&b.name)));

        let mut records = Vec::with_capacity(cities.len());
        let mut name_index: NameIndex = NameIndex::new();
        let mut cell_index: CellIndex = CellIndex::new();

        for raw in cities {
            let name_id = interner.intern(&raw.name);
            let alt_ids: Vec<u32> = raw.alt_names.iter().map(|a| interner.intern(a)).collect();
            let country_iso2 = if raw.country_iso2.is_empty() {
                None
            } else {
                Some(interner.intern(&raw.country_iso2.to_uppercase()))
            };
            let admin1_code = if raw.admin1_code.is_empty() {
                None
            } else {
                Some(interner.intern(&raw.admin1_code))
            };
            let lat_rad = raw.lat.to_radians();
            let lng_rad = raw.lng.to_radians();
            let cell_id = cell_from_lat_lng(lat_rad, lng_rad);

            let record_idx = records.len() as u32;
            name_index
                .entry(lower_key(&raw.name))
                .or_default()
                .push(record_idx);
            for alt in &raw.alt_names {
                name_index.entry(lower_key(alt)).or_default().push(record_idx);
            }
            let bucket = cell_id.parent_at_level(CELL_INDEX_LEVEL).0;
            cell_index.entry(bucket).or_default().push(record_idx);

            records.push(CityRecord {
                name: name_id,
                alt_names: alt_ids,
                country_iso2,
                admin1_code,
                lat: raw.lat,
                lng: raw.lng,
                population: raw.population,
                cell_id: cell_id.0,
            });
        }

        GeoCorpus {
            interner,
            cities: records,
            countries,
            admin_divisions,
            name_index,
            cell_index,
        }
    }

    pub fn city_name(&self, city: &CityRecord) -> &str {
        self.interner.get(city.name)
    }

    pub fn city_country_iso2(&self, city: &CityRecord) -> Option<&str> {
        city.country_iso2.map(|id| self.interner.get(id))
    }

    pub fn city_admin1_code(&self, city: &CityRecord) -> Option<&str> {
        city.admin1_code.map(|id| self.interner.get(id))
    }

    pub fn country_name(&self, country: &CountryInfo) -> &str {
        self.interner.get(country.name)
    }

    pub fn find_country(&self, iso2: &str) -> Option<&CountryInfo> {
        self.countries
            .iter()
            .find(|c| self.interner.get(c.iso2).eq_ignore_ascii_case(iso2))
    }

    pub fn find_admin_division(&self, country_iso2: &str, code: &str) -> Option<&AdminDivision> {
        self.admin_divisions.iter().find(|a| {
            self.interner.get(a.country_iso2).eq_ignore_ascii_case(country_iso2)
                && self.interner.get(a.code).eq_ignore_ascii_case(code)
        })
    }

    /// `CellId` for a city record, at its stored leaf resolution.
    pub fn city_cell(city: &CityRecord) -> CellId {
        CellId(city.cell_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> GeoCorpus {
        let cities = vec![
            RawCity {
                name: "Berlin".into(),
                alt_names: vec!["Berlin".into()],
                lat: 52.52,
                lng: 13.405,
                country_iso2: "DE".into(),
                admin1_code: "16".into(),
                population: 3_645_000,
            },
            RawCity {
                name: "Paris".into(),
                alt_names: vec![],
                lat: 48.8566,
                lng: 2.3522,
                country_iso2: "FR".into(),
                admin1_code: "".into(),
                population: 2_161_000,
            },
        ];
        let countries = vec![
            RawCountry { iso2: "DE".into(), name: "Germany".into() },
            RawCountry { iso2: "FR".into(), name: "France".into() },
        ];
        GeoCorpus::build(cities, countries, vec![])
    }

    #[test]
    fn cities_are_sorted_case_insensitive_by_name() {
        let cities = vec![
            RawCity {
                name: "zurich".into(),
                alt_names: vec![],
                lat: 47.37,
                lng: 8.54,
                country_iso2: "CH".into(),
                admin1_code: "".into(),
                population: 400_000,
            },
            RawCity {
                name: "Amsterdam".into(),
                alt_names: vec![],
                lat: 52.37,
                lng: 4.90,
                country_iso2: "NL".into(),
                admin1_code: "".into(),
                population: 800_000,
            },
        ];
        let corpus = GeoCorpus::build(cities, vec![], vec![]);
        assert_eq!(corpus.city_name(&corpus.cities[0]), "Amsterdam");
        assert_eq!(corpus.city_name(&corpus.cities[1]), "zurich");
    }

    #[test]
    fn name_index_keys_are_plain_lowercase() {
        let corpus = fixture();
        for key in corpus.name_index.keys() {
            assert_eq!(key, &key.to_lowercase());
        }
        assert!(corpus.name_index.contains_key("berlin"));
    }

    #[test]
    fn cell_index_keys_are_level_10() {
        let corpus = fixture();
        for &key in corpus.cell_index.keys() {
            assert_eq!(CellId(key).level(), CELL_INDEX_LEVEL);
        }
    }

    #[test]
    fn every_interned_id_resolves() {
        let corpus = fixture();
        for city in &corpus.cities {
            let _ = corpus.city_name(city);
            let _ = corpus.city_country_iso2(city);
        }
        for country in &corpus.countries {
            let _ = corpus.country_name(country);
        }
    }
}
