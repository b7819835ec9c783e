//! Loader: turns GeoNames-shaped source files into a [`GeoCorpus`], with a
//! binary cache in front so repeated process starts skip re-parsing.

mod cache;
#[cfg(feature = "fetch")]
mod fetch;
pub mod geonames;

use crate::error::{GeoError, Result};
use crate::facade::GeoCoderOptions;
use crate::model::GeoCorpus;
use std::path::{Path, PathBuf};

const CITIES_FILE: &str = "cities1000.txt";
const COUNTRY_FILE: &str = "countryInfo.txt";
const ADMIN1_FILE: &str = "admin1CodesASCII.txt";

/// Below this, a corpus is treated as truncated or corrupt rather than a
/// real GeoNames export.
const MIN_CITY_COUNT: usize = 140_000;
const MIN_COUNTRY_COUNT: usize = 200;

fn validate_corpus(corpus: GeoCorpus) -> Result<GeoCorpus> {
    if corpus.cities.len() < MIN_CITY_COUNT {
        return Err(GeoError::Validation(format!(
            "expected at least {MIN_CITY_COUNT} cities, got {}",
            corpus.cities.len()
        )));
    }
    if corpus.countries.len() < MIN_COUNTRY_COUNT {
        return Err(GeoError::Validation(format!(
            "expected at least {MIN_COUNTRY_COUNT} countries, got {}",
            corpus.countries.len()
        )));
    }
    Ok(corpus)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn cache_path(data_dir: &Path) -> PathBuf {
    let suffix = if cfg!(feature = "compact") { "bin.gz" } else { "bin" };
    data_dir.join(format!("geocode.corpus.{suffix}"))
}

/// Loads a corpus for `options`: a fresh cache file wins, otherwise the
/// GeoNames sources are parsed (fetching them first if permitted and
/// missing), and the result is cached back best-effort.
pub fn load_or_build(options: &GeoCoderOptions) -> Result<GeoCorpus> {
    let data_dir = options.data_dir.clone().unwrap_or_else(default_data_dir);
    let cache_dir = options.cache_dir.clone().unwrap_or_else(|| data_dir.clone());
    let cache_file = cache_path(&cache_dir);

    let cities_path = data_dir.join(CITIES_FILE);
    let country_path = data_dir.join(COUNTRY_FILE);
    let admin_path = data_dir.join(ADMIN1_FILE);

    if cache::is_fresh(&cache_file, &[&cities_path, &country_path, &admin_path]) {
        match cache::read(&cache_file) {
            Ok(corpus) => return validate_corpus(corpus),
            Err(err) => {
                eprintln!("geocode-core: ignoring stale/unreadable cache {cache_file:?}: {err}");
            }
        }
    }

    if !cities_path.exists() || !country_path.exists() || !admin_path.exists() {
        #[cfg(feature = "fetch")]
        if options.allow_fetch {
            fetch::fetch_sources(&data_dir)?;
        }
        #[cfg(not(feature = "fetch"))]
        if options.allow_fetch {
            return Err(crate::error::GeoError::Fetch(
                "the `fetch` feature is disabled in this build".to_string(),
            ));
        }
    }

    if !cities_path.exists() {
        return Err(crate::error::GeoError::NoDataDir);
    }

    let cities = geonames::parse_cities(&cities_path)?;
    let countries = geonames::parse_countries(&country_path)?;
    let admin = geonames::parse_admin1(&admin_path)?;
    let corpus = GeoCorpus::build(cities, countries, admin);
    let corpus = validate_corpus(corpus)?;

    if let Err(err) = cache::write(&cache_file, &corpus) {
        eprintln!("geocode-core: failed to write cache {cache_file:?}: {err} (continuing)");
    }

    Ok(corpus)
}
