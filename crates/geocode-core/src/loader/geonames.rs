//! Parses the three GeoNames source files this crate's corpus is built
//! from. Field layouts follow the public GeoNames export format; tab-split
//! parsing via the `csv` crate is grounded in how `geosuggest-core` reads
//! the same files.

use crate::error::{GeoError, Result};
use crate::model::{RawAdmin, RawCity, RawCountry};
use crate::text::split_alt_names;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[cfg(feature = "compact")]
fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(flate2::read::GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

#[cfg(not(feature = "compact"))]
fn open(path: &Path) -> Result<Box<dyn Read>> {
    Ok(Box::new(BufReader::new(File::open(path)?)))
}

fn reader(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(open(path)?))
}

/// `cities1000.txt`: 19 tab-separated columns. Fields used: name (1),
/// alternatenames (3), latitude (4), longitude (5), country code (8),
/// admin1 code (10), population (14).
///
/// A malformed row (wrong column count, non-numeric lat/lng) or one with an
/// empty city name is dropped rather than aborting the whole parse — a
/// single bad line in a multi-million-row export shouldn't take down the
/// corpus build.
pub fn parse_cities(path: &Path) -> Result<Vec<RawCity>> {
    let mut out = Vec::new();
    let mut rdr = reader(path)?;
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => continue,
        };
        if record.len() != 19 {
            continue;
        }
        let name = record.get(1).unwrap_or_default().to_string();
        if name.is_empty() {
            continue;
        }
        let lat: f64 = match record.get(4).unwrap_or_default().parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let lng: f64 = match record.get(5).unwrap_or_default().parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let alt_names = split_alt_names(record.get(3).unwrap_or_default());
        let country_iso2 = record.get(8).unwrap_or_default().to_string();
        let admin1_code = record.get(10).unwrap_or_default().to_string();
        let population: u64 = record.get(14).unwrap_or_default().parse().unwrap_or(0);

        out.push(RawCity {
            name,
            alt_names,
            lat,
            lng,
            country_iso2,
            admin1_code,
            population,
        });
    }
    Ok(out)
}

/// `countryInfo.txt`: tab-separated, `#`-prefixed lines are comments.
/// Fields used: ISO (0), Country name (4).
pub fn parse_countries(path: &Path) -> Result<Vec<RawCountry>> {
    let raw = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 5 {
            return Err(GeoError::Parse {
                line: line_no + 1,
                reason: format!("expected at least 5 columns, got {}", cols.len()),
            });
        }
        out.push(RawCountry {
            iso2: cols[0].to_string(),
            name: cols[4].to_string(),
        });
    }
    Ok(out)
}

/// `admin1CodesASCII.txt`: tab-separated; first column is
/// `"<ISO2>.<code>"`, second is the admin1 name.
pub fn parse_admin1(path: &Path) -> Result<Vec<RawAdmin>> {
    let raw = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.split('\t');
        let key = cols.next().unwrap_or_default();
        let name = cols.next().unwrap_or_default().to_string();
        let (country_iso2, code) = key.split_once('.').ok_or_else(|| GeoError::Parse {
            line: line_no + 1,
            reason: format!("expected \"<ISO2>.<code>\", got {key:?}"),
        })?;
        out.push(RawAdmin {
            country_iso2: country_iso2.to_string(),
            code: code.to_string(),
            name,
        });
    }
    Ok(out)
}
