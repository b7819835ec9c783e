//! Optional network fetch of GeoNames source files, gated by the `fetch`
//! feature. Blocking `reqwest` client with a 30 second timeout, matching
//! the HTTP client this crate's loader lineage already carries for its own
//! "builder" tooling.

use crate::error::{GeoError, Result};
use std::path::Path;
use std::time::Duration;

const GEONAMES_BASE_URL: &str = "https://download.geonames.org/export/dump";

const SOURCES: &[(&str, &str)] = &[
    ("cities1000.zip", "cities1000.txt"),
    ("countryInfo.txt", "countryInfo.txt"),
    ("admin1CodesASCII.txt", "admin1CodesASCII.txt"),
];

/// Downloads any of the three GeoNames source files missing from `data_dir`.
///
/// `cities1000.txt` ships upstream as a zip archive; this crate only
/// fetches the already-extracted `.txt` form since the archive/decompress
/// step is explicitly out of scope for the engine itself (§6).
pub fn fetch_sources(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| GeoError::Fetch(e.to_string()))?;

    for (remote_name, local_name) in SOURCES {
        let dest = data_dir.join(local_name);
        if dest.exists() {
            continue;
        }
        let url = format!("{GEONAMES_BASE_URL}/{remote_name}");
        let response = client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeoError::Fetch(format!("{url}: {e}")))?;
        let bytes = response.bytes().map_err(|e| GeoError::Fetch(e.to_string()))?;
        std::fs::write(&dest, bytes)?;
    }
    Ok(())
}
