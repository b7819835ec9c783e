//! Binary cache: `bincode`-serialized [`GeoCorpus`], optionally gzip-wrapped
//! under the `compact` feature, keyed by source-file freshness. Mirrors the
//! bincode + flate2 + mtime-freshness pattern this crate's loader lineage
//! already used for its own cache file.

use crate::error::Result;
use crate::model::GeoCorpus;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// True if `cache_file` exists and is newer than every file in `sources`
/// that itself exists.
pub fn is_fresh(cache_file: &Path, sources: &[&Path]) -> bool {
    let cache_mtime = match std::fs::metadata(cache_file).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    sources.iter().all(|src| match std::fs::metadata(src).and_then(|m| m.modified()) {
        Ok(src_mtime) => src_mtime <= cache_mtime,
        Err(_) => true, // a missing source can't make the cache stale
    })
}

pub fn read(path: &Path) -> Result<GeoCorpus> {
    let file = BufReader::new(File::open(path)?);
    #[cfg(feature = "compact")]
    let corpus = bincode::deserialize_from(flate2::read::GzDecoder::new(file))?;
    #[cfg(not(feature = "compact"))]
    let corpus = bincode::deserialize_from(file)?;
    Ok(corpus)
}

pub fn write(path: &Path, corpus: &GeoCorpus) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    #[cfg(feature = "compact")]
    {
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        bincode::serialize_into(&mut encoder, corpus)?;
        encoder.finish()?;
    }
    #[cfg(not(feature = "compact"))]
    {
        bincode::serialize_into(file, corpus)?;
    }
    Ok(())
}
