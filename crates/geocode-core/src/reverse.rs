//! C7 — Reverse Resolver.
//!
//! Given `(lat, lng)`, searches the cell index's neighborhood and picks the
//! nearest qualifying city, subject to a hard distance cutoff and a
//! population-aware neighborhood-override rule. See `SPEC_FULL.md` §4.6.

use crate::model::{CellIndex, GeoCorpus, CELL_INDEX_LEVEL};
use crate::s2::{angular_distance, cell_from_lat_lng};
use std::collections::HashSet;

/// ~100km. Candidates farther than this are never returned.
pub const HARD_CUTOFF_RADIANS: f64 = 0.0157;

/// ~10km. Radius within which a much larger city can override the
/// strictly-nearest candidate.
const OVERRIDE_RADIUS_RADIANS: f64 = 0.00157;

const OVERRIDE_POPULATION_THRESHOLD: u64 = 500_000;
const OVERRIDE_POPULATION_RATIO: u64 = 10;

struct Candidate {
    index: u32,
    distance: f64,
    population: u64,
}

/// Collects the 13-cell neighborhood (center + 4 edge neighbors + each of
/// those neighbors' own edge neighbors, deduplicated) around `(lat, lng)`
/// and returns the best surviving candidate's record index, if any.
///
/// `lat_deg`/`lng_deg` outside `[-90,90]`/`[-180,180]` (or non-finite)
/// return `None` immediately rather than aliasing onto a real point via
/// trig periodicity.
pub fn resolve(corpus: &GeoCorpus, lat_deg: f64, lng_deg: f64) -> Option<u32> {
    if !lat_deg.is_finite() || !lng_deg.is_finite() || lat_deg.abs() > 90.0 || lng_deg.abs() > 180.0 {
        return None;
    }
    let lat = lat_deg.to_radians();
    let lng = lng_deg.to_radians();
    let center = cell_from_lat_lng(lat, lng).parent_at_level(CELL_INDEX_LEVEL);

    let mut cells = HashSet::new();
    cells.insert(center);
    for n in center.edge_neighbors() {
        cells.insert(n);
    }
    let first_ring: Vec<_> = cells.iter().copied().collect();
    for cell in first_ring {
        for n in cell.edge_neighbors() {
            cells.insert(n);
        }
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen_city = HashSet::new();
    for cell in &cells {
        if let Some(indices) = lookup_bucket(&corpus.cell_index, cell.0) {
            for &idx in indices {
                if !seen_city.insert(idx) {
                    continue;
                }
                let city = &corpus.cities[idx as usize];
                let distance = angular_distance(lat, lng, city.lat.to_radians(), city.lng.to_radians());
                if distance <= HARD_CUTOFF_RADIANS {
                    candidates.push(Candidate {
                        index: idx,
                        distance,
                        population: city.population,
                    });
                }
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let nearest = candidates
        .iter()
        .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap())
        .unwrap();

    if nearest.population >= OVERRIDE_POPULATION_THRESHOLD {
        return Some(nearest.index);
    }

    let override_candidate = candidates
        .iter()
        .filter(|c| c.distance <= OVERRIDE_RADIUS_RADIANS)
        .filter(|c| c.population >= nearest.population.saturating_mul(OVERRIDE_POPULATION_RATIO))
        .max_by_key(|c| c.population);

    match override_candidate {
        Some(winner) => Some(winner.index),
        None => Some(nearest.index),
    }
}

fn lookup_bucket(index: &CellIndex, key: u64) -> Option<&Vec<u32>> {
    index.get(&key)
}
