// crates/geocode-core/src/lib.rs

pub mod error;
pub mod facade;
pub mod interner;
pub mod loader;
pub mod model;
pub mod qualifiers;
pub mod reverse;
pub mod s2;
pub mod scorer;
pub mod text;

pub use crate::error::{GeoError, Result};
pub use crate::facade::{CityMatch, CorpusStats, GeoCoder, GeoCoderOptions};
pub use crate::model::GeoCorpus;
pub use crate::scorer::ForwardOptions;
pub use crate::text::{fold_key, lower_key};
