use clap::{Parser, Subcommand};

/// CLI arguments for geocode-cli
#[derive(Debug, Parser)]
#[command(
    name = "geocode",
    version,
    about = "CLI for querying the geocode-core offline geocoding engine"
)]
pub struct CliArgs {
    /// Directory holding GeoNames source files / the binary cache
    /// (default: ./data)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Allow downloading missing GeoNames source files
    #[arg(long = "allow-fetch", global = true)]
    pub allow_fetch: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the loaded corpus
    Stats,

    /// Forward geocode: free text -> best-matching city
    Geocode {
        /// Free-text query, e.g. "Paris, TX" or "Bombay"
        query: String,

        /// Only accept exact name matches (disables fuzzy fallback)
        #[arg(long)]
        exact: bool,

        /// Maximum Levenshtein distance for fuzzy matching (0 disables it)
        #[arg(long = "fuzzy-distance", default_value_t = 0)]
        fuzzy_distance: u32,
    },

    /// Reverse geocode: (lat, lng) -> nearest qualifying city
    Reverse {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },

    /// Parse GeoNames source files and write the binary cache
    Build,
}
