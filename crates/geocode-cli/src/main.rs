//! geocode-cli — Command-line interface for geocode-core
//!
//! Usage examples
//! --------------
//! - Show stats:       `geocode-cli stats`
//! - Forward geocode:  `geocode-cli geocode "Paris, TX"`
//! - Reverse geocode:  `geocode-cli reverse 52.52 13.40`
//! - Build the cache:  `geocode-cli build`

mod args;

use crate::args::{CliArgs, Commands};
use clap::Parser;
use geocode_core::{GeoCoder, GeoCoderOptions, ForwardOptions};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut options = GeoCoderOptions::new().allow_fetch(args.allow_fetch);
    if let Some(dir) = args.data_dir {
        options = options.data_dir(dir);
    }

    let coder = GeoCoder::create(options)?;

    match args.command {
        Commands::Stats => {
            let stats = coder.stats();
            println!("Corpus statistics:");
            println!("  Countries:       {}", stats.countries);
            println!("  Admin divisions: {}", stats.admin_divisions);
            println!("  Cities:          {}", stats.cities);
        }

        Commands::Geocode { query, exact, fuzzy_distance } => {
            let forward_options = ForwardOptions { exact_city: exact, fuzzy_distance };
            let m = coder.geocode(&query, &forward_options);
            if m.is_empty() {
                println!("No match found for: {query}");
            } else {
                println!(
                    "{} ({}, {})",
                    m.name.as_deref().unwrap_or(""),
                    m.country_iso2.as_deref().unwrap_or("?"),
                    m.admin1_code.as_deref().unwrap_or("")
                );
                println!("  lat/lng:    {:.4}, {:.4}", m.lat.unwrap_or(0.0), m.lng.unwrap_or(0.0));
                println!("  population: {}", m.population.unwrap_or(0));
            }
        }

        Commands::Reverse { lat, lng } => {
            let m = coder.reverse_geocode(lat, lng);
            if m.is_empty() {
                println!("No city found near ({lat}, {lng})");
            } else {
                println!(
                    "{} ({}, {})",
                    m.name.as_deref().unwrap_or(""),
                    m.country_iso2.as_deref().unwrap_or("?"),
                    m.admin1_code.as_deref().unwrap_or("")
                );
            }
        }

        Commands::Build => {
            println!("=== geocode-core builder ===");
            let start = std::time::Instant::now();
            let stats = coder.stats();
            let duration = start.elapsed();
            println!("Corpus ready in {duration:.2?}");
            println!("  Countries:       {}", stats.countries);
            println!("  Admin divisions: {}", stats.admin_divisions);
            println!("  Cities:          {}", stats.cities);
            println!("(binary cache is written automatically during load)");
        }
    }

    Ok(())
}
