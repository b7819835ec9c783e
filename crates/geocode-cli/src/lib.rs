//! geocode-cli
//! ===========
//!
//! Command-line interface for the `geocode-core` offline geocoding engine.
//!
//! This crate primarily provides a binary (`geocode-cli`). We include a small
//! library target so that docs.rs renders a documentation page and shows this
//! overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! geocode-cli --help
//! geocode-cli stats
//! geocode-cli geocode "Bombay"
//! geocode-cli reverse 52.52 13.40
//! geocode-cli build
//! ```
//!
//! For programmatic access to the geocoding engine, use the `geocode-core`
//! crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]

// This library target intentionally exposes no API; the binary is the primary
// deliverable. The presence of this file enables a rendered page on docs.rs.
