//! CLI argument definitions for geokit.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `geocode` | Resolve an address or place name to coordinates |
//! | `reverse` | Resolve a coordinate to nearby addresses |
//! | `providers` | List providers and whether they are configured |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging on stderr |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//!
//! Provider credentials are global options backed by `GEOKIT_*` environment
//! variables, see [`CredentialArgs`].
//!
//! # Examples
//!
//! ```bash
//! GEOKIT_GOOGLE_KEY=... geokit geocode "1600 Amphitheatre Pkwy" --provider google
//! geokit reverse 51.5034 -0.1276 --provider here --pretty
//! geokit providers
//! ```

use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use geokit_core::ProviderId;

use crate::config::CredentialArgs;

/// Provider-neutral geocoding CLI.
#[derive(Debug, Parser)]
#[command(
    name = "geokit",
    author,
    version,
    about = "Provider-neutral geocoding CLI",
    long_about = "geokit resolves addresses to coordinates and back through ArcGIS, Bing, \
Google, HERE, MapBox, MapQuest, Positionstack or Radar, and prints the normalized \
results as JSON.\n\
\n\
Use 'geokit <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log requests and token refreshes to stderr.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000, env = "GEOKIT_TIMEOUT_MS")]
    pub timeout_ms: u64,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve free-form text into candidate places.
    ///
    /// # Examples
    ///
    ///   geokit geocode "10 Downing St, London" --provider here
    ///   geokit geocode Springfield --provider mapbox --country us --limit 10
    Geocode(GeocodeArgs),

    /// Resolve a latitude/longitude pair into addresses.
    ///
    /// # Examples
    ///
    ///   geokit reverse 40.7039 -73.9867 --provider radar
    Reverse(ReverseArgs),

    /// List supported providers and whether credentials are configured.
    Providers,
}

#[derive(Debug, Args)]
pub struct GeocodeArgs {
    /// Address or place name.
    pub query: String,

    /// Provider to query.
    #[arg(long, short = 'p', value_parser = ProviderId::from_str)]
    pub provider: ProviderId,

    /// Maximum number of places to return.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,

    /// Restrict results to a country (ISO 3166 alpha-2 or alpha-3). Repeatable.
    #[arg(long = "country")]
    pub countries: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ReverseArgs {
    /// Latitude in degrees.
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in degrees.
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,

    /// Provider to query.
    #[arg(long, short = 'p', value_parser = ProviderId::from_str)]
    pub provider: ProviderId,

    /// Maximum number of places to return.
    #[arg(long, default_value_t = 1)]
    pub limit: usize,
}
