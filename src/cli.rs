//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the rowspacing application.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Site latitude in decimal degrees (-90 to 90)
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = parse_latitude,
        env = "ROWSPACING_LATITUDE",
        required_unless_present_any = ["city", "search_city", "show_build_info"],
        conflicts_with = "city"
    )]
    pub latitude: Option<f64>,

    /// Take the latitude from the built-in city table (e.g. "Madrid")
    #[arg(long, env = "ROWSPACING_CITY")]
    pub city: Option<String>,

    /// List cities whose name contains QUERY and exit
    #[arg(long, value_name = "QUERY")]
    pub search_city: Option<String>,

    /// Panel tilt angle in degrees (0 = flat/horizontal, 90 = vertical)
    #[arg(long, default_value_t = 20.0, value_parser = parse_tilt, env = "ROWSPACING_TILT")]
    pub tilt: f64,

    /// Panel length along its slope in meters
    #[arg(long, default_value_t = 1.7, value_parser = parse_length, env = "ROWSPACING_LENGTH")]
    pub length: f64,

    /// Write the spacing diagram as a PNG file
    #[arg(long, short, env = "ROWSPACING_OUTPUT", conflicts_with = "no_diagram")]
    pub output: Option<PathBuf>,

    /// Print the diagram as base64-encoded PNG
    #[arg(long, conflicts_with = "no_diagram")]
    pub base64: bool,

    /// Print the diagram as a `data:image/png;base64,...` URI
    #[arg(long, conflicts_with_all = ["no_diagram", "base64"])]
    pub data_uri: bool,

    /// Skip diagram rendering
    #[arg(long)]
    pub no_diagram: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, default_value = "warn", value_parser = ["trace", "debug", "info", "warn", "error"], env = "ROWSPACING_LOG")]
    pub log_level: String,

    /// Show build info from Cargo.lock at time of building
    #[arg(long)]
    pub show_build_info: bool,
}

impl Args {
    /// True when a diagram is requested in any form.
    pub fn wants_diagram(&self) -> bool {
        !self.no_diagram && (self.output.is_some() || self.base64 || self.data_uri)
    }
}

// Define the structure to match what we serialized in build.rs
#[derive(Debug, Deserialize)]
pub struct DepInfo {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub source: Option<String>,
}

// ===================== CLI VALUE PARSERS =====================

fn parse_number(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !v.is_finite() {
        return Err(format!("Value must be finite, got {}", s));
    }
    Ok(v)
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(-90.0..=90.0).contains(&v) {
        return Err(format!("Latitude must be between -90 and 90, got {}", v));
    }
    Ok(v)
}

fn parse_tilt(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if !(0.0..=90.0).contains(&v) {
        return Err(format!("Tilt must be between 0 and 90 degrees, got {}", v));
    }
    Ok(v)
}

fn parse_length(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if v <= 0.0 {
        return Err(format!("Length must be greater than 0, got {}", v));
    }
    Ok(v)
}
