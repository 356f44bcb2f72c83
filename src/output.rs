//! Output Formatting Module
//!
//! Provides terminal and JSON output for spacing results, city searches and
//! build info.

use serde::Serialize;

use crate::cities::City;
use crate::cli::DepInfo;
use crate::spacing::{CalculationResult, RECOMMENDED_MARGIN, round_to};

/// Decimals shown for every reported value
const DISPLAY_DECIMALS: i32 = 3;

// ===================== TERMINAL OUTPUT =====================

/// Format the spacing report for a terminal.
///
/// # Arguments
/// * `result` - Validated calculation result
/// * `city` - City the latitude was taken from, if any
pub fn format_report(result: &CalculationResult, city: Option<&City>) -> String {
    let mut out = String::new();
    out.push_str("=== Row Spacing (Winter Solstice, December 21) ===\n");
    if let Some(c) = city {
        out.push_str(&format!("Site          : {}, {}\n", c.name, c.country));
    }
    out.push_str(&format!("Latitude      : {:8.3}°\n", result.input.latitude));
    out.push_str(&format!("Panel tilt    : {:8.3}°\n", result.input.tilt));
    out.push_str(&format!("Panel length  : {:8.3} m\n", result.input.length));
    out.push('\n');
    out.push_str(&format!("Declination   : {:8.3}°\n", result.declination));
    out.push_str(&format!("Solar altitude: {:8.3}° (noon)\n", result.solar_altitude));
    out.push_str(&format!("Min spacing   : {:8.3} m\n", result.min_spacing));
    out.push_str(&format!(
        "Recommended   : {:8.3} m (+{:.0}% margin)\n",
        result.recommended_spacing,
        (RECOMMENDED_MARGIN - 1.0) * 100.0
    ));
    out.push('\n');
    out.push_str("Tip: use the recommended spacing for an extra safety margin.\n");
    out
}

/// Print the spacing report to stdout.
pub fn print_report(result: &CalculationResult, city: Option<&City>) {
    print!("{}", format_report(result, city));
}

/// Format city search results, one per line.
pub fn format_city_matches(matches: &[&City]) -> String {
    if matches.is_empty() {
        return "No cities found\n".to_string();
    }
    matches
        .iter()
        .map(|c| format!("{}, {}  {:.3}°\n", c.name, c.country, c.latitude))
        .collect()
}

// ===================== JSON OUTPUT =====================

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<&'a City>,
    pub latitude: f64,
    pub tilt: f64,
    pub length: f64,
    pub declination: f64,
    pub solar_altitude: f64,
    pub min_spacing: f64,
    pub recommended_spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_error: Option<String>,
}

impl<'a> JsonReport<'a> {
    /// Build a report with values rounded for display.
    pub fn new(result: &CalculationResult, city: Option<&'a City>) -> Self {
        let r = |v: f64| round_to(v, DISPLAY_DECIMALS);
        Self {
            city,
            latitude: r(result.input.latitude),
            tilt: r(result.input.tilt),
            length: r(result.input.length),
            declination: r(result.declination),
            solar_altitude: r(result.solar_altitude),
            min_spacing: r(result.min_spacing),
            recommended_spacing: r(result.recommended_spacing),
            diagram_base64: None,
            diagram_data_uri: None,
            diagram_error: None,
        }
    }
}

/// JSON body reported when a calculation is rejected.
#[derive(Debug, Serialize)]
pub struct JsonRejection {
    pub error: String,
}

// ===================== BUILD INFO =====================

/// Print the git commit and locked dependency list embedded at build time.
pub fn print_build_info(git_hash: &str, deps: &[DepInfo]) {
    println!("Built from Git commit: {}\n", git_hash);
    println!("Found {} dependencies.", deps.len());
    for dep in deps {
        println!("- {} v{}", dep.name, dep.version);
        if let Some(sum) = &dep.checksum {
            println!("    Checksum: {}", sum);
        }
        if let Some(src) = &dep.source {
            println!("    Source:   {}", src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities;
    use crate::spacing::{CalculationInput, evaluate};

    fn reference() -> CalculationResult {
        evaluate(&CalculationInput::new(20.0, 20.0, 1.7).unwrap()).unwrap()
    }

    #[test]
    fn test_report_shows_rounded_values() {
        let text = format_report(&reference(), None);
        assert!(text.contains("Min spacing   :    2.148 m"), "{}", text);
        assert!(text.contains("Recommended   :    2.685 m (+25% margin)"), "{}", text);
        assert!(text.contains("Declination   :  -23.450°"), "{}", text);
        assert!(!text.contains("Site"));
    }

    #[test]
    fn test_report_names_city() {
        let madrid = cities::find("Madrid").unwrap();
        let result = evaluate(&CalculationInput::new(madrid.latitude, 30.0, 2.0).unwrap()).unwrap();
        let text = format_report(&result, Some(madrid));
        assert!(text.contains("Site          : Madrid, Spain"));
        assert!(text.contains("Latitude      :   40.416°"));
    }

    #[test]
    fn test_json_report_rounds() {
        let result = reference();
        let json = serde_json::to_value(JsonReport::new(&result, None)).unwrap();
        assert_eq!(json["min_spacing"], 2.148);
        assert_eq!(json["recommended_spacing"], 2.685);
        assert_eq!(json["solar_altitude"], 46.55);
        assert!(json.get("city").is_none());
        assert!(json.get("diagram_base64").is_none());
        assert!(json.get("diagram_data_uri").is_none());
    }

    #[test]
    fn test_json_report_embeds_data_uri() {
        let result = reference();
        let image = crate::diagram::render_result(&result).unwrap();
        let mut report = JsonReport::new(&result, None);
        report.diagram_data_uri = Some(image.to_data_uri());
        let json = serde_json::to_value(&report).unwrap();
        let uri = json["diagram_data_uri"].as_str().unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"), "{}", &uri[..40]);
        assert!(json.get("diagram_base64").is_none());
    }

    #[test]
    fn test_city_listing() {
        assert_eq!(format_city_matches(&[]), "No cities found\n");
        let listing = format_city_matches(&cities::search("lisb"));
        assert_eq!(listing, "Lisbon, Portugal  38.722°\n");
    }
}
