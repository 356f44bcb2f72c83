//! Row Spacing Calculations
//!
//! Computes the minimum distance between two rows of tilted solar panels so
//! that the front row does not shade the one behind it at solar noon on the
//! winter solstice (December 21).
//!
//! References:
//! - Cooper, P.I. (1969). "The absorption of radiation in solar stills"
//!   (declination approximation)

use serde::Serialize;

use crate::error::{Error, Result};

// ===================== CONSTANTS =====================

/// Day of year used for the calculation (December 21, northern winter solstice)
pub const SOLSTICE_DAY_OF_YEAR: u32 = 355;

/// Maximum solar declination in degrees (Earth's axial tilt in Cooper's formula)
const MAX_DECLINATION_DEG: f64 = 23.45;

/// Safety factor applied to the minimum spacing.
/// Heuristic margin, not derived from the solar geometry.
pub const RECOMMENDED_MARGIN: f64 = 1.25;

/// Noon altitudes at or below this value are treated as "sun on the horizon"
const MIN_SOLAR_ALTITUDE_DEG: f64 = 1e-9;

// ===================== INPUT =====================

/// Panel row parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationInput {
    /// Site latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Panel tilt from horizontal in degrees (0 = flat, 90 = vertical)
    pub tilt: f64,
    /// Physical length of the panel along its slope in meters
    pub length: f64,
}

impl CalculationInput {
    /// Build an input, rejecting values outside their physical domain.
    pub fn new(latitude: f64, tilt: f64, length: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::OutOfRange {
                name: "Latitude",
                expected: "between -90 and 90",
                value: latitude,
            });
        }
        if !(0.0..=90.0).contains(&tilt) {
            return Err(Error::OutOfRange {
                name: "Tilt",
                expected: "between 0 and 90 degrees",
                value: tilt,
            });
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::OutOfRange { name: "Length", expected: "positive", value: length });
        }
        Ok(Self { latitude, tilt, length })
    }
}

// ===================== RESULTS =====================

/// Raw output of the shadow formula, before any validity check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSpacing {
    /// Solar declination (degrees)
    pub declination: f64,
    /// Noon solar altitude (degrees)
    pub solar_altitude: f64,
    /// Minimum row spacing (meters); meaningless when `solar_altitude <= 0`
    pub min_spacing: f64,
}

/// Validated spacing result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationResult {
    pub input: CalculationInput,
    /// Solar declination (degrees)
    pub declination: f64,
    /// Noon solar altitude on the solstice (degrees)
    pub solar_altitude: f64,
    /// Minimum distance between row bases (meters)
    pub min_spacing: f64,
    /// Minimum distance with the safety margin applied (meters)
    pub recommended_spacing: f64,
}

// ===================== SOLAR GEOMETRY =====================

/// Solar declination for a day of the year (Cooper's approximation).
///
/// # Arguments
/// * `day_of_year` - Day of year (1-366)
///
/// # Returns
/// Declination in degrees (negative in the northern winter)
pub fn solar_declination(day_of_year: u32) -> f64 {
    let angle = 360.0 * (284.0 + day_of_year as f64) / 365.0;
    MAX_DECLINATION_DEG * angle.to_radians().sin()
}

/// Noon solar altitude for a latitude and declination, in degrees.
pub fn noon_solar_altitude(latitude: f64, declination: f64) -> f64 {
    90.0 - latitude + declination
}

/// Horizontal distance from a row's base to the tip of its noon shadow.
///
/// The top edge of the panel sits at `(length·cos tilt, length·sin tilt)`;
/// a ray at `solar_altitude` through it reaches the ground at
/// `length·sin(ho + tilt) / sin(ho)`.
pub fn shadow_length(length: f64, tilt: f64, solar_altitude: f64) -> f64 {
    let ho = solar_altitude.to_radians();
    length * (ho + tilt.to_radians()).sin() / ho.sin()
}

/// Evaluate the spacing formula for the winter solstice.
///
/// Total over its inputs: when the noon sun is below the horizon the
/// returned `min_spacing` is NaN, infinite or negative and must not be used.
/// Use [`evaluate`] for a checked result.
pub fn calc_shadow_spacing(latitude: f64, tilt: f64, length: f64) -> ShadowSpacing {
    let declination = solar_declination(SOLSTICE_DAY_OF_YEAR);
    let solar_altitude = noon_solar_altitude(latitude, declination);
    let min_spacing = shadow_length(length, tilt, solar_altitude);
    ShadowSpacing { declination, solar_altitude, min_spacing }
}

/// Compute the checked spacing result for an input.
///
/// # Errors
/// Returns [`Error::InvalidGeometry`] when the sun does not rise above the
/// horizon at noon on the solstice for the given latitude, or when the sun
/// stands so far behind the panel face (`ho + tilt >= 180°`) that no positive
/// spacing exists.
pub fn evaluate(input: &CalculationInput) -> Result<CalculationResult> {
    let raw = calc_shadow_spacing(input.latitude, input.tilt, input.length);
    validate(input, raw)
}

fn validate(input: &CalculationInput, raw: ShadowSpacing) -> Result<CalculationResult> {
    if raw.solar_altitude.is_nan()
        || raw.solar_altitude <= MIN_SOLAR_ALTITUDE_DEG
        || !raw.min_spacing.is_finite()
        || raw.min_spacing <= 0.0
    {
        return Err(Error::InvalidGeometry { solar_altitude: raw.solar_altitude });
    }
    Ok(CalculationResult {
        input: *input,
        declination: raw.declination,
        solar_altitude: raw.solar_altitude,
        min_spacing: raw.min_spacing,
        recommended_spacing: raw.min_spacing * RECOMMENDED_MARGIN,
    })
}

/// Round a value for display.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_solstice_declination() {
        let d = solar_declination(SOLSTICE_DAY_OF_YEAR);
        assert!(approx(d, -23.4498, 1e-3), "Declination {} should be ~-23.45°", d);
    }

    #[test]
    fn test_declination_constant_across_inputs() {
        let reference = calc_shadow_spacing(20.0, 20.0, 1.7).declination;
        for (lat, tilt, len) in [(-45.0, 0.0, 0.5), (0.0, 90.0, 3.0), (60.0, 35.0, 1.0), (89.0, 10.0, 2.2)] {
            let d = calc_shadow_spacing(lat, tilt, len).declination;
            assert_eq!(d, reference, "Declination changed for lat={} tilt={} len={}", lat, tilt, len);
        }
    }

    #[test]
    fn test_reference_site() {
        // latitude 20°, tilt 20°, 1.7 m panel
        let input = CalculationInput::new(20.0, 20.0, 1.7).unwrap();
        let result = evaluate(&input).unwrap();

        assert!(approx(result.solar_altitude, 46.550, 1e-3), "ho {}", result.solar_altitude);
        assert!(approx(result.min_spacing, 2.148, 1e-3), "dmin {}", result.min_spacing);
        assert!(approx(result.recommended_spacing, 2.685, 1e-3), "drec {}", result.recommended_spacing);

        let expected = 1.7 * (result.solar_altitude + 20.0).to_radians().sin()
            / result.solar_altitude.to_radians().sin();
        assert!(approx(result.min_spacing, expected, 1e-12));
    }

    #[test]
    fn test_flat_panel_spacing_equals_length() {
        let result = evaluate(&CalculationInput::new(0.0, 0.0, 1.0).unwrap()).unwrap();
        assert!(approx(result.min_spacing, 1.0, 1e-12), "Flat panel casts no extra shadow");
    }

    #[test]
    fn test_recommended_is_margin_times_minimum() {
        for lat in [-90.0, -60.0, -45.0, -30.0, -24.0, -20.0, 0.0, 15.5, 40.416, 60.0] {
            for tilt in [0.0, 10.0, 35.0, 60.0, 90.0] {
                let Ok(result) = evaluate(&CalculationInput::new(lat, tilt, 2.0).unwrap()) else {
                    continue;
                };
                assert!(result.min_spacing > 0.0, "dmin {} (lat {}, tilt {})", result.min_spacing, lat, tilt);
                assert!(
                    approx(result.recommended_spacing, result.min_spacing * 1.25, 1e-12),
                    "drec {} != 1.25 × dmin {} (lat {}, tilt {})",
                    result.recommended_spacing,
                    result.min_spacing,
                    lat,
                    tilt
                );
                assert!(result.recommended_spacing >= result.min_spacing);
            }
        }
    }

    #[test]
    fn test_spacing_finite_and_positive_when_sun_up() {
        // Latitudes where 0 < ho <= 90
        let mut lat = -23.0;
        while lat < 66.0 {
            for tilt in [1.0, 15.0, 45.0, 75.0, 89.0] {
                let raw = calc_shadow_spacing(lat, tilt, 1.7);
                assert!(raw.solar_altitude > 0.0);
                assert!(
                    raw.min_spacing.is_finite() && raw.min_spacing > 0.0,
                    "dmin {} at lat {} tilt {}",
                    raw.min_spacing,
                    lat,
                    tilt
                );
            }
            lat += 3.5;
        }
    }

    #[test]
    fn test_spacing_non_decreasing_with_tilt() {
        // At 50°N ho ≈ 16.55°, so the shadow grows with tilt up to ~73°
        let mut previous = 0.0;
        for step in 0..=70 {
            let tilt = step as f64;
            let raw = calc_shadow_spacing(50.0, tilt, 2.0);
            assert!(
                raw.min_spacing >= previous,
                "dmin decreased at tilt {}: {} < {}",
                tilt,
                raw.min_spacing,
                previous
            );
            previous = raw.min_spacing;
        }
    }

    #[test]
    fn test_polar_latitude_rejected() {
        let input = CalculationInput::new(89.0, 20.0, 1.7).unwrap();
        match evaluate(&input) {
            Err(Error::InvalidGeometry { solar_altitude }) => {
                assert!(approx(solar_altitude, -22.45, 1e-2), "ho {}", solar_altitude)
            }
            other => panic!("expected InvalidGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_altitude_rejected() {
        let input = CalculationInput::new(60.0, 20.0, 1.7).unwrap();
        let raw = ShadowSpacing { declination: -23.45, solar_altitude: 0.0, min_spacing: f64::INFINITY };
        assert!(matches!(validate(&input, raw), Err(Error::InvalidGeometry { .. })));

        // Latitude placing the sun exactly on the horizon
        let boundary = 90.0 + solar_declination(SOLSTICE_DAY_OF_YEAR);
        let input = CalculationInput::new(boundary, 20.0, 1.7).unwrap();
        assert!(matches!(evaluate(&input), Err(Error::InvalidGeometry { .. })));
    }

    #[test]
    fn test_sun_behind_panel_face_rejected() {
        // At 60°S ho ≈ 126.55°, so a vertical panel gives ho + tilt > 180°
        let input = CalculationInput::new(-60.0, 90.0, 1.7).unwrap();
        let raw = calc_shadow_spacing(-60.0, 90.0, 1.7);
        assert!(raw.min_spacing < 0.0, "formula value {}", raw.min_spacing);
        assert!(matches!(evaluate(&input), Err(Error::InvalidGeometry { .. })));

        // Same site with a flatter panel still has a positive spacing
        let result = evaluate(&CalculationInput::new(-60.0, 30.0, 1.7).unwrap()).unwrap();
        assert!(result.min_spacing > 0.0);
        assert!(result.recommended_spacing >= result.min_spacing);
    }

    #[test]
    fn test_southern_latitudes_never_yield_non_positive_spacing() {
        let mut lat = -90.0;
        while lat < -24.0 {
            for step in 0..=18 {
                let tilt = step as f64 * 5.0;
                match evaluate(&CalculationInput::new(lat, tilt, 1.7).unwrap()) {
                    Ok(r) => assert!(
                        r.min_spacing > 0.0 && r.recommended_spacing >= r.min_spacing,
                        "dmin {} drec {} at lat {} tilt {}",
                        r.min_spacing,
                        r.recommended_spacing,
                        lat,
                        tilt
                    ),
                    Err(Error::InvalidGeometry { .. }) => {}
                    Err(e) => panic!("unexpected error {:?}", e),
                }
            }
            lat += 2.5;
        }
    }

    #[test]
    fn test_input_ranges_checked() {
        assert!(CalculationInput::new(-90.0, 0.0, 0.01).is_ok());
        assert!(CalculationInput::new(90.0, 90.0, 10.0).is_ok());
        assert!(matches!(
            CalculationInput::new(90.5, 20.0, 1.7),
            Err(Error::OutOfRange { name: "Latitude", .. })
        ));
        assert!(matches!(
            CalculationInput::new(20.0, -1.0, 1.7),
            Err(Error::OutOfRange { name: "Tilt", .. })
        ));
        assert!(matches!(
            CalculationInput::new(20.0, 20.0, 0.0),
            Err(Error::OutOfRange { name: "Length", .. })
        ));
        assert!(CalculationInput::new(20.0, 20.0, f64::NAN).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.148270241, 3), 2.148);
        assert_eq!(round_to(2.6853378, 3), 2.685);
        assert_eq!(round_to(-23.4497828, 3), -23.45);
    }
}
