//! City Latitude Lookup
//!
//! A small built-in table of major cities so a site latitude can be picked
//! by name instead of typed in.

use serde::Serialize;

/// Maximum number of matches returned by [`search`]
pub const MAX_SEARCH_RESULTS: usize = 8;

/// Queries shorter than this (in characters) match nothing
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    /// Latitude in decimal degrees (positive north)
    pub latitude: f64,
}

const fn city(name: &'static str, country: &'static str, latitude: f64) -> City {
    City { name, country, latitude }
}

pub const CITIES: &[City] = &[
    // Spain
    city("Madrid", "Spain", 40.416),
    city("Barcelona", "Spain", 41.389),
    city("Valencia", "Spain", 39.470),
    city("Seville", "Spain", 37.389),
    city("Bilbao", "Spain", 43.263),
    city("Málaga", "Spain", 36.721),
    city("Zaragoza", "Spain", 41.649),
    city("Murcia", "Spain", 37.987),
    city("Palma", "Spain", 39.570),
    city("Las Palmas", "Spain", 28.100),
    city("Santa Cruz de Tenerife", "Spain", 28.464),
    // Europe
    city("Paris", "France", 48.857),
    city("London", "United Kingdom", 51.509),
    city("Rome", "Italy", 41.902),
    city("Berlin", "Germany", 52.520),
    city("Amsterdam", "Netherlands", 52.370),
    city("Lisbon", "Portugal", 38.722),
    city("Athens", "Greece", 37.976),
    city("Stockholm", "Sweden", 59.334),
    city("Copenhagen", "Denmark", 55.676),
    city("Oslo", "Norway", 59.913),
    city("Warsaw", "Poland", 52.237),
    city("Vienna", "Austria", 48.208),
    city("Prague", "Czech Republic", 50.075),
    city("Budapest", "Hungary", 47.498),
    city("Brussels", "Belgium", 50.850),
    city("Dublin", "Ireland", 53.349),
    city("Zurich", "Switzerland", 47.368),
    city("Helsinki", "Finland", 60.170),
    // Americas
    city("New York", "United States", 40.713),
    city("Los Angeles", "United States", 34.052),
    city("Chicago", "United States", 41.878),
    city("Miami", "United States", 25.761),
    city("San Francisco", "United States", 37.775),
    city("Washington", "United States", 38.907),
    city("Boston", "United States", 42.361),
    city("Las Vegas", "United States", 36.170),
    city("Mexico City", "Mexico", 19.433),
    city("Buenos Aires", "Argentina", -34.603),
    city("São Paulo", "Brazil", -23.551),
    city("Rio de Janeiro", "Brazil", -22.907),
    city("Lima", "Peru", -12.047),
    city("Bogotá", "Colombia", 4.711),
    city("Santiago", "Chile", -33.457),
    city("Caracas", "Venezuela", 10.480),
    city("Toronto", "Canada", 43.651),
    city("Montreal", "Canada", 45.501),
    city("Vancouver", "Canada", 49.282),
    // Asia
    city("Tokyo", "Japan", 35.676),
    city("Beijing", "China", 39.904),
    city("Shanghai", "China", 31.230),
    city("Hong Kong", "China", 22.279),
    city("Singapore", "Singapore", 1.352),
    city("Seoul", "South Korea", 37.566),
    city("Mumbai", "India", 19.076),
    city("New Delhi", "India", 28.614),
    city("Bangkok", "Thailand", 13.756),
    city("Manila", "Philippines", 14.599),
    city("Jakarta", "Indonesia", -6.175),
    city("Kuala Lumpur", "Malaysia", 3.139),
    city("Dubai", "United Arab Emirates", 25.204),
    city("Tel Aviv", "Israel", 32.085),
    city("Istanbul", "Turkey", 41.008),
    // Africa
    city("Cairo", "Egypt", 30.044),
    city("Cape Town", "South Africa", -33.925),
    city("Johannesburg", "South Africa", -26.204),
    city("Lagos", "Nigeria", 6.524),
    city("Nairobi", "Kenya", -1.292),
    city("Casablanca", "Morocco", 33.573),
    city("Algiers", "Algeria", 36.752),
    city("Tunis", "Tunisia", 36.806),
    // Oceania
    city("Sydney", "Australia", -33.869),
    city("Melbourne", "Australia", -37.814),
    city("Brisbane", "Australia", -27.470),
    city("Perth", "Australia", -31.953),
    city("Auckland", "New Zealand", -36.849),
    city("Wellington", "New Zealand", -41.289),
];

/// Case-insensitive substring search over city names, in table order.
///
/// The query is matched as typed, surrounding spaces included.
pub fn search(query: &str) -> Vec<&'static City> {
    let query = query.to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    CITIES
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&query))
        .take(MAX_SEARCH_RESULTS)
        .collect()
}

/// Exact (case-insensitive) lookup by city name.
pub fn find(name: &str) -> Option<&'static City> {
    let name = name.trim().to_lowercase();
    CITIES.iter().find(|c| c.name.to_lowercase() == name)
}
