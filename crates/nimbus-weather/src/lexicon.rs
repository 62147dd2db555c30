//! Weather code descriptions.
//!
//! The table is indexed directly by the numeric code the widget receives;
//! it is not the sparse WMO numbering.

/// Returned for codes outside the table
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

pub const WEATHER_DESCRIPTIONS: [&str; 28] = [
    "Clear sky",
    "Mainly clear",
    "Partly cloudy",
    "Overcast",
    "Fog and depositing rime fog",
    "Drizzle: Light intensity",
    "Drizzle: Moderate intensity",
    "Drizzle: Dense intensity",
    "Freezing Drizzle: Light intensity",
    "Freezing Drizzle: Dense intensity",
    "Rain: Slight intensity",
    "Rain: Moderate intensity",
    "Rain: Heavy intensity",
    "Freezing Rain: Light intensity",
    "Freezing Rain: Heavy intensity",
    "Snow fall: Slight intensity",
    "Snow fall: Moderate intensity",
    "Snow fall: Heavy intensity",
    "Snow grains",
    "Rain showers: Slight intensity",
    "Rain showers: Moderate intensity",
    "Rain showers: Violent intensity",
    "Snow showers: Slight intensity",
    "Snow showers: Heavy intensity",
    "Thunderstorm: Slight",
    "Thunderstorm: Moderate",
    "Thunderstorm with slight hail",
    "Thunderstorm with heavy hail",
];

/// Human-readable description for a weather code
pub fn describe_weather_code(code: i32) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| WEATHER_DESCRIPTIONS.get(i))
        .copied()
        .unwrap_or(UNKNOWN_DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_clear_sky() {
        assert_eq!(describe_weather_code(0), "Clear sky");
    }

    #[test]
    fn test_code_heavy_hail() {
        assert_eq!(describe_weather_code(27), "Thunderstorm with heavy hail");
    }

    #[test]
    fn test_every_code_in_range_matches_table() {
        for (code, expected) in WEATHER_DESCRIPTIONS.iter().enumerate() {
            assert_eq!(describe_weather_code(code as i32), *expected);
        }
    }

    #[test]
    fn test_out_of_range_is_unknown() {
        assert_eq!(describe_weather_code(28), UNKNOWN_DESCRIPTION);
        assert_eq!(describe_weather_code(95), UNKNOWN_DESCRIPTION);
        assert_eq!(describe_weather_code(-1), UNKNOWN_DESCRIPTION);
    }
}
