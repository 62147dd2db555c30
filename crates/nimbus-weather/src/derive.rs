//! Pure values derived from a snapshot for display.

use chrono::Datelike;

use crate::clock::Clock;
use crate::types::WeatherSnapshot;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Highest forecast maximum; `None` when there is no daily data
pub fn max_temperature(snapshot: &WeatherSnapshot) -> Option<f64> {
    snapshot.daily_highs.iter().copied().reduce(f64::max)
}

/// Lowest forecast minimum; `None` when there is no daily data
pub fn min_temperature(snapshot: &WeatherSnapshot) -> Option<f64> {
    snapshot.daily_lows.iter().copied().reduce(f64::min)
}

/// Name of the clock's current local weekday
pub fn weekday_name(clock: &dyn Clock) -> &'static str {
    let index = clock.today().weekday().num_days_from_sunday() as usize;
    WEEKDAY_NAMES[index % WEEKDAY_NAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};
    use chrono::NaiveDate;

    fn snapshot(highs: Vec<f64>, lows: Vec<f64>) -> WeatherSnapshot {
        WeatherSnapshot {
            current_temperature: 10.0,
            current_weather_code: 0,
            daily_highs: highs,
            daily_lows: lows,
        }
    }

    #[test]
    fn test_max_is_upper_bound_and_member() {
        let cases = [
            vec![12.5],
            vec![3.0, 17.2, 9.9, 17.1],
            vec![-4.0, -12.5, -0.5],
            vec![21.0, 21.0, 20.9, 19.0, 22.4, 18.3, 22.39],
        ];
        for highs in cases {
            let s = snapshot(highs.clone(), vec![0.0]);
            let max = max_temperature(&s).unwrap();
            assert!(highs.iter().all(|h| max >= *h), "{max} below an element of {highs:?}");
            assert!(highs.contains(&max));
        }
    }

    #[test]
    fn test_min_is_lower_bound_and_member() {
        let cases = [
            vec![4.0],
            vec![3.0, -1.2, 9.9, -1.1],
            vec![0.0, 0.0],
        ];
        for lows in cases {
            let s = snapshot(vec![0.0], lows.clone());
            let min = min_temperature(&s).unwrap();
            assert!(lows.iter().all(|l| min <= *l), "{min} above an element of {lows:?}");
            assert!(lows.contains(&min));
        }
    }

    #[test]
    fn test_empty_daily_data_is_absent() {
        let s = snapshot(vec![], vec![]);
        assert_eq!(max_temperature(&s), None);
        assert_eq!(min_temperature(&s), None);
    }

    #[test]
    fn test_weekday_name_is_sunday_indexed() {
        // 2024-06-02 was a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        for offset in 0..7u64 {
            let date = sunday + chrono::Days::new(offset);
            assert_eq!(weekday_name(&FixedClock(date)), WEEKDAY_NAMES[offset as usize]);
        }
    }

    #[test]
    fn test_weekday_name_uses_local_clock() {
        // Sampled on both sides in case the test straddles midnight
        let before = chrono::Local::now().weekday().num_days_from_sunday() as usize;
        let name = weekday_name(&SystemClock);
        let after = chrono::Local::now().weekday().num_days_from_sunday() as usize;
        assert!(name == WEEKDAY_NAMES[before] || name == WEEKDAY_NAMES[after]);
    }
}
