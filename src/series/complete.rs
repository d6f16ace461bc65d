//! Daily series completion.
//!
//! Turns a sparse set of per-date observations into a dense series over a
//! closed interval:
//!
//! - missing dates are filled with `0` (no rows means no activity)
//! - each day is classified as business / non-business
//! - business days below the threshold are flagged `Alert`
//!
//! The function is pure: "today" is whatever the caller put in the interval.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::{DailyPoint, DisplayColor, HolidaySet, Interval, Observation, SeriesResult};
use crate::error::SeriesError;

/// Complete `observations` over `interval`.
///
/// Observations outside the interval are ignored. At most one observation per
/// date is allowed; pre-aggregate raw rows with `io::daily_observations`.
pub fn complete(
    observations: &[Observation],
    interval: Interval,
    holidays: &HolidaySet,
    threshold: f64,
) -> Result<SeriesResult, SeriesError> {
    interval.validate()?;

    let mut by_date: HashMap<NaiveDate, f64> = HashMap::with_capacity(observations.len());
    for obs in observations {
        if by_date.insert(obs.date, obs.value).is_some() {
            return Err(SeriesError::DuplicateObservation { date: obs.date });
        }
    }

    let points = interval
        .dates()
        .map(|date| {
            let value = by_date.get(&date).copied().unwrap_or(0.0);
            let is_business_day = is_business_day(date, holidays);
            DailyPoint {
                date,
                value,
                is_business_day,
                display_color: display_color(value, is_business_day, threshold),
            }
        })
        .collect();

    Ok(SeriesResult::from_points(points))
}

/// Monday–Friday and not a holiday.
pub fn is_business_day(date: NaiveDate, holidays: &HolidaySet) -> bool {
    !is_weekend(date) && !holidays.contains(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The threshold only applies on days work is expected.
pub fn display_color(value: f64, is_business_day: bool, threshold: f64) -> DisplayColor {
    if is_business_day && value < threshold {
        DisplayColor::Alert
    } else {
        DisplayColor::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2025-03-10 is a Monday.
    fn today() -> NaiveDate {
        d(2025, 3, 10)
    }

    #[test]
    fn output_is_dense_and_ascending() {
        let interval = Interval::new(d(2025, 2, 20), d(2025, 3, 10)).unwrap();
        let obs = vec![Observation::new(d(2025, 3, 1), 4.0), Observation::new(d(2025, 2, 21), 2.0)];
        let series = complete(&obs, interval, &HolidaySet::new(), 1.0).unwrap();

        assert_eq!(series.len(), 19);
        assert_eq!(series.points()[0].date, interval.start);
        assert_eq!(series.points()[18].date, interval.end);
        for w in series.points().windows(2) {
            assert_eq!(w[1].date - w[0].date, Duration::days(1));
        }
    }

    #[test]
    fn missing_dates_are_zero() {
        let interval = Interval::new(d(2025, 3, 3), d(2025, 3, 7)).unwrap();
        let obs = vec![Observation::new(d(2025, 3, 5), 7.0)];
        let series = complete(&obs, interval, &HolidaySet::new(), 0.0).unwrap();

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.0, 0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn weekends_and_holidays_are_not_business_days() {
        // Fri 2025-04-18 is a holiday; 19/20 is the weekend.
        let interval = Interval::new(d(2025, 4, 17), d(2025, 4, 21)).unwrap();
        let holidays: HolidaySet = [d(2025, 4, 18)].into_iter().collect();
        let series = complete(&[], interval, &holidays, 10.0).unwrap();

        let flags: Vec<bool> = series.iter().map(|p| p.is_business_day).collect();
        assert_eq!(flags, vec![true, false, false, false, true]);
    }

    #[test]
    fn alert_only_on_business_days_below_threshold() {
        // Sat 2025-03-08, Sun 2025-03-09, Mon 2025-03-10.
        let interval = Interval::new(d(2025, 3, 7), d(2025, 3, 10)).unwrap();
        let obs = vec![
            Observation::new(d(2025, 3, 7), 20.0),
            Observation::new(d(2025, 3, 8), 1.0),
            Observation::new(d(2025, 3, 10), 19.99),
        ];
        let series = complete(&obs, interval, &HolidaySet::new(), 20.0).unwrap();

        let colors: Vec<DisplayColor> = series.iter().map(|p| p.display_color).collect();
        assert_eq!(
            colors,
            vec![
                DisplayColor::Normal,
                DisplayColor::Normal,
                DisplayColor::Normal,
                DisplayColor::Alert,
            ]
        );
        assert_eq!(series.alert_days(), 1);
    }

    #[test]
    fn trailing_ten_day_scenario() {
        let today = today();
        let interval = Interval::trailing(today, 10);
        let obs = vec![
            Observation::new(today - Duration::days(2), 25.0),
            Observation::new(today - Duration::days(5), 5.0),
        ];
        let series = complete(&obs, interval, &HolidaySet::new(), 20.0).unwrap();
        assert_eq!(series.len(), 10);

        for p in series.iter() {
            let expected_value = if p.date == today - Duration::days(2) {
                25.0
            } else if p.date == today - Duration::days(5) {
                5.0
            } else {
                0.0
            };
            assert_eq!(p.value, expected_value, "value on {}", p.date);
            assert_eq!(p.is_business_day, !is_weekend(p.date));

            let expect_alert = p.is_business_day && expected_value < 20.0;
            assert_eq!(p.is_alert(), expect_alert, "color on {}", p.date);
        }

        // today-2 is Saturday 2025-03-08, today-5 is Wednesday 2025-03-05.
        assert!(!series.get(d(2025, 3, 8)).unwrap().is_alert());
        assert!(series.get(d(2025, 3, 5)).unwrap().is_alert());
    }

    #[test]
    fn reversed_interval_fails() {
        let interval = Interval {
            start: d(2025, 3, 10),
            end: d(2025, 3, 1),
        };
        let err = complete(&[], interval, &HolidaySet::new(), 1.0).unwrap_err();
        assert_eq!(
            err,
            SeriesError::InvalidInterval {
                start: d(2025, 3, 10),
                end: d(2025, 3, 1)
            }
        );
    }

    #[test]
    fn duplicate_dates_fail() {
        let interval = Interval::trailing(today(), 10);
        let obs = vec![
            Observation::new(d(2025, 3, 4), 1.0),
            Observation::new(d(2025, 3, 4), 2.0),
        ];
        let err = complete(&obs, interval, &HolidaySet::new(), 1.0).unwrap_err();
        assert_eq!(err, SeriesError::DuplicateObservation { date: d(2025, 3, 4) });
    }

    #[test]
    fn observations_outside_interval_are_ignored() {
        let interval = Interval::new(d(2025, 3, 3), d(2025, 3, 4)).unwrap();
        let obs = vec![Observation::new(d(2025, 1, 1), 99.0)];
        let series = complete(&obs, interval, &HolidaySet::new(), 0.0).unwrap();
        assert_eq!(series.total(), 0.0);
    }

    #[test]
    fn completion_is_idempotent() {
        let interval = Interval::trailing(today(), 14);
        let holidays: HolidaySet = [d(2025, 3, 4)].into_iter().collect();
        let obs = vec![Observation::new(d(2025, 3, 6), 3.0)];
        let a = complete(&obs, interval, &holidays, 2.0).unwrap();
        let b = complete(&obs, interval, &holidays, 2.0).unwrap();
        assert_eq!(a, b);
    }
}
