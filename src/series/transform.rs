//! Derived series and point extraction.
//!
//! All functions are pure: inputs are borrowed, outputs are new vectors.
//! Series are assumed sorted ascending by date with at most one point per date.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};

use crate::domain::{DataPoint, DateRange};

/// Observations between a point and its year-ago counterpart in [`calculate_yoy`].
pub const YOY_LOOKBACK: usize = 12;

/// Round to two decimals the way the dashboard always has: `Math.round(x * 100) / 100`.
///
/// Ties round toward positive infinity (`-0.125 -> -0.12`).
pub fn round2(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

/// First date kept by [`filter_by_date_range`], or `None` for `All`.
///
/// Month arithmetic clamps to the end of shorter months (Mar 31 - 1M = Feb 28/29).
pub fn range_cutoff(range: DateRange, today: NaiveDate) -> Option<NaiveDate> {
    let months = match range {
        DateRange::OneMonth => 1,
        DateRange::ThreeMonths => 3,
        DateRange::SixMonths => 6,
        DateRange::OneYear => 12,
        DateRange::TwoYears => 24,
        DateRange::All => return None,
    };
    // Only fails before year -262143; keep everything in that case.
    Some(today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN))
}

/// Keep points dated on or after the range cutoff.
///
/// `All` (and an empty input) returns the series unchanged.
pub fn filter_by_date_range(series: &[DataPoint], range: DateRange, today: NaiveDate) -> Vec<DataPoint> {
    let Some(cutoff) = range_cutoff(range, today) else {
        return series.to_vec();
    };
    series.iter().filter(|p| p.date >= cutoff).cloned().collect()
}

/// Year-over-year percent change, assuming one observation per month.
///
/// The year-ago value is taken [`YOY_LOOKBACK`] positions back, not by calendar
/// date; gaps in a monthly series shift the comparison. Fewer than 13 points
/// yields an empty series. Points whose year-ago value is zero (or whose
/// result is not finite) are left out.
pub fn calculate_yoy(series: &[DataPoint]) -> Vec<DataPoint> {
    if series.len() <= YOY_LOOKBACK {
        return Vec::new();
    }

    series
        .iter()
        .zip(series.iter().skip(YOY_LOOKBACK))
        .filter_map(|(year_ago, current)| {
            if year_ago.value == 0.0 {
                return None;
            }
            let yoy = (current.value - year_ago.value) / year_ago.value * 100.0;
            yoy.is_finite().then(|| DataPoint::new(current.date, round2(yoy)))
        })
        .collect()
}

/// `long - short` on dates present in both series (inner join on date).
///
/// Output follows the order of `long`.
pub fn calculate_yield_spread(long: &[DataPoint], short: &[DataPoint]) -> Vec<DataPoint> {
    let short_by_date: HashMap<NaiveDate, f64> = short.iter().map(|p| (p.date, p.value)).collect();

    long.iter()
        .filter_map(|p| {
            short_by_date
                .get(&p.date)
                .map(|s| DataPoint::new(p.date, round2(p.value - s)))
        })
        .collect()
}

/// Last point by position; the series is not re-sorted.
pub fn latest_value(series: &[DataPoint]) -> Option<&DataPoint> {
    series.last()
}

/// Change between the last two observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub value: f64,
    /// Percent change; `None` when the previous value is zero.
    pub percent: Option<f64>,
}

pub fn change(series: &[DataPoint]) -> Option<Change> {
    let [.., previous, current] = series else {
        return None;
    };
    let value = current.value - previous.value;
    let percent = (previous.value != 0.0)
        .then(|| value / previous.value * 100.0)
        .filter(|p| p.is_finite());
    Some(Change { value, percent })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = d(2023, 1, 1).checked_add_months(Months::new(i as u32)).unwrap();
                DataPoint::new(date, v)
            })
            .collect()
    }

    #[test]
    fn round2_matches_math_round() {
        assert_eq!(round2(4.196), 4.2);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(0.5), 0.5);
    }

    #[test]
    fn filter_keeps_points_on_or_after_cutoff() {
        let today = d(2024, 6, 15);
        let series = vec![
            DataPoint::new(d(2024, 3, 14), 1.0),
            DataPoint::new(d(2024, 3, 15), 2.0),
            DataPoint::new(d(2024, 5, 20), 3.0),
            DataPoint::new(d(2024, 6, 14), 4.0),
        ];

        let three = filter_by_date_range(&series, DateRange::ThreeMonths, today);
        assert_eq!(three, series[1..].to_vec());

        let one = filter_by_date_range(&series, DateRange::OneMonth, today);
        assert_eq!(one, series[2..].to_vec());

        let two_years = filter_by_date_range(&series, DateRange::TwoYears, today);
        assert_eq!(two_years, series);
    }

    #[test]
    fn filter_all_and_empty_are_identity() {
        let series = monthly(&[1.0, 2.0, 3.0]);
        let today = d(2030, 1, 1);
        assert_eq!(filter_by_date_range(&series, DateRange::All, today), series);
        assert!(filter_by_date_range(&[], DateRange::OneYear, today).is_empty());
    }

    #[test]
    fn cutoff_clamps_to_month_end() {
        assert_eq!(range_cutoff(DateRange::OneMonth, d(2024, 3, 31)), Some(d(2024, 2, 29)));
        assert_eq!(range_cutoff(DateRange::OneYear, d(2024, 2, 29)), Some(d(2023, 2, 28)));
        assert_eq!(range_cutoff(DateRange::All, d(2024, 2, 29)), None);
    }

    #[test]
    fn yoy_needs_thirteen_points() {
        let values: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_yoy(&monthly(&values)).is_empty());
    }

    #[test]
    fn yoy_of_linear_cpi() {
        let values: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
        let series = monthly(&values);
        let yoy = calculate_yoy(&series);
        assert_eq!(yoy.len(), 1);
        assert_eq!(yoy[0].date, series[12].date);
        assert_eq!(yoy[0].value, 12.0);
    }

    #[test]
    fn yoy_of_constant_series_is_zero() {
        let yoy = calculate_yoy(&monthly(&[250.0; 20]));
        assert_eq!(yoy.len(), 8);
        assert!(yoy.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn yoy_skips_zero_base() {
        let mut values = vec![0.0];
        values.extend((1..14).map(|i| i as f64));
        let series = monthly(&values);
        let yoy = calculate_yoy(&series);
        // index 12 has a zero base and is dropped; index 13 compares 13 vs 1.
        assert_eq!(yoy.len(), 1);
        assert_eq!(yoy[0].date, series[13].date);
        assert_eq!(yoy[0].value, 1200.0);
    }

    #[test]
    fn spread_inner_joins_on_date() {
        let long = vec![
            DataPoint::new(d(2024, 1, 1), 4.5),
            DataPoint::new(d(2024, 1, 2), 4.6),
            DataPoint::new(d(2024, 1, 3), 4.55),
        ];
        let short = vec![
            DataPoint::new(d(2024, 1, 1), 4.0),
            DataPoint::new(d(2024, 1, 3), 4.72),
        ];
        let spread = calculate_yield_spread(&long, &short);
        assert_eq!(
            spread,
            vec![
                DataPoint::new(d(2024, 1, 1), 0.5),
                DataPoint::new(d(2024, 1, 3), -0.17),
            ]
        );
    }

    #[test]
    fn latest_and_change() {
        assert!(latest_value(&[]).is_none());
        assert!(change(&monthly(&[1.0])).is_none());

        let series = monthly(&[4.0, 5.0]);
        assert_eq!(latest_value(&series).map(|p| p.value), Some(5.0));
        let c = change(&series).unwrap();
        assert_eq!(c.value, 1.0);
        assert_eq!(c.percent, Some(25.0));
    }

    #[test]
    fn change_from_zero_has_no_percent() {
        let c = change(&monthly(&[0.0, 0.3])).unwrap();
        assert!((c.value - 0.3).abs() < 1e-12);
        assert_eq!(c.percent, None);
    }
}
