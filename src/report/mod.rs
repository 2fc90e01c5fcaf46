//! Reporting utilities: dashboard rows, snapshot comparisons and formatted
//! terminal output.

pub mod format;

pub use format::*;

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::{CombinedData, DataPoint, DataSnapshot, IndicatorKey};
use crate::io::schedule::ReleaseSchedule;
use crate::series::{Change, change, latest_value};

/// Latest observation and last change of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    pub key: IndicatorKey,
    pub latest: Option<DataPoint>,
    pub change: Option<Change>,
}

/// One row per catalog indicator, in catalog order.
pub fn dashboard_rows(data: &CombinedData) -> Vec<DashboardRow> {
    IndicatorKey::ALL
        .into_iter()
        .map(|key| {
            let series = data.series(key);
            DashboardRow {
                key,
                latest: latest_value(series).cloned(),
                change: change(series),
            }
        })
        .collect()
}

/// Before/after values of one snapshot field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
    /// `None` when the value at prediction time was zero.
    pub percent: Option<f64>,
}

/// Compare every numeric snapshot field.
pub fn compare_snapshots(before: &DataSnapshot, after: &DataSnapshot) -> Vec<FieldComparison> {
    DataSnapshot::FIELDS
        .into_iter()
        .map(|(key, label, unit)| {
            let b = before.field(key).unwrap_or(0.0);
            let a = after.field(key).unwrap_or(0.0);
            let delta = a - b;
            FieldComparison {
                key,
                label,
                unit,
                before: b,
                after: a,
                delta,
                percent: (b != 0.0).then(|| delta / b * 100.0),
            }
        })
        .collect()
}

/// Latest past release of one indicator and the observation it published.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentRelease {
    pub key: IndicatorKey,
    pub release_date: NaiveDate,
    pub previous: DataPoint,
    pub current: DataPoint,
    pub change: Change,
}

/// Releases from the first day of last month up to (not including) `today`,
/// at most one per indicator, newest release first.
///
/// The published value is the first observation dated in the release month.
/// Monthly series are dated at the start of the reference month, and the file
/// may lag the release, so the fallbacks are the last observation on or before
/// the release and then the first one after it. Releases with no earlier
/// observation to compare against are skipped.
pub fn recent_release_results(
    data: &CombinedData,
    schedule: &dyn ReleaseSchedule,
    today: NaiveDate,
) -> Vec<RecentRelease> {
    let window_start = previous_month_start(today);
    let mut out: Vec<RecentRelease> = IndicatorKey::ALL
        .into_iter()
        .filter(|key| key.config().release_id.is_some())
        .filter_map(|key| {
            let series = data.series(key);
            schedule
                .all_release_dates(key)
                .into_iter()
                .filter(|date| *date >= window_start && *date < today)
                .filter_map(|date| release_result(key, series, date))
                .last()
        })
        .collect();
    out.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    out
}

fn release_result(key: IndicatorKey, series: &[DataPoint], release_date: NaiveDate) -> Option<RecentRelease> {
    let same_month = |p: &&DataPoint| p.date.year() == release_date.year() && p.date.month() == release_date.month();
    let current = series
        .iter()
        .find(same_month)
        .or_else(|| series.iter().rev().find(|p| p.date <= release_date))
        .or_else(|| series.iter().find(|p| p.date > release_date))?;
    let previous = series.iter().rev().find(|p| p.date < current.date)?;
    let change = change(&[previous.clone(), current.clone()])?;
    Some(RecentRelease {
        key,
        release_date,
        previous: previous.clone(),
        current: current.clone(),
        change,
    })
}

fn previous_month_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .and_then(|first| first.checked_sub_months(Months::new(1)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::create_data_snapshot;
    use crate::snapshot::tests::{d, fixed_now, sample_data};

    struct Releases(Vec<(IndicatorKey, Vec<NaiveDate>)>);

    impl ReleaseSchedule for Releases {
        fn all_release_dates(&self, key: IndicatorKey) -> Vec<NaiveDate> {
            self.0
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, dates)| dates.clone())
                .unwrap_or_default()
        }
    }

    fn monthly(key: IndicatorKey, data: &mut CombinedData, points: &[(u32, f64)]) {
        let series = points
            .iter()
            .map(|&(month, value)| DataPoint::new(d(2024, month, 1), value))
            .collect();
        data.set_series(key, series);
    }

    #[test]
    fn rows_follow_catalog_order_and_tolerate_missing_series() {
        let rows = dashboard_rows(&sample_data());
        assert_eq!(rows.len(), IndicatorKey::ALL.len());
        assert_eq!(rows[0].key, IndicatorKey::Treasury2y);

        let t10 = rows.iter().find(|r| r.key == IndicatorKey::Treasury10y).unwrap();
        assert_eq!(t10.latest.as_ref().map(|p| p.value), Some(4.25));
        assert!((t10.change.unwrap().value + 0.05).abs() < 1e-9);

        let hy = rows.iter().find(|r| r.key == IndicatorKey::HySpread).unwrap();
        assert!(hy.latest.is_none());
        assert!(hy.change.is_none());
    }

    #[test]
    fn comparison_skips_percent_for_zero_base() {
        let before = create_data_snapshot(&CombinedData::default(), fixed_now());
        let after = create_data_snapshot(&sample_data(), fixed_now());
        let rows = compare_snapshots(&before, &after);
        assert_eq!(rows.len(), DataSnapshot::FIELDS.len());
        assert!(rows.iter().all(|r| r.percent.is_none()));

        let rows = compare_snapshots(&after, &after);
        let vix = rows.iter().find(|r| r.key == "vix").unwrap();
        assert_eq!(vix.delta, 0.0);
        assert_eq!(vix.percent, Some(0.0));
    }

    #[test]
    fn release_results_use_release_month_then_fall_back() {
        let mut data = CombinedData::default();
        monthly(IndicatorKey::Cpi, &mut data, &[(4, 312.0), (5, 313.0), (6, 314.5)]);
        monthly(IndicatorKey::NonfarmPayroll, &mut data, &[(4, 158_000.0), (5, 158_200.0)]);
        monthly(IndicatorKey::Unemployment, &mut data, &[(5, 4.0), (6, 4.1)]);
        monthly(IndicatorKey::FedFundsRate, &mut data, &[(6, 5.33)]);
        let schedule = Releases(vec![
            (IndicatorKey::Cpi, vec![d(2024, 5, 31), d(2024, 6, 12), d(2024, 7, 10)]),
            (IndicatorKey::NonfarmPayroll, vec![d(2024, 6, 7)]),
            (IndicatorKey::Unemployment, vec![d(2024, 6, 1)]),
            (IndicatorKey::FedFundsRate, vec![d(2024, 6, 12)]),
            (IndicatorKey::Vix, vec![d(2024, 6, 12)]),
        ]);

        let rows = recent_release_results(&data, &schedule, d(2024, 7, 10));
        let keys: Vec<_> = rows.iter().map(|r| (r.key, r.release_date)).collect();
        assert_eq!(
            keys,
            vec![
                (IndicatorKey::Cpi, d(2024, 6, 12)),
                (IndicatorKey::NonfarmPayroll, d(2024, 6, 7)),
                (IndicatorKey::Unemployment, d(2024, 6, 1)),
            ]
        );

        let cpi = &rows[0];
        assert_eq!(cpi.current, DataPoint::new(d(2024, 6, 1), 314.5));
        assert_eq!(cpi.previous, DataPoint::new(d(2024, 5, 1), 313.0));
        assert!((cpi.change.value - 1.5).abs() < 1e-9);

        // No June observation yet: the last one before the release is used.
        let nfp = &rows[1];
        assert_eq!(nfp.current.date, d(2024, 5, 1));
        assert_eq!(nfp.previous.date, d(2024, 4, 1));
        assert!((nfp.change.value - 200.0).abs() < 1e-9);
    }

    #[test]
    fn release_results_keep_latest_release_and_skip_zero_base_percent() {
        let mut data = CombinedData::default();
        monthly(IndicatorKey::FedFundsRate, &mut data, &[(5, 0.0), (6, 0.25), (7, 0.5)]);
        let schedule = Releases(vec![(IndicatorKey::FedFundsRate, vec![d(2024, 6, 12), d(2024, 7, 3)])]);

        let rows = recent_release_results(&data, &schedule, d(2024, 7, 20));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].release_date, d(2024, 7, 3));
        assert_eq!(rows[0].current.value, 0.5);

        let rows = recent_release_results(&data, &schedule, d(2024, 7, 3));
        assert_eq!(rows[0].release_date, d(2024, 6, 12));
        assert_eq!(rows[0].change.percent, None);
    }

    #[test]
    fn release_with_only_later_observations_is_skipped() {
        let mut data = CombinedData::default();
        data.set_series(
            IndicatorKey::Cpi,
            vec![DataPoint::new(d(2024, 6, 20), 1.0), DataPoint::new(d(2024, 7, 2), 1.2)],
        );
        let schedule = Releases(vec![(IndicatorKey::Cpi, vec![d(2024, 5, 15)])]);

        // The first later observation has nothing before it to compare with.
        assert!(recent_release_results(&data, &schedule, d(2024, 6, 25)).is_empty());
        assert!(recent_release_results(&data, &schedule, d(2024, 7, 5)).is_empty());
    }
}
