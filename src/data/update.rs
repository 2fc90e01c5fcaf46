//! Incremental refresh of the local data directory.
//!
//! Each indicator is fetched from the day after its last stored observation
//! (or from the configured start date), merged by date, and written back.
//! `combined.json` is then rebuilt from the per-indicator files.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::data::fred::ObservationSource;
use crate::domain::{CombinedData, DataPoint, IndicatorKey, StoredSeries};
use crate::error::AppError;
use crate::io::dataset::{DataDir, write_json_atomic};
use crate::io::schedule::{IndicatorReleaseDates, StoredReleaseDates};

#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    /// Drop stored files and refetch everything from `start_date`.
    pub reset: bool,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutcome {
    Added(usize),
    Unchanged,
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorUpdate {
    pub key: IndicatorKey,
    pub fetched_from: NaiveDate,
    pub outcome: IndicatorOutcome,
    /// Points stored after the update.
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub indicators: Vec<IndicatorUpdate>,
    pub combined: CombinedData,
}

impl UpdateReport {
    pub fn failures(&self) -> impl Iterator<Item = &IndicatorUpdate> {
        self.indicators
            .iter()
            .filter(|u| matches!(u.outcome, IndicatorOutcome::Failed(_)))
    }
}

/// Refresh every catalog indicator and rebuild `combined.json`.
///
/// A failed fetch is reported per indicator and does not abort the run.
pub fn update_indicators(
    source: &dyn ObservationSource,
    dir: &DataDir,
    options: UpdateOptions,
    now: DateTime<Utc>,
) -> Result<UpdateReport, AppError> {
    dir.ensure()?;
    if options.reset {
        let removed = dir.reset_series()?;
        tracing::info!(removed, "reset mode: cleared stored series");
    }

    let mut indicators = Vec::with_capacity(IndicatorKey::ALL.len());
    for key in IndicatorKey::ALL {
        indicators.push(update_one(source, dir, key, options, now)?);
    }

    let mut combined = CombinedData {
        last_updated: Some(now),
        ..CombinedData::default()
    };
    for key in IndicatorKey::ALL {
        let stored = dir.load_series(key)?;
        if !stored.data.is_empty() {
            combined.set_series(key, stored.data);
        }
    }
    dir.save_combined(&combined)?;
    tracing::info!(path = %dir.combined_path().display(), "wrote combined data");

    Ok(UpdateReport { indicators, combined })
}

fn update_one(
    source: &dyn ObservationSource,
    dir: &DataDir,
    key: IndicatorKey,
    options: UpdateOptions,
    now: DateTime<Utc>,
) -> Result<IndicatorUpdate, AppError> {
    let existing = if options.reset {
        StoredSeries::default()
    } else {
        dir.load_series(key)?
    };
    let fetched_from = existing
        .data
        .last()
        .and_then(|p| p.date.succ_opt())
        .map_or(options.start_date, |next| next.max(options.start_date));
    let series_id = key.config().series_id;

    tracing::info!(indicator = %key, series_id, from = %fetched_from, "fetching");
    let fetched = match source.observations(series_id, fetched_from) {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!(indicator = %key, error = %err, "fetch failed");
            return Ok(IndicatorUpdate {
                key,
                fetched_from,
                outcome: IndicatorOutcome::Failed(err.message().to_string()),
                total: existing.data.len(),
            });
        }
    };

    if fetched.is_empty() {
        tracing::info!(indicator = %key, "no data available");
        return Ok(IndicatorUpdate {
            key,
            fetched_from,
            outcome: IndicatorOutcome::NoData,
            total: existing.data.len(),
        });
    }

    let (merged, added) = merge_observations(existing.data, fetched, options.start_date);
    if added == 0 {
        tracing::info!(indicator = %key, "no new records");
        return Ok(IndicatorUpdate {
            key,
            fetched_from,
            outcome: IndicatorOutcome::Unchanged,
            total: merged.len(),
        });
    }

    let total = merged.len();
    dir.save_series(
        key,
        &StoredSeries {
            data: merged,
            last_updated: Some(now),
        },
    )?;
    tracing::info!(indicator = %key, added, total, "stored new records");

    Ok(IndicatorUpdate {
        key,
        fetched_from,
        outcome: IndicatorOutcome::Added(added),
        total,
    })
}

/// Merge fetched points into a stored series.
///
/// Points before `start` are dropped from both sides, dates already stored are
/// ignored, and the result is sorted ascending. Returns the merged series and
/// the number of points added.
pub fn merge_observations(
    existing: Vec<DataPoint>,
    fetched: Vec<DataPoint>,
    start: NaiveDate,
) -> (Vec<DataPoint>, usize) {
    let mut merged: Vec<DataPoint> = existing.into_iter().filter(|p| p.date >= start).collect();
    let mut seen: HashSet<NaiveDate> = merged.iter().map(|p| p.date).collect();

    let before = merged.len();
    merged.extend(
        fetched
            .into_iter()
            .filter(|p| p.date >= start && seen.insert(p.date)),
    );
    let added = merged.len() - before;

    merged.sort_by_key(|p| p.date);
    (merged, added)
}

/// Fetch release calendars for every catalog indicator with a FRED release id
/// and write `releaseDates.json`.
pub fn update_release_dates(
    source: &dyn ObservationSource,
    dir: &DataDir,
    start: NaiveDate,
    now: DateTime<Utc>,
) -> Result<StoredReleaseDates, AppError> {
    dir.ensure()?;
    let mut stored = StoredReleaseDates {
        last_updated: Some(now),
        ..StoredReleaseDates::default()
    };

    for key in IndicatorKey::ALL {
        let config = key.config();
        let Some(release_id) = config.release_id else {
            continue;
        };

        let dates = match source.release_dates(release_id, start) {
            Ok(dates) => dates,
            Err(err) => {
                tracing::warn!(indicator = %key, release_id, error = %err, "release dates unavailable");
                Vec::new()
            }
        };
        let dates: Vec<NaiveDate> = dates.into_iter().filter(|d| *d >= start).collect();
        tracing::info!(indicator = %key, count = dates.len(), "release dates");

        stored.indicators.insert(
            key.as_str().to_string(),
            IndicatorReleaseDates {
                key,
                name: config.name.to_string(),
                release_id,
                release_dates: dates,
            },
        );
    }

    write_json_atomic(&dir.release_dates_path(), &stored)?;
    Ok(stored)
}

/// Whether stored data is old enough to refresh.
pub fn is_stale(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    let Some(last) = last_updated else {
        return true;
    };
    match TimeDelta::from_std(interval) {
        Ok(interval) => now - last >= interval,
        Err(_) => false,
    }
}
