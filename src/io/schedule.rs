//! Scheduled release dates per indicator.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::IndicatorKey;

/// Read-only source of release dates.
pub trait ReleaseSchedule {
    /// Every known release date for the indicator, ascending.
    fn all_release_dates(&self, key: IndicatorKey) -> Vec<NaiveDate>;

    /// First release on or after `today`.
    fn next_release_date(&self, key: IndicatorKey, today: NaiveDate) -> Option<NaiveDate> {
        self.all_release_dates(key).into_iter().find(|d| *d >= today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReleaseDates {
    pub key: IndicatorKey,
    pub name: String,
    pub release_id: u32,
    #[serde(default)]
    pub release_dates: Vec<NaiveDate>,
}

/// `releaseDates.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReleaseDates {
    #[serde(default)]
    pub indicators: BTreeMap<String, IndicatorReleaseDates>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ReleaseSchedule for StoredReleaseDates {
    fn all_release_dates(&self, key: IndicatorKey) -> Vec<NaiveDate> {
        let mut dates = self
            .indicators
            .get(key.as_str())
            .map(|entry| entry.release_dates.clone())
            .unwrap_or_default();
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}

/// Next scheduled release of one indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingRelease {
    pub key: IndicatorKey,
    pub name: &'static str,
    pub description: &'static str,
    pub date: NaiveDate,
}

impl UpcomingRelease {
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}

/// Next release for every catalog indicator that has one, soonest first.
pub fn upcoming_releases(schedule: &dyn ReleaseSchedule, today: NaiveDate) -> Vec<UpcomingRelease> {
    let mut out: Vec<UpcomingRelease> = IndicatorKey::ALL
        .into_iter()
        .filter(|key| key.config().release_id.is_some())
        .filter_map(|key| {
            let config = key.config();
            schedule.next_release_date(key, today).map(|date| UpcomingRelease {
                key,
                name: config.name,
                description: config.description,
                date,
            })
        })
        .collect();
    // Stable sort keeps catalog order for releases on the same day.
    out.sort_by_key(|r| r.date);
    out
}
