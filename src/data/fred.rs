//! FRED API integration for indicator observations and release calendars.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::DataPoint;
use crate::error::AppError;

const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const RELEASE_DATES_URL: &str = "https://api.stlouisfed.org/fred/release/dates";
const RELEASE_DATES_LIMIT: usize = 1000;

/// Anything that can supply raw observations and release calendars.
pub trait ObservationSource {
    /// Observations for `series_id` dated on or after `start`, ascending.
    fn observations(&self, series_id: &str, start: NaiveDate) -> Result<Vec<DataPoint>, AppError>;

    /// Scheduled and past release dates for a FRED release, ascending.
    fn release_dates(&self, release_id: u32, realtime_start: NaiveDate) -> Result<Vec<NaiveDate>, AppError>;
}

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, query: &[(&str, String)]) -> Result<T, AppError> {
        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .query(query)
            .send()
            .map_err(|e| AppError::data(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "FRED request failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::data(format!("Failed to parse FRED response: {e}")))
    }
}

impl ObservationSource for FredClient {
    fn observations(&self, series_id: &str, start: NaiveDate) -> Result<Vec<DataPoint>, AppError> {
        tracing::debug!(series_id, %start, "fetching FRED observations");
        let body: ObservationsResponse = self.get_json(
            OBSERVATIONS_URL,
            &[
                ("series_id", series_id.to_string()),
                ("observation_start", start.format("%Y-%m-%d").to_string()),
                ("sort_order", "asc".to_string()),
            ],
        )?;

        let mut out = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            let Some(value) = parse_value(&obs.value) else {
                continue;
            };
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| AppError::data(format!("Invalid FRED date '{}': {e}", obs.date)))?;
            out.push(DataPoint::new(date, value));
        }
        Ok(out)
    }

    fn release_dates(&self, release_id: u32, realtime_start: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
        tracing::debug!(release_id, "fetching FRED release dates");
        let body: ReleaseDatesResponse = self.get_json(
            RELEASE_DATES_URL,
            &[
                ("release_id", release_id.to_string()),
                ("realtime_start", realtime_start.format("%Y-%m-%d").to_string()),
                ("include_release_dates_with_no_data", "true".to_string()),
                ("sort_order", "asc".to_string()),
                ("limit", RELEASE_DATES_LIMIT.to_string()),
            ],
        )?;

        body.release_dates
            .into_iter()
            .map(|rd| {
                NaiveDate::parse_from_str(&rd.date, "%Y-%m-%d")
                    .map_err(|e| AppError::data(format!("Invalid FRED release date '{}': {e}", rd.date)))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseDatesResponse {
    #[serde(default)]
    release_dates: Vec<ReleaseDate>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDate {
    date: String,
}

/// FRED reports missing observations as `"."`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
