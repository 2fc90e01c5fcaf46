//! Point-in-time summaries of the indicator set.
//!
//! - `create_data_snapshot`: zero-filled `DataSnapshot` used in prompts and journal entries
//! - `fingerprint`: coarse hash deciding whether stored AI opinions can be reused
//! - `context`: null-preserving summary embedded into chat prompts

pub mod context;
pub mod fingerprint;

pub use context::*;
pub use fingerprint::*;

use chrono::{DateTime, Utc};

use crate::domain::{CombinedData, DataSnapshot, IndicatorKey};
use crate::series::{calculate_yield_spread, calculate_yoy, latest_value, round2};

/// Build a snapshot from the latest value of every indicator.
///
/// Anything unavailable is `0.0`. `real_rate` is only computed when both the
/// fed funds rate and CPI YoY exist.
pub fn create_data_snapshot(data: &CombinedData, now: DateTime<Utc>) -> DataSnapshot {
    let latest = |key: IndicatorKey| latest_value(data.series(key)).map(|p| p.value);
    let or_zero = |key: IndicatorKey| latest(key).unwrap_or(0.0);

    let cpi_yoy = latest_value(&calculate_yoy(data.series(IndicatorKey::Cpi))).map(|p| p.value);
    let yield_spread = latest_value(&calculate_yield_spread(
        data.series(IndicatorKey::Treasury10y),
        data.series(IndicatorKey::Treasury2y),
    ))
    .map(|p| p.value)
    .unwrap_or(0.0);
    let real_rate = match (latest(IndicatorKey::FedFundsRate), cpi_yoy) {
        (Some(ff), Some(yoy)) => round2(ff - yoy),
        _ => 0.0,
    };

    DataSnapshot {
        treasury2y: or_zero(IndicatorKey::Treasury2y),
        treasury10y: or_zero(IndicatorKey::Treasury10y),
        fed_funds_rate: or_zero(IndicatorKey::FedFundsRate),
        cpi: or_zero(IndicatorKey::Cpi),
        cpi_yoy: cpi_yoy.unwrap_or(0.0),
        nonfarm_payroll: or_zero(IndicatorKey::NonfarmPayroll),
        vix: or_zero(IndicatorKey::Vix),
        sp500: or_zero(IndicatorKey::Sp500),
        hy_spread: or_zero(IndicatorKey::HySpread),
        sahm_rule: or_zero(IndicatorKey::SahmRule),
        unemployment: or_zero(IndicatorKey::Unemployment),
        yield_spread,
        real_rate,
        timestamp: now,
    }
}

/// [`create_data_snapshot`] stamped with the current time.
pub fn capture_snapshot(data: &CombinedData) -> DataSnapshot {
    create_data_snapshot(data, Utc::now())
}
