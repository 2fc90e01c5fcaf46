//! Shared observation and indicator types.
//!
//! These types are kept lightweight and serializable so the same values can be
//! stored in the JSON data directory, embedded into model prompts, and shown in
//! terminal output.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One observation of one indicator.
///
/// `date` serializes as zero-padded ISO `YYYY-MM-DD`, so ordering by date and
/// ordering by the serialized string agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// The fixed set of tracked indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum IndicatorKey {
    Treasury2y,
    Treasury10y,
    FedFundsRate,
    Cpi,
    NonfarmPayroll,
    Vix,
    Sp500,
    HySpread,
    SahmRule,
    Unemployment,
}

impl IndicatorKey {
    pub const ALL: [IndicatorKey; 10] = [
        IndicatorKey::Treasury2y,
        IndicatorKey::Treasury10y,
        IndicatorKey::FedFundsRate,
        IndicatorKey::Cpi,
        IndicatorKey::NonfarmPayroll,
        IndicatorKey::Vix,
        IndicatorKey::Sp500,
        IndicatorKey::HySpread,
        IndicatorKey::SahmRule,
        IndicatorKey::Unemployment,
    ];

    /// Key used in stored JSON and prompt payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKey::Treasury2y => "treasury2y",
            IndicatorKey::Treasury10y => "treasury10y",
            IndicatorKey::FedFundsRate => "fedFundsRate",
            IndicatorKey::Cpi => "cpi",
            IndicatorKey::NonfarmPayroll => "nonfarmPayroll",
            IndicatorKey::Vix => "vix",
            IndicatorKey::Sp500 => "sp500",
            IndicatorKey::HySpread => "hySpread",
            IndicatorKey::SahmRule => "sahmRule",
            IndicatorKey::Unemployment => "unemployment",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }

    pub fn config(self) -> &'static IndicatorConfig {
        // The catalog is declared in `ALL` order.
        &INDICATOR_CONFIGS[self as usize]
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling cadence of a FRED series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
}

/// Static description of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub key: IndicatorKey,
    pub name: &'static str,
    pub description: &'static str,
    /// Display unit: `%`, `K`, `%p`, or empty.
    pub unit: &'static str,
    /// FRED series id.
    pub series_id: &'static str,
    pub frequency: Frequency,
    /// FRED release id used to look up scheduled release dates.
    pub release_id: Option<u32>,
}

pub const INDICATOR_CONFIGS: [IndicatorConfig; 10] = [
    IndicatorConfig {
        key: IndicatorKey::Treasury2y,
        name: "2Y Treasury",
        description: "2-year Treasury yield",
        unit: "%",
        series_id: "DGS2",
        frequency: Frequency::Daily,
        release_id: Some(18), // H.15 Selected Interest Rates
    },
    IndicatorConfig {
        key: IndicatorKey::Treasury10y,
        name: "10Y Treasury",
        description: "10-year Treasury yield",
        unit: "%",
        series_id: "DGS10",
        frequency: Frequency::Daily,
        release_id: Some(18),
    },
    IndicatorConfig {
        key: IndicatorKey::FedFundsRate,
        name: "Fed Funds Rate",
        description: "Effective federal funds rate",
        unit: "%",
        series_id: "FEDFUNDS",
        frequency: Frequency::Monthly,
        release_id: Some(18),
    },
    IndicatorConfig {
        key: IndicatorKey::Cpi,
        name: "CPI",
        description: "Consumer price index",
        unit: "",
        series_id: "CPIAUCSL",
        frequency: Frequency::Monthly,
        release_id: Some(10), // Consumer Price Index
    },
    IndicatorConfig {
        key: IndicatorKey::NonfarmPayroll,
        name: "Nonfarm Payroll",
        description: "Total nonfarm payrolls",
        unit: "K",
        series_id: "PAYEMS",
        frequency: Frequency::Monthly,
        release_id: Some(50), // Employment Situation
    },
    IndicatorConfig {
        key: IndicatorKey::Vix,
        name: "VIX",
        description: "CBOE volatility index",
        unit: "",
        series_id: "VIXCLS",
        frequency: Frequency::Daily,
        release_id: None,
    },
    IndicatorConfig {
        key: IndicatorKey::Sp500,
        name: "S&P 500",
        description: "S&P 500 index level",
        unit: "",
        series_id: "SP500",
        frequency: Frequency::Daily,
        release_id: None,
    },
    IndicatorConfig {
        key: IndicatorKey::HySpread,
        name: "HY Spread",
        description: "ICE BofA US high yield option-adjusted spread",
        unit: "%",
        series_id: "BAMLH0A0HYM2",
        frequency: Frequency::Daily,
        release_id: None,
    },
    IndicatorConfig {
        key: IndicatorKey::SahmRule,
        name: "Sahm Rule",
        description: "Real-time Sahm rule recession indicator",
        unit: "%p",
        series_id: "SAHMREALTIME",
        frequency: Frequency::Monthly,
        release_id: None,
    },
    IndicatorConfig {
        key: IndicatorKey::Unemployment,
        name: "Unemployment Rate",
        description: "Civilian unemployment rate",
        unit: "%",
        series_id: "UNRATE",
        frequency: Frequency::Monthly,
        release_id: Some(50),
    },
];

/// One stored indicator file (`<key>.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSeries {
    #[serde(default)]
    pub data: Vec<DataPoint>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Every indicator series keyed by its JSON key, plus the refresh time.
///
/// Unknown keys are kept as-is; missing keys read as empty series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedData {
    #[serde(default)]
    pub indicators: BTreeMap<String, Vec<DataPoint>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CombinedData {
    pub fn series(&self, key: IndicatorKey) -> &[DataPoint] {
        self.indicators
            .get(key.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_series(&mut self, key: IndicatorKey, data: Vec<DataPoint>) {
        self.indicators.insert(key.as_str().to_string(), data);
    }
}

/// Flattened point-in-time summary of every indicator.
///
/// Unavailable values are `0.0`, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSnapshot {
    pub treasury2y: f64,
    pub treasury10y: f64,
    pub fed_funds_rate: f64,
    pub cpi: f64,
    #[serde(rename = "cpiYoY")]
    pub cpi_yoy: f64,
    pub nonfarm_payroll: f64,
    pub vix: f64,
    pub sp500: f64,
    pub hy_spread: f64,
    pub sahm_rule: f64,
    pub unemployment: f64,
    /// 10Y minus 2Y.
    pub yield_spread: f64,
    /// Fed funds minus CPI YoY.
    pub real_rate: f64,
    pub timestamp: DateTime<Utc>,
}

impl DataSnapshot {
    /// Snapshot field (by JSON key) with its display label and unit.
    pub const FIELDS: [(&'static str, &'static str, &'static str); 13] = [
        ("treasury2y", "2Y Treasury", "%"),
        ("treasury10y", "10Y Treasury", "%"),
        ("yieldSpread", "10Y-2Y Spread", "%"),
        ("fedFundsRate", "Fed Funds Rate", "%"),
        ("cpi", "CPI", ""),
        ("cpiYoY", "CPI YoY", "%"),
        ("realRate", "Real Rate", "%"),
        ("nonfarmPayroll", "Nonfarm Payroll", "K"),
        ("unemployment", "Unemployment Rate", "%"),
        ("sahmRule", "Sahm Rule", "%p"),
        ("vix", "VIX", ""),
        ("sp500", "S&P 500", ""),
        ("hySpread", "HY Spread", "%"),
    ];

    /// Look up a numeric field by its JSON key.
    pub fn field(&self, key: &str) -> Option<f64> {
        Some(match key {
            "treasury2y" => self.treasury2y,
            "treasury10y" => self.treasury10y,
            "fedFundsRate" => self.fed_funds_rate,
            "cpi" => self.cpi,
            "cpiYoY" => self.cpi_yoy,
            "nonfarmPayroll" => self.nonfarm_payroll,
            "vix" => self.vix,
            "sp500" => self.sp500,
            "hySpread" => self.hy_spread,
            "sahmRule" => self.sahm_rule,
            "unemployment" => self.unemployment,
            "yieldSpread" => self.yield_spread,
            "realRate" => self.real_rate,
            _ => return None,
        })
    }
}

/// Chart/table look-back window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "2Y")]
    TwoYears,
    #[serde(rename = "ALL")]
    All,
}

impl DateRange {
    pub const ALL_RANGES: [DateRange; 6] = [
        DateRange::OneMonth,
        DateRange::ThreeMonths,
        DateRange::SixMonths,
        DateRange::OneYear,
        DateRange::TwoYears,
        DateRange::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DateRange::OneMonth => "1M",
            DateRange::ThreeMonths => "3M",
            DateRange::SixMonths => "6M",
            DateRange::OneYear => "1Y",
            DateRange::TwoYears => "2Y",
            DateRange::All => "ALL",
        }
    }

    /// Strict parse (case-insensitive).
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL_RANGES
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(raw))
    }

    /// Parse a range label, treating anything unrecognized as `All`.
    pub fn from_label_or_all(raw: &str) -> Self {
        match Self::from_label(raw) {
            Some(range) => range,
            None => {
                tracing::warn!(range = raw, "unknown date range, showing all data");
                DateRange::All
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
