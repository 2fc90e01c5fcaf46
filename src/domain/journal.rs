//! Prediction journal, scheduled events and AI opinion records.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{DataSnapshot, IndicatorKey};

/// Scheduled data release a prediction can be recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "FOMC")]
    Fomc,
    #[serde(rename = "CPI")]
    Cpi,
    #[serde(rename = "NFP")]
    Nfp,
}

impl EventType {
    pub fn for_indicator(key: IndicatorKey) -> Option<Self> {
        match key {
            IndicatorKey::FedFundsRate => Some(EventType::Fomc),
            IndicatorKey::Cpi => Some(EventType::Cpi),
            IndicatorKey::NonfarmPayroll => Some(EventType::Nfp),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Fomc => "FOMC",
            EventType::Cpi => "CPI",
            EventType::Nfp => "NFP",
        }
    }

    /// Stable id for the event on a given date, e.g. `cpi-2025-11-13`.
    pub fn event_id(self, date: NaiveDate) -> String {
        format!("{}-{}", self.label().to_lowercase(), date.format("%Y-%m-%d"))
    }

    pub fn event_title(self, date: NaiveDate) -> String {
        let month = date.format("%B");
        let year = date.year();
        match self {
            EventType::Fomc => format!("{month} {year} FOMC rate decision"),
            EventType::Cpi => format!("{month} {year} CPI release"),
            EventType::Nfp => format!("{month} {year} Nonfarm Payroll release"),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the prediction is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PredictionCategory {
    /// Interest rate decision.
    Rate,
    /// S&P 500 direction.
    Sp500,
}

impl PredictionCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            PredictionCategory::Rate => "Interest Rate Decision",
            PredictionCategory::Sp500 => "S&P 500 Direction",
        }
    }

    /// Valid prediction/outcome values, ordered bullish to bearish.
    pub fn outcomes(self) -> [&'static str; 3] {
        match self {
            PredictionCategory::Rate => ["raise", "hold", "cut"],
            PredictionCategory::Sp500 => ["up", "neutral", "down"],
        }
    }

    pub fn is_valid_outcome(self, value: &str) -> bool {
        self.outcomes().contains(&value)
    }

    /// Prediction implied by adopting an opinion of the given stance.
    pub fn prediction_for(self, stance: Stance) -> &'static str {
        let [bull, neutral, bear] = self.outcomes();
        match stance {
            Stance::Bullish => bull,
            Stance::Neutral => neutral,
            Stance::Bearish => bear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Bullish,
    Neutral,
    Bearish,
}

impl Stance {
    pub const ALL: [Stance; 3] = [Stance::Bullish, Stance::Neutral, Stance::Bearish];

    pub fn as_str(self) -> &'static str {
        match self {
            Stance::Bullish => "bullish",
            Stance::Neutral => "neutral",
            Stance::Bearish => "bearish",
        }
    }
}

/// One generated perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opinion {
    pub id: String,
    pub stance: Stance,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub key_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionSet {
    pub bullish: Opinion,
    pub neutral: Opinion,
    pub bearish: Opinion,
}

impl OpinionSet {
    pub fn get(&self, stance: Stance) -> &Opinion {
        match stance {
            Stance::Bullish => &self.bullish,
            Stance::Neutral => &self.neutral,
            Stance::Bearish => &self.bearish,
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Opinion> {
        Stance::ALL.into_iter().map(|s| self.get(s)).find(|o| o.id == id)
    }
}

/// Three-stance opinions plus the fingerprint of the data they were built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOpinions {
    pub generated_at: DateTime<Utc>,
    pub data_hash: String,
    pub opinions: OpinionSet,
}

/// Outcome recorded after the release happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub actual: String,
    pub snapshot_after: DataSnapshot,
    #[serde(default)]
    pub ai_feedback: String,
    #[serde(default)]
    pub feedback_generated_at: Option<DateTime<Utc>>,
    pub is_correct: bool,
}

/// Persisted prediction for one scheduled release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub event_id: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub event_title: String,
    pub snapshot: DataSnapshot,
    #[serde(default)]
    pub ai_opinions: Option<AiOpinions>,
    #[serde(default)]
    pub ai_opinions_generated_at: Option<DateTime<Utc>>,
    pub category: PredictionCategory,
    pub prediction: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub used_ai_opinion: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub result: Option<ReleaseResult>,
}

/// Fields supplied when creating an entry; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    pub event_id: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub event_title: String,
    pub snapshot: DataSnapshot,
    pub ai_opinions: Option<AiOpinions>,
    pub category: PredictionCategory,
    pub prediction: String,
    pub memo: String,
    pub used_ai_opinion: Option<String>,
}

impl NewJournalEntry {
    pub fn into_entry(self, id: String, created_at: DateTime<Utc>) -> JournalEntry {
        let ai_opinions_generated_at = self.ai_opinions.as_ref().map(|o| o.generated_at);
        JournalEntry {
            id,
            event_id: self.event_id,
            event_type: self.event_type,
            event_date: self.event_date,
            event_title: self.event_title,
            snapshot: self.snapshot,
            ai_opinions: self.ai_opinions,
            ai_opinions_generated_at,
            category: self.category,
            prediction: self.prediction,
            memo: self.memo,
            used_ai_opinion: self.used_ai_opinion,
            created_at,
            result: None,
        }
    }
}

/// Partial update: only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalPatch {
    pub event_title: Option<String>,
    pub snapshot: Option<DataSnapshot>,
    pub ai_opinions: Option<AiOpinions>,
    pub category: Option<PredictionCategory>,
    pub prediction: Option<String>,
    pub memo: Option<String>,
    pub used_ai_opinion: Option<Option<String>>,
    pub result: Option<ReleaseResult>,
}

impl JournalPatch {
    /// Patch that replaces every user-editable field of a memo.
    pub fn from_new(entry: NewJournalEntry) -> Self {
        Self {
            event_title: Some(entry.event_title),
            snapshot: Some(entry.snapshot),
            ai_opinions: entry.ai_opinions,
            category: Some(entry.category),
            prediction: Some(entry.prediction),
            memo: Some(entry.memo),
            used_ai_opinion: Some(entry.used_ai_opinion),
            result: None,
        }
    }

    pub fn apply(self, entry: &mut JournalEntry) {
        if let Some(title) = self.event_title {
            entry.event_title = title;
        }
        if let Some(snapshot) = self.snapshot {
            entry.snapshot = snapshot;
        }
        if let Some(opinions) = self.ai_opinions {
            entry.ai_opinions_generated_at = Some(opinions.generated_at);
            entry.ai_opinions = Some(opinions);
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(prediction) = self.prediction {
            entry.prediction = prediction;
        }
        if let Some(memo) = self.memo {
            entry.memo = memo;
        }
        if let Some(used) = self.used_ai_opinion {
            entry.used_ai_opinion = used;
        }
        if let Some(result) = self.result {
            entry.result = Some(result);
        }
    }
}

/// On-disk journal document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
}
