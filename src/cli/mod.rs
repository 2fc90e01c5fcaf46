//! Command-line parsing for the macro dashboard.
//!
//! Argument parsing stays here; command dispatch lives in [`crate::app`].

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{IndicatorKey, PredictionCategory, Stance};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mdash", version, about = "Macro-economic dashboard and prediction journal (FRED + Gemini)")]
pub struct Cli {
    /// Data directory (overrides MDASH_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch new observations from FRED and rebuild combined.json.
    Update(UpdateArgs),
    /// Fetch scheduled release dates from FRED.
    UpdateReleases,
    /// Latest value and last change of every indicator.
    Dashboard,
    /// Print one indicator series as CSV.
    Series(SeriesArgs),
    /// Print the 10Y-2Y yield spread series as CSV.
    Spread(RangeArgs),
    /// Print the current data snapshot.
    Snapshot(SnapshotArgs),
    /// Upcoming release dates and the results of recent releases.
    Schedule,
    /// Inspect or edit the prediction journal.
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Record a prediction for the next release of an indicator.
    Memo(MemoArgs),
    /// Record the actual outcome of a journal entry and get AI feedback.
    Review(ReviewArgs),
    /// Ask the assistant a question about the current data.
    Ask(AskArgs),
}

#[derive(Debug, Args, Clone, Copy)]
pub struct UpdateArgs {
    /// Delete stored data and refetch everything from the start date.
    #[arg(long)]
    pub reset: bool,

    /// Only update when the last refresh is older than MDASH_REFRESH_MINUTES.
    #[arg(long)]
    pub if_stale: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// Look-back window: 1M, 3M, 6M, 1Y, 2Y or ALL.
    #[arg(short, long, default_value = "ALL")]
    pub range: String,
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    #[arg(value_enum)]
    pub indicator: IndicatorKey,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Year-over-year percent change instead of levels.
    #[arg(long)]
    pub yoy: bool,
}

#[derive(Debug, Args, Clone, Copy)]
pub struct SnapshotArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    /// List every entry.
    List,
    /// Show one entry in full.
    Show { id: String },
    /// Delete one entry.
    Delete { id: String },
}

#[derive(Debug, Args, Clone)]
pub struct MemoArgs {
    /// Indicator whose release the prediction is for (fedFundsRate, cpi or nonfarmPayroll).
    #[arg(value_enum)]
    pub indicator: IndicatorKey,

    /// Release date; defaults to the next scheduled release.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    #[arg(long, value_enum)]
    pub category: PredictionCategory,

    /// raise/hold/cut for rate, up/neutral/down for sp500.
    #[arg(long, conflicts_with = "adopt", required_unless_present = "adopt")]
    pub prediction: Option<String>,

    /// Adopt an AI opinion: its outcome becomes the prediction and its summary the memo.
    #[arg(long, value_enum)]
    pub adopt: Option<Stance>,

    #[arg(long)]
    pub memo: Option<String>,

    /// Regenerate AI opinions even if stored ones still match the data.
    #[arg(long)]
    pub refresh_opinions: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewArgs {
    /// Journal entry id.
    pub id: String,

    /// Actual outcome.
    #[arg(long)]
    pub actual: String,

    /// Ask for new feedback even when the outcome is unchanged.
    #[arg(long)]
    pub regenerate_feedback: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// Question; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}
