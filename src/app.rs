//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module parses the
//! CLI, loads configuration, initializes logging and dispatches each command.

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::ai::{GeminiClient, TextGenerator};
use crate::cli::{Cli, Command, JournalCommand, MemoArgs, RangeArgs, ReviewArgs, SeriesArgs, UpdateArgs};
use crate::config::AppConfig;
use crate::data::{FredClient, UpdateOptions, is_stale, update_indicators, update_release_dates};
use crate::domain::{CombinedData, DateRange, IndicatorKey};
use crate::error::AppError;
use crate::io::dataset::{DataDir, read_json_opt};
use crate::io::journal::{JournalStore, JsonJournal};
use crate::io::schedule::{StoredReleaseDates, upcoming_releases};
use crate::series::{calculate_yield_spread, calculate_yoy, filter_by_date_range};

pub mod pipeline;

/// Entry point for the `mdash` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let dir = DataDir::new(&config.data_dir);
    tracing::debug!(data_dir = %dir.root().display(), "configuration loaded");

    match cli.command {
        Command::Update(args) => handle_update(&config, &dir, args),
        Command::UpdateReleases => handle_update_releases(&config, &dir),
        Command::Dashboard => handle_dashboard(&dir),
        Command::Series(args) => handle_series(&dir, &args),
        Command::Spread(args) => handle_spread(&dir, &args),
        Command::Snapshot(args) => handle_snapshot(&dir, args.json),
        Command::Schedule => handle_schedule(&dir),
        Command::Journal(cmd) => handle_journal(&dir, cmd),
        Command::Memo(args) => handle_memo(&config, &dir, args),
        Command::Review(args) => handle_review(&config, &dir, args),
        Command::Ask(args) => handle_ask(&config, &dir, &args.question.join(" ")),
    }
}

/// Logs go to stderr so stdout stays clean for tables, CSV and JSON.
fn init_tracing(verbose: bool) {
    let default = if verbose { "macro_dash=debug" } else { "macro_dash=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_update(config: &AppConfig, dir: &DataDir, args: UpdateArgs) -> Result<(), AppError> {
    let now = Utc::now();
    if args.if_stale && !args.reset {
        let last_updated = dir.load_combined_opt()?.and_then(|c| c.last_updated);
        if !is_stale(last_updated, now, config.refresh_interval) {
            tracing::info!(?last_updated, "data is fresh, skipping update");
            println!("Data is up to date.");
            return Ok(());
        }
    }

    let client = FredClient::new(config.require_fred_key()?);
    let options = UpdateOptions {
        reset: args.reset,
        start_date: config.start_date,
    };
    let report = update_indicators(&client, dir, options, now)?;

    for update in &report.indicators {
        println!("{:<16} {:?} (total {})", update.key.as_str(), update.outcome, update.total);
    }
    let failed = report.failures().count();
    if failed == report.indicators.len() {
        return Err(AppError::data("Every indicator failed to update."));
    }
    if failed > 0 {
        println!("{failed} indicator(s) failed; see log output.");
    }
    Ok(())
}

fn handle_update_releases(config: &AppConfig, dir: &DataDir) -> Result<(), AppError> {
    let client = FredClient::new(config.require_fred_key()?);
    let stored = update_release_dates(&client, dir, config.start_date, Utc::now())?;
    for (key, entry) in &stored.indicators {
        println!("{key:<16} {} release dates", entry.release_dates.len());
    }
    Ok(())
}

fn handle_dashboard(dir: &DataDir) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let snapshot = crate::snapshot::capture_snapshot(&data);
    let rows = crate::report::dashboard_rows(&data);
    print!("{}", crate::report::format_dashboard(&rows, &snapshot, data.last_updated));
    Ok(())
}

fn handle_series(dir: &DataDir, args: &SeriesArgs) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let range = DateRange::from_label_or_all(&args.range.range);
    let series = data.series(args.indicator);
    let points = if args.yoy { calculate_yoy(series) } else { series.to_vec() };
    let points = filter_by_date_range(&points, range, today());
    print!("{}", crate::report::format_series_csv(&points));
    Ok(())
}

fn handle_spread(dir: &DataDir, args: &RangeArgs) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let range = DateRange::from_label_or_all(&args.range);
    let spread = calculate_yield_spread(
        data.series(IndicatorKey::Treasury10y),
        data.series(IndicatorKey::Treasury2y),
    );
    let points = filter_by_date_range(&spread, range, today());
    print!("{}", crate::report::format_series_csv(&points));
    Ok(())
}

fn handle_snapshot(dir: &DataDir, json: bool) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let snapshot = crate::snapshot::capture_snapshot(&data);
    if json {
        let text = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| AppError::data(format!("Failed to serialize snapshot: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", crate::report::format_snapshot(&snapshot));
    }
    Ok(())
}

fn handle_schedule(dir: &DataDir) -> Result<(), AppError> {
    let schedule = load_schedule(dir)?;
    let today = today();
    let upcoming = upcoming_releases(&schedule, today);
    print!("{}", crate::report::format_upcoming(&upcoming, today));

    // Results need observations; without combined.json only the schedule is shown.
    if let Some(data) = dir.load_combined_opt()? {
        let recent = crate::report::recent_release_results(&data, &schedule, today);
        println!("\nRecent releases:");
        print!("{}", crate::report::format_recent_releases(&recent));
    }
    Ok(())
}

fn handle_journal(dir: &DataDir, cmd: JournalCommand) -> Result<(), AppError> {
    let store = JsonJournal::new(dir.journal_path());
    match cmd {
        JournalCommand::List => {
            let mut entries = store.list()?;
            entries.sort_by(|a, b| b.event_date.cmp(&a.event_date));
            print!("{}", crate::report::format_journal_list(&entries));
        }
        JournalCommand::Show { id } => {
            let entry = store
                .get(&id)?
                .ok_or_else(|| AppError::not_found(format!("Journal entry '{id}' not found.")))?;
            print!("{}", crate::report::format_entry(&entry));
        }
        JournalCommand::Delete { id } => {
            if !store.delete(&id)? {
                return Err(AppError::not_found(format!("Journal entry '{id}' not found.")));
            }
            println!("Deleted {id}.");
        }
    }
    Ok(())
}

fn handle_memo(config: &AppConfig, dir: &DataDir, args: MemoArgs) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let schedule = load_schedule(dir)?;
    let (event_type, event_date) = pipeline::resolve_event(args.indicator, args.date, &schedule, today())?;

    let gemini = optional_generator(config);
    let store = JsonJournal::new(dir.journal_path());
    let request = pipeline::MemoRequest {
        event_type,
        event_date,
        category: args.category,
        prediction: args.prediction,
        adopt: args.adopt,
        memo: args.memo,
        refresh_opinions: args.refresh_opinions,
    };
    let outcome = pipeline::record_memo(
        &store,
        gemini.as_ref().map(|g| g as &dyn TextGenerator),
        &data,
        request,
        &config.ai_language,
        Utc::now(),
    )?;

    if let Some(opinions) = &outcome.entry.ai_opinions {
        print!("{}", crate::report::format_opinions(opinions));
        println!();
    }
    if let pipeline::OpinionStatus::Failed(reason) = &outcome.opinions {
        println!("AI opinions unavailable: {reason}");
    }
    let verb = if outcome.created { "Saved" } else { "Updated" };
    println!(
        "{verb} {} for {}: {} ({})",
        outcome.entry.id, outcome.entry.event_title, outcome.entry.prediction, outcome.entry.category.display_name()
    );
    Ok(())
}

fn handle_review(config: &AppConfig, dir: &DataDir, args: ReviewArgs) -> Result<(), AppError> {
    let data = dir.load_combined()?;
    let gemini = optional_generator(config);
    let store = JsonJournal::new(dir.journal_path());
    let outcome = pipeline::review_entry(
        &store,
        gemini.as_ref().map(|g| g as &dyn TextGenerator),
        &data,
        &args.id,
        &args.actual,
        args.regenerate_feedback,
        &config.ai_language,
        Utc::now(),
    )?;

    print!("{}", crate::report::format_entry(&outcome.entry));
    if let pipeline::FeedbackStatus::Failed(reason) = &outcome.feedback {
        println!("\nAI feedback unavailable: {reason}");
    }
    Ok(())
}

fn handle_ask(config: &AppConfig, dir: &DataDir, question: &str) -> Result<(), AppError> {
    let data = dir.load_combined_opt()?.unwrap_or_else(|| {
        tracing::warn!("no combined data, asking without market context");
        CombinedData::default()
    });
    let mut gemini = GeminiClient::new(config.gemini_api_key.as_deref(), config.gemini_model.clone())?;
    gemini.resolve_model()?;
    let answer = pipeline::ask(&gemini, &data, question, &config.ai_language)?;
    println!("{answer}");
    Ok(())
}

/// Gemini client when an API key is configured.
fn optional_generator(config: &AppConfig) -> Option<GeminiClient> {
    match GeminiClient::new(config.gemini_api_key.as_deref(), config.gemini_model.clone()) {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::info!(reason = %err, "AI features disabled");
            None
        }
    }
}

/// Missing `releaseDates.json` reads as an empty schedule.
fn load_schedule(dir: &DataDir) -> Result<StoredReleaseDates, AppError> {
    Ok(read_json_opt(&dir.release_dates_path())?.unwrap_or_default())
}

/// Calendar day in UTC, the same boundary FRED observations and release dates use.
fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}
