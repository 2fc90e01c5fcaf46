//! Plain-text rendering of dashboard, snapshot, journal and schedule views.
//!
//! Formatting lives in one place so command handlers only choose what to print.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{AiOpinions, DataPoint, DataSnapshot, JournalEntry, Stance};
use crate::io::schedule::UpcomingRelease;
use crate::report::{DashboardRow, FieldComparison, RecentRelease};
use crate::series::{format_delta, format_value};

const NO_VALUE: &str = "-";

pub fn format_dashboard(rows: &[DashboardRow], snapshot: &DataSnapshot, last_updated: Option<DateTime<Utc>>) -> String {
    let mut out = String::new();

    out.push_str("=== mdash - Macro Dashboard ===\n");
    out.push_str(&format!("Last updated: {}\n\n", format_timestamp(last_updated)));

    push_row(
        &mut out,
        &format!(
            "{:<20} {:>12} {:>10} {:>9} {:<10}",
            "indicator", "latest", "change", "change%", "date"
        ),
    );
    push_rule(&mut out, &[20, 12, 10, 9, 10]);

    for row in rows {
        let config = row.key.config();
        let latest = row
            .latest
            .as_ref()
            .map(|p| format_value(p.value, config.unit, config.key.as_str()))
            .unwrap_or_else(|| NO_VALUE.to_string());
        let (delta, percent) = match row.change {
            Some(c) => (
                format_delta(c.value, config.unit),
                c.percent.map(|p| format_delta(p, "%")).unwrap_or_else(|| NO_VALUE.to_string()),
            ),
            None => (NO_VALUE.to_string(), NO_VALUE.to_string()),
        };
        let date = row
            .latest
            .as_ref()
            .map(|p| p.date.to_string())
            .unwrap_or_else(|| NO_VALUE.to_string());
        push_row(
            &mut out,
            &format!(
                "{:<20} {:>12} {:>10} {:>9} {:<10}",
                truncate(config.name, 20),
                latest,
                delta,
                percent,
                date
            ),
        );
    }

    out.push_str("\nDerived:\n");
    out.push_str(&format!("- CPI YoY      : {}\n", format_value(snapshot.cpi_yoy, "%", "cpiYoY")));
    out.push_str(&format!(
        "- 10Y-2Y spread: {}\n",
        format_value(snapshot.yield_spread, "%", "yieldSpread")
    ));
    out.push_str(&format!("- Real rate    : {}\n", format_value(snapshot.real_rate, "%", "realRate")));

    out
}

pub fn format_snapshot(snapshot: &DataSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Snapshot at {}\n", snapshot.timestamp.format("%Y-%m-%d %H:%M UTC")));
    for (key, label, unit) in DataSnapshot::FIELDS {
        let value = snapshot.field(key).unwrap_or(0.0);
        push_row(&mut out, &format!("  {label:<18} {:>12}", format_value(value, unit, key)));
    }
    out
}

/// Field-by-field before/after table.
pub fn format_comparison(rows: &[FieldComparison]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &format!(
            "{:<18} {:>12} {:>12} {:>10} {:>9}",
            "field", "before", "after", "change", "change%"
        ),
    );
    push_rule(&mut out, &[18, 12, 12, 10, 9]);
    for row in rows {
        let percent = row
            .percent
            .map(|p| format_delta(p, "%"))
            .unwrap_or_else(|| NO_VALUE.to_string());
        push_row(
            &mut out,
            &format!(
                "{:<18} {:>12} {:>12} {:>10} {:>9}",
                row.label,
                format_value(row.before, row.unit, row.key),
                format_value(row.after, row.unit, row.key),
                format_delta(row.delta, row.unit),
                percent
            ),
        );
    }
    out
}

pub fn format_opinions(opinions: &AiOpinions) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "AI opinions (generated {}, data {})\n",
        opinions.generated_at.format("%Y-%m-%d %H:%M UTC"),
        opinions.data_hash
    ));
    for stance in Stance::ALL {
        let opinion = opinions.opinions.get(stance);
        out.push_str(&format!("\n[{}] {}\n", stance.as_str().to_uppercase(), opinion.title));
        if !opinion.summary.is_empty() {
            out.push_str(&format!("  {}\n", opinion.summary));
        }
        if !opinion.key_indicators.is_empty() {
            out.push_str(&format!("  Key indicators: {}\n", opinion.key_indicators.join(", ")));
        }
        if !opinion.reasoning.is_empty() {
            out.push_str(&format!("  Reasoning: {}\n", opinion.reasoning));
        }
    }
    out
}

pub fn format_journal_list(entries: &[JournalEntry]) -> String {
    if entries.is_empty() {
        return "No journal entries.\n".to_string();
    }

    let mut out = String::new();
    push_row(
        &mut out,
        &format!(
            "{:<36} {:<10} {:<32} {:<8} {:<10} {:<8}",
            "id", "date", "event", "category", "prediction", "result"
        ),
    );
    push_rule(&mut out, &[36, 10, 32, 8, 10, 8]);
    for entry in entries {
        push_row(
            &mut out,
            &format!(
                "{:<36} {:<10} {:<32} {:<8} {:<10} {:<8}",
                entry.id,
                entry.event_date,
                truncate(&entry.event_title, 32),
                category_label(entry),
                entry.prediction,
                result_label(entry)
            ),
        );
    }
    out
}

pub fn format_entry(entry: &JournalEntry) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", entry.event_title));
    out.push_str(&format!("id        : {}\n", entry.id));
    out.push_str(&format!("event     : {} ({})\n", entry.event_id, entry.event_type));
    out.push_str(&format!("date      : {}\n", entry.event_date));
    out.push_str(&format!("category  : {}\n", entry.category.display_name()));
    out.push_str(&format!("prediction: {}\n", entry.prediction));
    if let Some(used) = &entry.used_ai_opinion {
        let stance = entry
            .ai_opinions
            .as_ref()
            .and_then(|o| o.opinions.find_by_id(used))
            .map(|o| o.stance.as_str())
            .unwrap_or("unknown");
        out.push_str(&format!("adopted   : {stance} opinion ({used})\n"));
    }
    out.push_str(&format!("created   : {}\n", entry.created_at.format("%Y-%m-%d %H:%M UTC")));
    if !entry.memo.is_empty() {
        out.push_str(&format!("\nMemo:\n{}\n", entry.memo));
    }

    out.push('\n');
    out.push_str(&format_snapshot(&entry.snapshot));

    if let Some(opinions) = &entry.ai_opinions {
        out.push('\n');
        out.push_str(&format_opinions(opinions));
    }

    if let Some(result) = &entry.result {
        out.push_str(&format!(
            "\nResult: {} ({})\n\n",
            result.actual,
            if result.is_correct { "correct" } else { "incorrect" }
        ));
        out.push_str(&format_comparison(&crate::report::compare_snapshots(
            &entry.snapshot,
            &result.snapshot_after,
        )));
        if !result.ai_feedback.is_empty() {
            out.push_str(&format!("\nAI feedback:\n{}\n", result.ai_feedback));
        }
    }

    out
}

pub fn format_upcoming(releases: &[UpcomingRelease], today: NaiveDate) -> String {
    if releases.is_empty() {
        return "No upcoming releases. Run `mdash update-releases` to fetch the schedule.\n".to_string();
    }

    let mut out = String::new();
    push_row(
        &mut out,
        &format!("{:<10} {:>6} {:<20} {:<40}", "date", "in", "indicator", "description"),
    );
    push_rule(&mut out, &[10, 6, 20, 40]);
    for release in releases {
        let days = release.days_until(today);
        let when = if days == 0 { "today".to_string() } else { format!("D-{days}") };
        push_row(
            &mut out,
            &format!(
                "{:<10} {:>6} {:<20} {:<40}",
                release.date,
                when,
                truncate(release.name, 20),
                truncate(release.description, 40)
            ),
        );
    }
    out
}

/// Previous and published value of each recent release.
pub fn format_recent_releases(releases: &[RecentRelease]) -> String {
    if releases.is_empty() {
        return "No recent release results.\n".to_string();
    }

    let mut out = String::new();
    push_row(
        &mut out,
        &format!(
            "{:<10} {:<20} {:>12} {:>12} {:>10} {:>9}",
            "released", "indicator", "previous", "current", "change", "change%"
        ),
    );
    push_rule(&mut out, &[10, 20, 12, 12, 10, 9]);
    for release in releases {
        let config = release.key.config();
        let key = config.key.as_str();
        let percent = release
            .change
            .percent
            .map(|p| format_delta(p, "%"))
            .unwrap_or_else(|| NO_VALUE.to_string());
        push_row(
            &mut out,
            &format!(
                "{:<10} {:<20} {:>12} {:>12} {:>10} {:>9}",
                release.release_date,
                truncate(config.name, 20),
                format_value(release.previous.value, config.unit, key),
                format_value(release.current.value, config.unit, key),
                format_delta(release.change.value, config.unit),
                percent
            ),
        );
    }
    out
}

/// `date,value` CSV, one line per point.
pub fn format_series_csv(points: &[DataPoint]) -> String {
    let mut out = String::from("date,value\n");
    for p in points {
        out.push_str(&format!("{},{}\n", p.date, p.value));
    }
    out
}

fn category_label(entry: &JournalEntry) -> &'static str {
    match entry.category {
        crate::domain::PredictionCategory::Rate => "rate",
        crate::domain::PredictionCategory::Sp500 => "sp500",
    }
}

fn result_label(entry: &JournalEntry) -> &'static str {
    match &entry.result {
        None => "pending",
        Some(r) if r.is_correct => "correct",
        Some(_) => "wrong",
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn push_row(out: &mut String, row: &str) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn push_rule(out: &mut String, widths: &[usize]) {
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(out, &rule.join(" "));
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReleaseResult;
    use crate::io::journal::tests::new_entry;
    use crate::report::{compare_snapshots, dashboard_rows};
    use crate::snapshot::create_data_snapshot;
    use crate::snapshot::tests::{d, fixed_now, sample_data};

    #[test]
    fn dashboard_shows_latest_values_and_placeholders() {
        let data = sample_data();
        let snapshot = create_data_snapshot(&data, fixed_now());
        let text = format_dashboard(&dashboard_rows(&data), &snapshot, data.last_updated);

        let line = |name: &str| text.lines().find(|l| l.starts_with(name)).unwrap().to_string();
        assert!(line("10Y Treasury").contains("4.25%"));
        assert!(line("10Y Treasury").contains("-0.05%"));
        assert!(line("S&P 500").contains("5,432"));
        assert!(line("HY Spread").contains(" - "));
        assert!(text.contains("10Y-2Y spread: -0.45%"));
    }

    #[test]
    fn comparison_marks_zero_base_percent() {
        let before = create_data_snapshot(&Default::default(), fixed_now());
        let after = create_data_snapshot(&sample_data(), fixed_now());
        let text = format_comparison(&compare_snapshots(&before, &after));
        let vix = text.lines().find(|l| l.starts_with("VIX")).unwrap();
        assert!(vix.contains("+12.66"));
        assert!(vix.trim_end().ends_with('-'));
    }

    #[test]
    fn journal_list_reports_result_state() {
        let mut reviewed = new_entry("cpi-2024-07-11").into_entry("a".to_string(), fixed_now());
        reviewed.result = Some(ReleaseResult {
            actual: "hold".to_string(),
            snapshot_after: reviewed.snapshot.clone(),
            ai_feedback: String::new(),
            feedback_generated_at: None,
            is_correct: true,
        });
        let pending = new_entry("cpi-2024-08-14").into_entry("b".to_string(), fixed_now());

        let text = format_journal_list(&[reviewed, pending]);
        assert!(text.lines().any(|l| l.starts_with("a ") && l.contains("correct")));
        assert!(text.lines().any(|l| l.starts_with("b ") && l.contains("pending")));
        assert_eq!(format_journal_list(&[]), "No journal entries.\n");
    }

    #[test]
    fn entry_names_the_adopted_stance() {
        let mut next = 0;
        let opinions = crate::ai::opinions::parse_opinions(
            crate::ai::tasks::tests::OPINIONS_JSON,
            "h".to_string(),
            fixed_now(),
            || {
                next += 1;
                format!("op-{next}")
            },
        )
        .unwrap();
        let mut entry = new_entry("cpi-2024-07-11").into_entry("a".to_string(), fixed_now());
        entry.used_ai_opinion = Some(opinions.opinions.bearish.id.clone());
        entry.ai_opinions = Some(opinions);

        let text = format_entry(&entry);
        assert!(text.contains("adopted   : bearish opinion (op-3)"));
    }

    #[test]
    fn upcoming_shows_days_until() {
        let release = UpcomingRelease {
            key: crate::domain::IndicatorKey::Cpi,
            name: "CPI",
            description: "Consumer price index",
            date: d(2024, 7, 11),
        };
        let text = format_upcoming(&[release], d(2024, 7, 1));
        assert!(text.contains("D-10"));
    }

    #[test]
    fn recent_releases_show_previous_and_current() {
        let release = RecentRelease {
            key: crate::domain::IndicatorKey::Unemployment,
            release_date: d(2024, 7, 5),
            previous: DataPoint::new(d(2024, 5, 1), 0.0),
            current: DataPoint::new(d(2024, 6, 1), 4.1),
            change: crate::series::Change {
                value: 4.1,
                percent: None,
            },
        };
        let text = format_recent_releases(&[release]);
        let row = text.lines().find(|l| l.starts_with("2024-07-05")).unwrap();
        assert!(row.contains("4.10%"));
        assert!(row.trim_end().ends_with('-'));
        assert_eq!(format_recent_releases(&[]), "No recent release results.\n");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let points = vec![DataPoint::new(d(2024, 1, 1), 0.5)];
        assert_eq!(format_series_csv(&points), "date,value\n2024-01-01,0.5\n");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
