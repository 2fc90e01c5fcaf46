//! Journal workflows shared by the command handlers:
//! snapshot -> opinions (reuse or generate) -> prediction -> journal entry,
//! and later actual outcome -> feedback -> result.
//!
//! Every collaborator is passed in, so the workflows run against stub
//! generators and temporary journals in tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::ai::{self, AiError, ChatMessage, TextGenerator};
use crate::domain::{
    AiOpinions, CombinedData, EventType, IndicatorKey, JournalEntry, JournalPatch, NewJournalEntry,
    PredictionCategory, ReleaseResult, Stance,
};
use crate::error::AppError;
use crate::io::journal::JournalStore;
use crate::io::schedule::ReleaseSchedule;
use crate::snapshot::{build_chat_context, create_data_snapshot, opinion_freshness};

/// Event type and date for a prediction on `key`.
///
/// Without an explicit date the next scheduled release on or after `today` is used.
pub fn resolve_event(
    key: IndicatorKey,
    date: Option<NaiveDate>,
    schedule: &dyn ReleaseSchedule,
    today: NaiveDate,
) -> Result<(EventType, NaiveDate), AppError> {
    let event_type = EventType::for_indicator(key).ok_or_else(|| {
        AppError::usage(format!(
            "No prediction event for '{key}'. Use fedFundsRate, cpi or nonfarmPayroll."
        ))
    })?;
    let date = match date {
        Some(date) => date,
        None => schedule.next_release_date(key, today).ok_or_else(|| {
            AppError::not_found(format!(
                "No upcoming release date for '{key}'. Run `mdash update-releases` or pass --date."
            ))
        })?,
    };
    Ok((event_type, date))
}

#[derive(Debug, Clone)]
pub struct MemoRequest {
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub category: PredictionCategory,
    pub prediction: Option<String>,
    pub adopt: Option<Stance>,
    pub memo: Option<String>,
    pub refresh_opinions: bool,
}

/// How the opinions attached to a memo were obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum OpinionStatus {
    /// Stored opinions still match the data.
    Reused,
    Generated,
    /// No generator configured.
    Skipped,
    /// Generation failed; the memo was saved without new opinions.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct MemoOutcome {
    pub entry: JournalEntry,
    pub created: bool,
    pub opinions: OpinionStatus,
}

/// Create or update the journal entry for an event.
///
/// Adopting a stance needs opinions, so in that case a missing generator or a
/// failed generation is an error instead of a warning.
pub fn record_memo(
    store: &dyn JournalStore,
    generator: Option<&dyn TextGenerator>,
    data: &CombinedData,
    request: MemoRequest,
    language: &str,
    now: DateTime<Utc>,
) -> Result<MemoOutcome, AppError> {
    let snapshot = create_data_snapshot(data, now);
    let event_id = request.event_type.event_id(request.event_date);
    let existing = store.get_by_event_id(&event_id)?;
    let stored_opinions = existing.as_ref().and_then(|e| e.ai_opinions.as_ref());

    // Opinions are written for one category; switching category makes them stale.
    let same_category = existing.as_ref().is_some_and(|e| e.category == request.category);
    let freshness = opinion_freshness(stored_opinions, &snapshot);
    tracing::debug!(%event_id, ?freshness, same_category, "stored opinion freshness");
    let reusable = freshness.is_reusable() && same_category && !request.refresh_opinions;

    let (opinions, status): (Option<AiOpinions>, OpinionStatus) = match (stored_opinions, generator) {
        (Some(stored), _) if reusable => {
            (Some(stored.clone()), OpinionStatus::Reused)
        }
        (_, Some(generator)) => match ai::generate_opinions(
            generator,
            request.event_type,
            request.category,
            &snapshot,
            language,
            now,
        ) {
            Ok(generated) => (Some(generated), OpinionStatus::Generated),
            Err(err) if request.adopt.is_some() => return Err(err.into()),
            Err(err) => {
                tracing::warn!(error = %err, "AI opinions unavailable, saving memo without them");
                (None, OpinionStatus::Failed(err.to_string()))
            }
        },
        (_, None) if request.adopt.is_some() => return Err(AiError::MissingApiKey.into()),
        (_, None) => (None, OpinionStatus::Skipped),
    };

    let (prediction, memo, used_ai_opinion) = match request.adopt {
        Some(stance) => {
            let opinion = opinions
                .as_ref()
                .map(|o| o.opinions.get(stance))
                .ok_or(AiError::NoContent)?;
            (
                request.category.prediction_for(stance).to_string(),
                request.memo.unwrap_or_else(|| opinion.summary.clone()),
                Some(opinion.id.clone()),
            )
        }
        None => {
            let prediction = request.prediction.unwrap_or_default();
            validate_outcome(request.category, &prediction)?;
            (prediction, request.memo.unwrap_or_default(), None)
        }
    };

    let new_entry = NewJournalEntry {
        event_id,
        event_type: request.event_type,
        event_date: request.event_date,
        event_title: request.event_type.event_title(request.event_date),
        snapshot,
        ai_opinions: opinions,
        category: request.category,
        prediction,
        memo,
        used_ai_opinion,
    };

    match existing {
        Some(existing) => {
            let entry = store
                .update(&existing.id, JournalPatch::from_new(new_entry))?
                .ok_or_else(|| AppError::not_found(format!("Journal entry '{}' disappeared.", existing.id)))?;
            tracing::info!(id = %entry.id, event_id = %entry.event_id, "memo updated");
            Ok(MemoOutcome {
                entry,
                created: false,
                opinions: status,
            })
        }
        None => {
            let entry = store.create(new_entry)?;
            tracing::info!(id = %entry.id, event_id = %entry.event_id, "memo created");
            Ok(MemoOutcome {
                entry,
                created: true,
                opinions: status,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackStatus {
    /// Same outcome as already recorded; stored feedback kept.
    Reused,
    Generated,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub entry: JournalEntry,
    pub feedback: FeedbackStatus,
}

/// Record the actual outcome of an entry.
///
/// The result is saved even when feedback cannot be generated.
#[allow(clippy::too_many_arguments)]
pub fn review_entry(
    store: &dyn JournalStore,
    generator: Option<&dyn TextGenerator>,
    data: &CombinedData,
    id: &str,
    actual: &str,
    regenerate_feedback: bool,
    language: &str,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, AppError> {
    let entry = store
        .get(id)?
        .ok_or_else(|| AppError::not_found(format!("Journal entry '{id}' not found.")))?;
    let actual = actual.trim();
    validate_outcome(entry.category, actual)?;

    let snapshot_after = create_data_snapshot(data, now);
    let previous = entry
        .result
        .as_ref()
        .filter(|r| r.actual == actual && !r.ai_feedback.is_empty() && !regenerate_feedback);

    let (ai_feedback, feedback_generated_at, status) = match (previous, generator) {
        (Some(previous), _) => (
            previous.ai_feedback.clone(),
            previous.feedback_generated_at,
            FeedbackStatus::Reused,
        ),
        (None, Some(generator)) => match ai::generate_feedback(generator, &entry, actual, &snapshot_after, language) {
            Ok(text) => (text, Some(now), FeedbackStatus::Generated),
            Err(err) => {
                tracing::warn!(error = %err, "AI feedback unavailable");
                (String::new(), None, FeedbackStatus::Failed(err.to_string()))
            }
        },
        (None, None) => (String::new(), None, FeedbackStatus::Skipped),
    };

    let result = ReleaseResult {
        actual: actual.to_string(),
        is_correct: entry.prediction == actual,
        snapshot_after,
        ai_feedback,
        feedback_generated_at,
    };
    let patch = JournalPatch {
        result: Some(result),
        ..JournalPatch::default()
    };
    let entry = store
        .update(id, patch)?
        .ok_or_else(|| AppError::not_found(format!("Journal entry '{id}' not found.")))?;
    tracing::info!(id, actual, "result recorded");

    Ok(ReviewOutcome { entry, feedback: status })
}

/// One-shot question against the current market context.
pub fn ask(generator: &dyn TextGenerator, data: &CombinedData, question: &str, language: &str) -> Result<String, AppError> {
    let context = build_chat_context(data);
    let messages = [ChatMessage::user(question.trim())];
    Ok(ai::answer_chat(generator, &messages, &context, language)?)
}

fn validate_outcome(category: PredictionCategory, value: &str) -> Result<(), AppError> {
    if category.is_valid_outcome(value) {
        return Ok(());
    }
    Err(AppError::usage(format!(
        "Invalid value '{value}' for {}. Expected one of: {}.",
        category.display_name(),
        category.outcomes().join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::tasks::tests::{OPINIONS_JSON, StubGenerator};
    use crate::domain::DataPoint;
    use crate::error::{EXIT_AI, EXIT_NOT_FOUND, EXIT_USAGE};
    use crate::io::journal::JsonJournal;
    use crate::snapshot::generate_data_hash;
    use crate::snapshot::tests::{d, fixed_now, sample_data};

    struct OneDate(NaiveDate);

    impl ReleaseSchedule for OneDate {
        fn all_release_dates(&self, key: IndicatorKey) -> Vec<NaiveDate> {
            if key == IndicatorKey::Cpi { vec![self.0] } else { Vec::new() }
        }
    }

    fn request(prediction: Option<&str>, adopt: Option<Stance>) -> MemoRequest {
        MemoRequest {
            event_type: EventType::Cpi,
            event_date: d(2024, 7, 11),
            category: PredictionCategory::Rate,
            prediction: prediction.map(str::to_string),
            adopt,
            memo: None,
            refresh_opinions: false,
        }
    }

    fn journal() -> (tempfile::TempDir, JsonJournal) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonJournal::new(dir.path().join("journal.json"));
        (dir, store)
    }

    #[test]
    fn event_resolution() {
        let schedule = OneDate(d(2024, 7, 11));
        assert_eq!(
            resolve_event(IndicatorKey::Cpi, None, &schedule, d(2024, 7, 1)).unwrap(),
            (EventType::Cpi, d(2024, 7, 11))
        );
        let err = resolve_event(IndicatorKey::Cpi, None, &schedule, d(2024, 8, 1)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(
            resolve_event(IndicatorKey::NonfarmPayroll, Some(d(2024, 8, 2)), &schedule, d(2024, 7, 1)).unwrap(),
            (EventType::Nfp, d(2024, 8, 2))
        );
        let err = resolve_event(IndicatorKey::Vix, None, &schedule, d(2024, 7, 1)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn memo_without_generator_is_saved_plainly() {
        let (_dir, store) = journal();
        let outcome = record_memo(&store, None, &sample_data(), request(Some("hold"), None), "Korean", fixed_now()).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.opinions, OpinionStatus::Skipped);
        assert_eq!(outcome.entry.event_id, "cpi-2024-07-11");
        assert_eq!(outcome.entry.event_title, "July 2024 CPI release");
        assert_eq!(outcome.entry.prediction, "hold");
        assert!(outcome.entry.ai_opinions.is_none());
        assert_eq!(outcome.entry.snapshot.cpi_yoy, 12.0);
    }

    #[test]
    fn invalid_prediction_is_rejected() {
        let (_dir, store) = journal();
        let err = record_memo(&store, None, &sample_data(), request(Some("up"), None), "Korean", fixed_now()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn adopting_a_stance_copies_prediction_and_summary() {
        let (_dir, store) = journal();
        let stub = StubGenerator::new(vec![Ok(OPINIONS_JSON.to_string())]);
        let outcome = record_memo(
            &store,
            Some(&stub),
            &sample_data(),
            request(None, Some(Stance::Bearish)),
            "Korean",
            fixed_now(),
        )
        .unwrap();

        let entry = outcome.entry;
        assert_eq!(outcome.opinions, OpinionStatus::Generated);
        assert_eq!(entry.prediction, "cut");
        assert_eq!(entry.memo, "Labor is cooling.");
        let opinions = entry.ai_opinions.as_ref().unwrap();
        assert_eq!(entry.used_ai_opinion.as_deref(), Some(opinions.opinions.bearish.id.as_str()));
        assert_eq!(entry.ai_opinions_generated_at, Some(fixed_now()));
    }

    #[test]
    fn adopting_without_generator_fails() {
        let (_dir, store) = journal();
        let err = record_memo(&store, None, &sample_data(), request(None, Some(Stance::Neutral)), "Korean", fixed_now())
            .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_AI);
    }

    #[test]
    fn fresh_opinions_are_reused_and_entry_updated_in_place() {
        let (_dir, store) = journal();
        let stub = StubGenerator::new(vec![Ok(OPINIONS_JSON.to_string())]);
        let data = sample_data();

        let first = record_memo(&store, Some(&stub), &data, request(Some("hold"), None), "Korean", fixed_now()).unwrap();
        let mut again = request(Some("cut"), None);
        again.memo = Some("changed my mind".to_string());
        let second = record_memo(&store, Some(&stub), &data, again, "Korean", fixed_now()).unwrap();

        assert_eq!(stub.calls(), 1);
        assert!(!second.created);
        assert_eq!(second.opinions, OpinionStatus::Reused);
        assert_eq!(second.entry.id, first.entry.id);
        assert_eq!(second.entry.created_at, first.entry.created_at);
        assert_eq!(second.entry.prediction, "cut");
        assert_eq!(second.entry.ai_opinions, first.entry.ai_opinions);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn category_change_regenerates_opinions_before_adopting() {
        let (_dir, store) = journal();
        let stub = StubGenerator::new(vec![Ok(OPINIONS_JSON.to_string()), Ok(OPINIONS_JSON.to_string())]);
        let data = sample_data();

        let first = record_memo(&store, Some(&stub), &data, request(Some("hold"), None), "Korean", fixed_now()).unwrap();
        let mut sp500 = request(None, Some(Stance::Bullish));
        sp500.category = PredictionCategory::Sp500;
        let second = record_memo(&store, Some(&stub), &data, sp500, "Korean", fixed_now()).unwrap();

        assert_eq!(stub.calls(), 2);
        assert_eq!(second.opinions, OpinionStatus::Generated);
        assert!(!second.created);
        assert_eq!(second.entry.category, PredictionCategory::Sp500);
        assert_eq!(second.entry.prediction, "up");
        assert_ne!(second.entry.ai_opinions, first.entry.ai_opinions);
        let generated = second.entry.ai_opinions.as_ref().unwrap();
        assert_eq!(second.entry.used_ai_opinion.as_deref(), Some(generated.opinions.bullish.id.as_str()));
        assert!(stub.requests.borrow()[1].messages[0].content.contains("BULLISH (Up)"));
    }

    #[test]
    fn stale_opinions_are_regenerated() {
        let (_dir, store) = journal();
        let stub = StubGenerator::new(vec![Ok(OPINIONS_JSON.to_string()), Ok(OPINIONS_JSON.to_string())]);
        let mut data = sample_data();
        record_memo(&store, Some(&stub), &data, request(Some("hold"), None), "Korean", fixed_now()).unwrap();

        data.set_series(IndicatorKey::Vix, vec![DataPoint::new(d(2024, 6, 14), 30.0)]);
        let outcome = record_memo(&store, Some(&stub), &data, request(Some("hold"), None), "Korean", fixed_now()).unwrap();

        assert_eq!(stub.calls(), 2);
        assert_eq!(outcome.opinions, OpinionStatus::Generated);
        let hash = &outcome.entry.ai_opinions.as_ref().unwrap().data_hash;
        assert_eq!(hash, &generate_data_hash(&outcome.entry.snapshot));
    }

    #[test]
    fn failed_generation_still_saves_memo() {
        let (_dir, store) = journal();
        let stub = StubGenerator::new(vec![Err(AiError::NoContent)]);
        let outcome =
            record_memo(&store, Some(&stub), &sample_data(), request(Some("raise"), None), "Korean", fixed_now()).unwrap();
        assert!(matches!(outcome.opinions, OpinionStatus::Failed(_)));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn review_records_result_and_reuses_feedback() {
        let (_dir, store) = journal();
        let memo = record_memo(&store, None, &sample_data(), request(Some("hold"), None), "Korean", fixed_now()).unwrap();
        let id = memo.entry.id;
        let stub = StubGenerator::new(vec![Ok("well reasoned".to_string()), Ok("second".to_string())]);

        let reviewed = review_entry(&store, Some(&stub), &sample_data(), &id, "hold", false, "Korean", fixed_now()).unwrap();
        assert_eq!(reviewed.feedback, FeedbackStatus::Generated);
        let result = reviewed.entry.result.as_ref().unwrap();
        assert!(result.is_correct);
        assert_eq!(result.ai_feedback, "well reasoned");
        assert_eq!(result.feedback_generated_at, Some(fixed_now()));

        let again = review_entry(&store, Some(&stub), &sample_data(), &id, "hold", false, "Korean", fixed_now()).unwrap();
        assert_eq!(again.feedback, FeedbackStatus::Reused);
        assert_eq!(stub.calls(), 1);

        let changed = review_entry(&store, Some(&stub), &sample_data(), &id, "cut", false, "Korean", fixed_now()).unwrap();
        let result = changed.entry.result.as_ref().unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.ai_feedback, "second");
    }

    #[test]
    fn review_validates_input() {
        let (_dir, store) = journal();
        let err = review_entry(&store, None, &sample_data(), "missing", "hold", false, "Korean", fixed_now()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);

        let memo = record_memo(&store, None, &sample_data(), request(Some("hold"), None), "Korean", fixed_now()).unwrap();
        let err =
            review_entry(&store, None, &sample_data(), &memo.entry.id, "down", false, "Korean", fixed_now()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let outcome =
            review_entry(&store, None, &sample_data(), &memo.entry.id, "hold", false, "Korean", fixed_now()).unwrap();
        assert_eq!(outcome.feedback, FeedbackStatus::Skipped);
        assert!(outcome.entry.result.is_some());
    }

    #[test]
    fn ask_sends_question_with_context() {
        let stub = StubGenerator::new(vec![Ok("answer".to_string())]);
        let answer = ask(&stub, &sample_data(), "  Is the curve inverted? ", "Korean").unwrap();
        assert_eq!(answer, "answer");
        let requests = stub.requests.borrow();
        assert_eq!(requests[0].messages, vec![ChatMessage::user("Is the curve inverted?")]);
    }
}
