//! Prompt text for the three model workflows.

use serde::Serialize;

use crate::ai::AiError;
use crate::domain::{DataSnapshot, EventType, JournalEntry, PredictionCategory};
use crate::snapshot::ChatContext;

fn pretty<T: Serialize>(value: &T) -> Result<String, AiError> {
    serde_json::to_string_pretty(value).map_err(|e| AiError::InvalidRequest(e.to_string()))
}

pub fn opinions_prompt(
    event_type: EventType,
    category: PredictionCategory,
    snapshot: &DataSnapshot,
    language: &str,
) -> Result<String, AiError> {
    let data = pretty(snapshot)?;
    let stances = match category {
        PredictionCategory::Rate => {
            "1. BULLISH (Rate Hike): arguments for raising rates\n\
             2. NEUTRAL (Hold): arguments for keeping rates unchanged\n\
             3. BEARISH (Rate Cut): arguments for cutting rates"
        }
        PredictionCategory::Sp500 => {
            "1. BULLISH (Up): arguments for the market going up\n\
             2. NEUTRAL: arguments for sideways movement\n\
             3. BEARISH (Down): arguments for the market going down"
        }
    };

    Ok(format!(
        "You are a macroeconomic analyst. Generate 3 different perspectives on the upcoming {event_type}.

Current Market Data:
{data}

Category: {category}

GUIDELINES:
1. Consider the latest U.S. economic trends and news that could affect the outcome, including policy
   announcements, Fed statements, economic reports and geopolitical events.
2. Look at the complete picture. Analyze every indicator above, acknowledge conflicting signals and
   explain how they balance out instead of cherry-picking.
3. Be detailed. Walk through the logic from each data point to the conclusion, weigh the factors,
   use historical context and address counterarguments.

Generate exactly 3 opinions:
{stances}

For each opinion provide:
- title: short title ({language})
- summary: 2-3 sentence summary ({language})
- reasoning: detailed reasoning with specific data references and recent developments ({language})
- keyIndicators: array of 2-3 key indicators used, formatted as \"Name: Value\"

Respond in JSON only:
{{
  \"bullish\": {{ \"title\": \"\", \"summary\": \"\", \"reasoning\": \"\", \"keyIndicators\": [] }},
  \"neutral\": {{ \"title\": \"\", \"summary\": \"\", \"reasoning\": \"\", \"keyIndicators\": [] }},
  \"bearish\": {{ \"title\": \"\", \"summary\": \"\", \"reasoning\": \"\", \"keyIndicators\": [] }}
}}

Be objective and balanced. Each opinion must be plausible given all of the data.",
        category = category.display_name(),
    ))
}

pub fn feedback_prompt(
    entry: &JournalEntry,
    actual: &str,
    current: &DataSnapshot,
    language: &str,
) -> Result<String, AiError> {
    let before = pretty(&entry.snapshot)?;
    let after = pretty(current)?;
    let category = match entry.category {
        PredictionCategory::Rate => "Interest Rate",
        PredictionCategory::Sp500 => "S&P 500",
    };
    let correct = if entry.prediction == actual { "Yes" } else { "No" };

    Ok(format!(
        "You are a macroeconomic mentor reviewing a student's prediction.

Event: {title}
Category: {category}

Student's Prediction: {prediction}
Actual Result: {actual}
Prediction Correct: {correct}

Student's Memo:
{memo}

Data at Prediction Time ({before_ts}):
{before}

Data After Result ({after_ts}):
{after}

Provide feedback in {language}:
1. Whether the prediction was correct
2. What the student did well (specific points)
3. What could be improved (specific points)
4. Suggestions for the next similar event

Be constructive and reference specific data points. Keep it concise but actionable.",
        title = entry.event_title,
        prediction = entry.prediction,
        memo = entry.memo,
        before_ts = entry.snapshot.timestamp.to_rfc3339(),
        after_ts = current.timestamp.to_rfc3339(),
    ))
}

pub fn chat_system_prompt(context: &ChatContext, language: &str) -> Result<String, AiError> {
    let data = pretty(context)?;
    Ok(format!(
        "You are a macroeconomic investment advisor assistant specializing in data-driven analysis.
Prioritize objective reading of the numbers over the user's stated intent, and present several
scenarios when the data supports more than one interpretation.

Real-time market data:
{data}

GUIDELINES:
1. Always answer, basing the analysis on the data above plus relevant political and economic context you know.
2. Cite specific numbers as evidence (e.g. \"10Y Treasury: 4.19%\", \"Yield Spread: 0.70%\").
3. The data has currentData (treasury2y, treasury10y, fedFundsRate, cpi, cpiYoY, nonfarmPayroll, vix,
   sp500, hySpread, sahmRule, unemployment) and derived (yieldSpread, realRate). A null value means no data.
4. Explain what the indicators typically suggest historically and point out unusual divergences.
5. Consider both bullish and bearish interpretations.
6. Do not make specific buy or sell recommendations.
7. Respond in {language}, at most 800 words."
    ))
}
