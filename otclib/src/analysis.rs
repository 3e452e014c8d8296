use serde::Deserialize;

use crate::market::objects::{InstrumentState, Timeframe};
use crate::util::GeminiSettings;

/// Placeholder returned whenever the collaborator cannot answer.
pub const ANALYSIS_UNAVAILABLE: &str = "Analysis unavailable.";

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

fn build_prompt(instrument: &InstrumentState, timeframe: Timeframe) -> String {
    let decimals = instrument.volatility_class().decimals();
    format!(
        "Act as a binary-options trading expert specialized in OTC markets.\n\
         Quick technical read for {symbol}.\n\
         Timeframe: {timeframe}.\n\
         Current price: {price:.decimals$}.\n\
         RSI (14): {rsi:.2}.\n\
         Stochastic: {stochastic:.2}.\n\
         Recent change: {change:.4}%.\n\
         Detected technical signal: {signal}.\n\n\
         Give a CLEAR call (RISE or FALL) followed by one ultra-short \
         sentence explaining why, based on OTC volatility and the \
         indicators.",
        symbol = instrument.symbol,
        timeframe = timeframe,
        price = instrument.current_price,
        rsi = instrument.rsi,
        stochastic = instrument.stochastic,
        change = instrument.change_percent,
        signal = instrument.signal,
    )
}

async fn request_analysis(
    instrument: &InstrumentState,
    timeframe: Timeframe,
    settings: &GeminiSettings,
) -> Result<String, Box<dyn std::error::Error>> {
    let url = format!("{}?key={}", GEMINI_URL, settings.api_key);
    let body = serde_json::json!({
        "contents": [{ "parts": [{ "text": build_prompt(instrument, timeframe) }] }],
        "generationConfig": { "temperature": 0.7, "maxOutputTokens": 100 }
    });

    let response = reqwest::Client::new()
        .post(&url)
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(format!("Received non-success status code: {}", response.status()).into());
    }

    let body = response.text().await?;
    let parsed: GenerateResponse = serde_json::from_str(&body)?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text);

    match text {
        Some(text) => Ok(text),
        None => Err("Analysis response contained no text".into()),
    }
}

/// Best-effort natural-language read of one instrument. Any failure, a
/// missing API key included, degrades to a fixed placeholder so the signal
/// pipeline never depends on this collaborator.
pub async fn analyze_market(
    instrument: &InstrumentState,
    timeframe: Timeframe,
    settings: Option<&GeminiSettings>,
) -> String {
    let settings = match settings {
        Some(settings) => settings,
        None => return ANALYSIS_UNAVAILABLE.to_string(),
    };

    match request_analysis(instrument, timeframe, settings).await {
        Ok(text) => text,
        Err(err) => {
            log::warn!("Market analysis request failed: {}", err);
            ANALYSIS_UNAVAILABLE.to_string()
        }
    }
}
