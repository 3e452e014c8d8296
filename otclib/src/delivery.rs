use crate::market::objects::{InstrumentState, Timeframe};
use crate::util::Settings;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Delivery was attempted without a usable destination. Raised before any
/// network call is made.
#[derive(Debug)]
pub struct MissingDestinationError {
    pub message: String,
}

impl std::fmt::Display for MissingDestinationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "MissingDestinationError: {}", self.message)
    }
}

impl std::error::Error for MissingDestinationError {}

fn destination(settings: &Settings) -> Result<(&str, &str), MissingDestinationError> {
    match &settings.telegram {
        Some(telegram) if !telegram.bot_token.is_empty() && !telegram.chat_id.is_empty() => {
            Ok((telegram.bot_token.as_str(), telegram.chat_id.as_str()))
        }
        Some(_) => Err(MissingDestinationError {
            message: "telegram bot token or chat id is empty, configure both in settings.json"
                .to_string(),
        }),
        None => Err(MissingDestinationError {
            message: "no telegram destination configured in settings.json".to_string(),
        }),
    }
}

pub fn format_message(
    instrument: &InstrumentState,
    timeframe: Timeframe,
    analysis: Option<&str>,
) -> String {
    let decimals = instrument.volatility_class().decimals();
    let direction = if instrument.signal.is_bullish() {
        "CALL"
    } else if instrument.signal.is_bearish() {
        "PUT"
    } else {
        "WAIT"
    };
    let mut text = format!(
        "{signal} on {symbol} ({timeframe})\n\
         Direction: {direction}\n\
         Price: {price:.decimals$}\n\
         Change: {change:+.3}%\n\
         RSI: {rsi:.1} | Stochastic: {stochastic:.1}",
        signal = instrument.signal,
        direction = direction,
        symbol = instrument.symbol,
        timeframe = timeframe,
        price = instrument.current_price,
        change = instrument.change_percent,
        rsi = instrument.rsi,
        stochastic = instrument.stochastic,
    );

    if let Some(analysis) = analysis {
        text.push_str("\n\n");
        text.push_str(analysis);
    }
    text
}

/// Forward one signal snapshot to the configured chat. Misconfiguration is
/// rejected up front; a failed delivery is reported to the caller and
/// never retried.
pub async fn send_signal(
    settings: &Settings,
    instrument: &InstrumentState,
    timeframe: Timeframe,
    analysis: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (bot_token, chat_id) = destination(settings)?;

    let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, bot_token);
    let body = serde_json::json!({
        "chat_id": chat_id,
        "text": format_message(instrument, timeframe, analysis),
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

    Ok(())
}
