use std::collections::HashMap;

use serde::Deserialize;

use crate::market::objects::Snapshot;
use crate::util;

pub const RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Approximate base prices used when the rate source is unreachable.
pub const FALLBACK_PAIRS: [(&str, f64); 8] = [
    ("EUR/USD OTC", 1.05420),
    ("GBP/USD OTC", 1.26120),
    ("USD/JPY OTC", 154.65),
    ("AUD/CAD OTC", 0.91380),
    ("USD/CHF OTC", 0.88550),
    ("NZD/USD OTC", 0.58420),
    ("EUR/JPY OTC", 163.15),
    ("GBP/JPY OTC", 195.35),
];

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Base prices derived from the live exchange-rate table.
    RateSynchronized,
    /// Rate source unavailable, base prices come from the fallback table.
    SimulatedOnly,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionMode::RateSynchronized => write!(f, "rate-synchronized"),
            SessionMode::SimulatedOnly => write!(f, "simulated-only"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub snapshot: Snapshot,
    pub mode: SessionMode,
}

async fn fetch_usd_rates() -> Result<HashMap<String, f64>, Box<dyn std::error::Error>> {
    let response = reqwest::Client::new().get(RATES_URL).send().await?;

    if !response.status().is_success() {
        return Err(format!("Received non-success status code: {}", response.status()).into());
    }

    let body = response.text().await?;
    let parsed: RatesResponse = serde_json::from_str(&body)?;
    Ok(parsed.rates)
}

/// Derive the tracked pairs from a USD-based rate table. Each pair has a
/// fixed cross-rate formula: inverse rate for XXX/USD quotes, direct rate
/// for USD/XXX quotes, and a ratio of two rates for the crosses. `None` if
/// any required currency is missing.
pub fn pairs_from_rates(rates: &HashMap<String, f64>) -> Option<Vec<(String, f64)>> {
    let eur = rates.get("EUR").copied()?;
    let gbp = rates.get("GBP").copied()?;
    let jpy = rates.get("JPY").copied()?;
    let aud = rates.get("AUD").copied()?;
    let cad = rates.get("CAD").copied()?;
    let chf = rates.get("CHF").copied()?;
    let nzd = rates.get("NZD").copied()?;

    Some(vec![
        ("EUR/USD OTC".to_string(), 1.0 / eur),
        ("GBP/USD OTC".to_string(), 1.0 / gbp),
        ("USD/JPY OTC".to_string(), jpy),
        ("AUD/CAD OTC".to_string(), cad / aud),
        ("USD/CHF OTC".to_string(), chf),
        ("NZD/USD OTC".to_string(), 1.0 / nzd),
        ("EUR/JPY OTC".to_string(), jpy / eur),
        ("GBP/JPY OTC".to_string(), jpy / gbp),
    ])
}

pub fn fallback_pairs() -> Vec<(String, f64)> {
    FALLBACK_PAIRS
        .iter()
        .map(|(symbol, price)| (symbol.to_string(), *price))
        .collect()
}

fn session_from(pairs: Option<Vec<(String, f64)>>, now: u64) -> Session {
    match pairs {
        Some(pairs) => Session {
            snapshot: Snapshot::seeded(&pairs, now),
            mode: SessionMode::RateSynchronized,
        },
        None => Session {
            snapshot: Snapshot::seeded(&fallback_pairs(), now),
            mode: SessionMode::SimulatedOnly,
        },
    }
}

/// One-shot session bootstrap. Runs exactly once at session start, never
/// retries; any failure (network, status, body, missing currency) falls
/// back silently to the built-in table.
pub async fn initialize_session() -> Session {
    let pairs = match fetch_usd_rates().await {
        Ok(rates) => {
            let pairs = pairs_from_rates(&rates);
            if pairs.is_none() {
                log::warn!("Rate table is missing required currencies, using fallback prices.");
            }
            pairs
        }
        Err(err) => {
            log::warn!("Failed to fetch exchange rates, using fallback prices: {}", err);
            None
        }
    };

    session_from(pairs, util::now_millis())
}
