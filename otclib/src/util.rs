use serde::{Deserialize, Serialize};

use crate::market::objects::Timeframe;

pub const SETTINGS_PATH: &str = "settings.json";

/// User configuration. Everything here is optional with a sensible
/// default; the delivery chat id is the only value the application ever
/// writes back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeframe: Timeframe,
    pub notify_on_strong_signals: bool,
    pub telegram: Option<TelegramSettings>,
    pub gemini: Option<GeminiSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
}

pub fn read_settings() -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = std::fs::read_to_string(SETTINGS_PATH)?;
    serde_json::from_str(&settings).map_err(|e| e.into())
}

pub fn write_settings(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let serialized = serde_json::to_string_pretty(settings)?;
    std::fs::write(SETTINGS_PATH, serialized).map_err(|e| e.into())
}

pub fn set_delivery_destination(settings: &mut Settings, chat_id: &str) {
    match settings.telegram.as_mut() {
        Some(telegram) => telegram.chat_id = chat_id.to_string(),
        None => {
            settings.telegram = Some(TelegramSettings {
                bot_token: String::new(),
                chat_id: chat_id.to_string(),
            })
        }
    }
}

/// Persist a new delivery destination, creating the telegram section if
/// the user never configured one. The chat id is the only setting the
/// application writes back between sessions.
pub fn save_delivery_destination(
    settings: &mut Settings,
    chat_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    set_delivery_destination(settings, chat_id);
    write_settings(settings)
}

pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}
