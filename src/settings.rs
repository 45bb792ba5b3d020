//! User settings: default channel, reminder cadence, project name.
//!
//! Stored settings are merged over defaults field by field, so a partial or
//! older record still loads. There is no validation beyond that.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalizer::text;
use crate::store::{KeyValueStore, SETTINGS_KEY};

pub const DEFAULT_PROJECT_NAME: &str = "My Project";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderFrequency {
    #[default]
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
}

impl ReminderFrequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "bi-weekly" | "biweekly" => Some(Self::BiWeekly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi-weekly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "defaultSlackChannel")]
    pub default_channel: String,
    pub reminder_frequency: ReminderFrequency,
    pub project_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_channel: String::new(),
            reminder_frequency: ReminderFrequency::Daily,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Overlay the recognizable fields of a stored record onto these settings.
    pub fn merge_from(&mut self, raw: &Value) {
        let Some(record) = raw.as_object() else {
            return;
        };
        if let Some(channel) = text(record, "defaultSlackChannel") {
            self.default_channel = channel;
        }
        if let Some(freq) =
            text(record, "reminderFrequency").and_then(|f| ReminderFrequency::parse(&f))
        {
            self.reminder_frequency = freq;
        }
        if let Some(name) = text(record, "projectName") {
            self.project_name = name;
        }
    }
}

/// Load settings, falling back to defaults on any read or parse failure.
pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    let mut settings = Settings::default();
    match store.read(SETTINGS_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => settings.merge_from(&value),
            Err(e) => log::warn!("Stored settings are corrupt, using defaults: {}", e),
        },
        Ok(None) => {}
        Err(e) => log::warn!("Settings unavailable, using defaults: {}", e),
    }
    settings
}

/// Best-effort write. Failures are logged and absorbed.
pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) {
    let encoded = match serde_json::to_string(settings) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::warn!("Failed to encode settings: {}", e);
            return;
        }
    };
    if let Err(e) = store.write(SETTINGS_KEY, &encoded) {
        log::warn!("Failed to persist settings: {}", e);
    }
}
