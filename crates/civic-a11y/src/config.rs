//! Coordinator configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::A11yError;

/// Announcement coordinator options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Minimum time between two accepted announcements
    pub cooldown_ms: u64,

    /// Delay between cancelling speech and speaking the new message
    pub speech_delay_ms: u64,

    /// Speech rate passed to the speech service (None = engine default)
    pub speech_rate: Option<f32>,

    /// Inserted content is announced only if its trimmed text is longer than this
    pub min_inserted_text_len: usize,

    /// Element id of the live region
    pub announcer_id: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 300,
            speech_delay_ms: 10,
            speech_rate: None,
            min_inserted_text_len: 10,
            announcer_id: "screen-reader-announcer".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, A11yError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, A11yError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CoordinatorConfig::from_json(r#"{ "cooldown_ms": 500, "speech_rate": 1.2 }"#).unwrap();
        assert_eq!(config.cooldown_ms, 500);
        assert_eq!(config.speech_rate, Some(1.2));
        assert_eq!(config.speech_delay_ms, 10);
        assert_eq!(config.announcer_id, "screen-reader-announcer");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CoordinatorConfig::from_json("{ cooldown_ms: }"),
            Err(A11yError::Config(_))
        ));
    }
}
