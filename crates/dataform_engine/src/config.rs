use dataform_forms::Language;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session settings. Every field has a default, so a partial JSON file is
/// enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub language: Language,
    /// Silence from the server after which the session is closed.
    pub hold_timeout_ms: u64,
    pub hold_check_interval_ms: u64,
    /// Delay between a server HOLD and the answering client HOLD.
    pub hold_reply_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            hold_timeout_ms: 10_000,
            hold_check_interval_ms: 1_000,
            hold_reply_delay_ms: 1_000,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }

    pub fn hold_check_interval(&self) -> Duration {
        Duration::from_millis(self.hold_check_interval_ms)
    }

    pub fn hold_reply_delay(&self) -> Duration {
        Duration::from_millis(self.hold_reply_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"language":"english","hold_timeout_ms":500}"#).unwrap();
        assert_eq!(config.language, Language::English);
        assert_eq!(config.hold_timeout(), Duration::from_millis(500));
        assert_eq!(config.hold_check_interval(), Duration::from_secs(1));
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }
}
