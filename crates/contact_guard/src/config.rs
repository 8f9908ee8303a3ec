use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the contact form pipeline.
///
/// Every field has a default so partial config files deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Submit attempts admitted per window.
    pub max_attempts: u32,
    /// Fixed window length in seconds.
    pub window_secs: u64,
    /// Character limit for single line fields (text, email).
    pub single_line_limit: usize,
    /// Character limit for the long-form message field.
    pub multiline_limit: usize,
    /// Simulated network latency of a submission.
    pub send_delay_ms: u64,
    /// How long the success banner stays before the form resets.
    pub success_display_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_secs: 60,
            single_line_limit: 100,
            multiline_limit: 500,
            send_delay_ms: 1500,
            success_display_ms: 3000,
        }
    }
}

impl GuardConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let cfg = GuardConfig::default();
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.window(), Duration::from_secs(60));
        assert_eq!(cfg.single_line_limit, 100);
        assert_eq!(cfg.multiline_limit, 500);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GuardConfig = serde_json::from_str(r#"{ "max_attempts": 5 }"#).unwrap();
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.window_secs, 60);
        assert_eq!(cfg.send_delay(), Duration::from_millis(1500));
    }
}
