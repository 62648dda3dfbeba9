use crate::patch::ValidationMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Document store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Oldest entries are dropped past this many (0 = unlimited)
    pub max_undo_entries: usize,
    pub coalesce_window_ms: u64,
    pub validation: ValidationMode,
}

impl StoreConfig {
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    pub fn lenient(mut self) -> Self {
        self.validation = ValidationMode::Lenient;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_undo_entries: 100,
            coalesce_window_ms: 2000,
            validation: ValidationMode::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"maxUndoEntries": 5}"#).unwrap();
        assert_eq!(config.max_undo_entries, 5);
        assert_eq!(config.coalesce_window(), Duration::from_secs(2));
        assert_eq!(config.validation, ValidationMode::Strict);
    }
}
