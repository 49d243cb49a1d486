use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for a single data source.
///
/// The `settings` map is opaque to the core: each adapter interprets its own
/// keys (repository coordinates, project key, page limits, ...). The core
/// reads only `name` and `enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Human-readable source name, used in reports and logs.
    pub name: String,
    /// Disabled sources are skipped without being invoked.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Adapter-local settings. Ordered map so serialized configs stay stable.
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl SourceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            settings: BTreeMap::new(),
        }
    }

    /// Builder-style helper for attaching one adapter-local setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    pub fn trace_loaded(&self) {
        info!(
            source = %self.name,
            enabled = self.enabled,
            settings_count = self.settings.len(),
            "Loaded source config"
        );
        debug!(?self, "Source config (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_by_default() {
        let config = SourceConfig::new("tracker");
        assert!(config.enabled);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn settings_are_opaque_values() {
        let config = SourceConfig::new("repo")
            .with_setting("repository", serde_json::json!("acme/widget"))
            .with_setting("max_commits", serde_json::json!(250));

        assert_eq!(
            config.setting("repository"),
            Some(&serde_json::json!("acme/widget"))
        );
        assert_eq!(config.setting("max_commits"), Some(&serde_json::json!(250)));
        assert_eq!(config.setting("missing"), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: SourceConfig = serde_json::from_str(r#"{"name": "jira"}"#).unwrap();
        assert_eq!(config.name, "jira");
        assert!(config.enabled);
        assert!(config.settings.is_empty());
    }
}
