use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::agents::{ACCOUNT_SLOTS, AgentId};
use super::error::Result;
use super::view::ViewMode;

pub const DEFAULT_QUERY_TEMPLATE: &str = "What does \"{text}\" mean";

/// The single persisted record: user preferences plus the source text.
///
/// Field names on the wire are the historical camelCase keys, so records
/// written by older builds keep loading. New fields must carry a
/// `#[serde(default)]` to stay backward compatible; there is no schema
/// versioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub content: String,

    #[serde(default, rename = "autoCopy")]
    pub auto_copy: bool,

    #[serde(default = "default_auto_highlight", rename = "autoHighlight")]
    pub auto_highlight: bool,

    #[serde(default, rename = "autoFormat")]
    pub auto_format: bool,

    #[serde(default = "default_query_template", rename = "queryTemplate")]
    pub query_template: String,

    #[serde(
        default,
        rename = "lastAgent",
        deserialize_with = "agent_or_default"
    )]
    pub last_agent: AgentId,

    #[serde(default, rename = "sidebarOpen")]
    pub sidebar_open: bool,

    #[serde(
        default,
        rename = "activeView",
        deserialize_with = "view_or_default"
    )]
    pub active_view: ViewMode,

    #[serde(default = "default_account_index", rename = "googleAccount")]
    pub account_index: String,

    #[serde(default = "default_account_labels", rename = "accountLabels")]
    pub account_labels: HashMap<String, String>,
}

fn default_auto_highlight() -> bool {
    true
}

fn default_query_template() -> String {
    DEFAULT_QUERY_TEMPLATE.to_string()
}

fn default_account_index() -> String {
    "0".to_string()
}

fn default_account_labels() -> HashMap<String, String> {
    ACCOUNT_SLOTS
        .iter()
        .map(|slot| (slot.to_string(), format!("Acc {}", slot)))
        .collect()
}

/// Unknown agent keys in old or hand-edited records fall back to the default
/// agent instead of failing the whole record.
fn agent_or_default<'de, D>(deserializer: D) -> std::result::Result<AgentId, D::Error>
where
    D: Deserializer<'de>,
{
    let key = String::deserialize(deserializer)?;
    Ok(AgentId::from_key(&key).unwrap_or_default())
}

fn view_or_default<'de, D>(deserializer: D) -> std::result::Result<ViewMode, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = String::deserialize(deserializer)?;
    Ok(ViewMode::from_tag(&tag))
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            content: String::new(),
            auto_copy: false,
            auto_highlight: default_auto_highlight(),
            auto_format: false,
            query_template: default_query_template(),
            last_agent: AgentId::default(),
            sidebar_open: false,
            active_view: ViewMode::default(),
            account_index: default_account_index(),
            account_labels: default_account_labels(),
        }
    }
}

impl AppSettings {
    /// Load the record from disk, or defaults if absent or unreadable.
    /// Parse failure is non-fatal: it is logged and defaults are used.
    pub fn load() -> Self {
        Self::load_from(&Self::state_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<AppSettings>(&contents) {
                Ok(mut settings) => {
                    settings.normalize();
                    settings
                }
                Err(e) => {
                    eprintln!("Failed to parse saved state: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save the record to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::state_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Path of the single persisted record (cross-platform).
    pub fn state_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("codescope");
        path.push("state.json");
        path
    }

    /// Repair invariants a hand-edited or stale record may violate.
    fn normalize(&mut self) {
        // Auto-copy and auto-format are mutually exclusive; copy wins.
        if self.auto_copy && self.auto_format {
            self.auto_format = false;
        }
        if self.query_template.trim().is_empty() {
            self.query_template = default_query_template();
        }
        if !ACCOUNT_SLOTS.contains(&self.account_index.as_str()) {
            self.account_index = default_account_index();
        }
        // Keep every known slot labeled even when the record predates it.
        let mut labels = default_account_labels();
        labels.extend(self.account_labels.drain());
        self.account_labels = labels;
    }

    /// Enable or disable auto-copy; enabling it disables auto-format.
    pub fn set_auto_copy(&mut self, on: bool) {
        self.auto_copy = on;
        if on {
            self.auto_format = false;
        }
    }

    /// Enable or disable auto-format; enabling it disables auto-copy.
    pub fn set_auto_format(&mut self, on: bool) {
        self.auto_format = on;
        if on {
            self.auto_copy = false;
        }
    }

    pub fn account_label(&self, slot: &str) -> String {
        self.account_labels
            .get(slot)
            .cloned()
            .unwrap_or_else(|| format!("Acc {}", slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert!(!settings.auto_copy);
        assert!(settings.auto_highlight);
        assert!(!settings.auto_format);
        assert_eq!(settings.query_template, DEFAULT_QUERY_TEMPLATE);
        assert_eq!(settings.last_agent, AgentId::Gemini);
        assert!(!settings.sidebar_open);
        assert_eq!(settings.active_view, ViewMode::Editing);
        assert_eq!(settings.account_index, "0");
        assert_eq!(settings.account_label("1"), "Acc 1");
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        for key in [
            "\"content\"",
            "\"autoCopy\"",
            "\"autoHighlight\"",
            "\"autoFormat\"",
            "\"queryTemplate\"",
            "\"lastAgent\"",
            "\"sidebarOpen\"",
            "\"activeView\"",
            "\"googleAccount\"",
            "\"accountLabels\"",
        ] {
            assert!(json.contains(key), "missing wire key {}", key);
        }
    }

    #[test]
    fn test_partial_record_uses_field_defaults() {
        // Old record with only a couple of fields present.
        let json = r#"{"content": "fn main() {}", "autoCopy": true}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.content, "fn main() {}");
        assert!(settings.auto_copy);
        assert!(settings.auto_highlight); // default
        assert!(!settings.auto_format); // default
        assert_eq!(settings.query_template, DEFAULT_QUERY_TEMPLATE);
        assert_eq!(settings.account_index, "0");
    }

    #[test]
    fn test_unknown_agent_degrades_to_default() {
        let json = r#"{"lastAgent": "copilot"}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.last_agent, AgentId::Gemini);
    }

    #[test]
    fn test_unknown_view_degrades_to_editing() {
        let json = r#"{"activeView": "split"}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.active_view, ViewMode::Editing);
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let json = r#"{"autoFormat": true, "futureFeature": {"nested": [1, 2]}}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert!(settings.auto_format);
    }

    #[test]
    fn test_mutual_exclusion_setters() {
        let mut settings = AppSettings::default();

        settings.set_auto_format(true);
        assert!(settings.auto_format);
        assert!(!settings.auto_copy);

        settings.set_auto_copy(true);
        assert!(settings.auto_copy);
        assert!(!settings.auto_format);

        settings.set_auto_format(true);
        assert!(settings.auto_format);
        assert!(!settings.auto_copy);

        // Disabling one never re-enables the other.
        settings.set_auto_format(false);
        assert!(!settings.auto_format);
        assert!(!settings.auto_copy);
    }

    #[test]
    fn test_load_normalizes_conflicting_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"autoCopy": true, "autoFormat": true, "googleAccount": "7", "queryTemplate": "   "}"#,
        )
        .unwrap();

        let settings = AppSettings::load_from(&path);
        assert!(settings.auto_copy);
        assert!(!settings.auto_format);
        assert_eq!(settings.account_index, "0");
        assert_eq!(settings.query_template, DEFAULT_QUERY_TEMPLATE);
    }

    #[test]
    fn test_load_merges_account_labels_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"accountLabels": {"1": "Personal"}}"#).unwrap();

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.account_label("1"), "Personal");
        assert_eq!(settings.account_label("0"), "Acc 0");
        assert_eq!(settings.account_label("2"), "Acc 2");
    }

    #[test]
    fn test_load_malformed_record_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut settings = AppSettings::default();
        settings.content = "SELECT 1;".to_string();
        settings.set_auto_format(true);
        settings.last_agent = AgentId::Perplexity;
        settings.sidebar_open = true;
        settings.active_view = ViewMode::Rendered;
        settings.account_index = "2".to_string();
        settings
            .account_labels
            .insert("2".to_string(), "Work".to_string());

        settings.save_to(&path).unwrap();
        let loaded = AppSettings::load_from(&path);
        assert_eq!(loaded, settings);
    }
}
