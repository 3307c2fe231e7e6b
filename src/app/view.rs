use serde::{Deserialize, Serialize};

/// The two mutually exclusive states of the main content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// The raw-text editor is visible.
    #[default]
    #[serde(rename = "input")]
    Editing,
    /// The highlighted output is visible.
    #[serde(rename = "output")]
    Rendered,
}

impl ViewMode {
    pub fn is_rendered(self) -> bool {
        self == ViewMode::Rendered
    }

    /// Tag used in the persisted record; unknown tags degrade to `Editing`.
    pub fn from_tag(tag: &str) -> ViewMode {
        if tag == "output" {
            ViewMode::Rendered
        } else {
            ViewMode::Editing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tags() {
        assert_eq!(serde_json::to_string(&ViewMode::Editing).unwrap(), "\"input\"");
        assert_eq!(serde_json::to_string(&ViewMode::Rendered).unwrap(), "\"output\"");
    }

    #[test]
    fn test_unknown_tag_degrades_to_editing() {
        assert_eq!(ViewMode::from_tag("output"), ViewMode::Rendered);
        assert_eq!(ViewMode::from_tag("split"), ViewMode::Editing);
        assert_eq!(ViewMode::from_tag(""), ViewMode::Editing);
    }
}
