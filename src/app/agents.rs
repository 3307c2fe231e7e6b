use serde::{Deserialize, Serialize};

/// Geometry of the floating popup used for agents that refuse embedding.
/// The window opens without toolbar or menubar chrome; the launcher decides
/// the rest.
pub const POPUP_WIDTH: u32 = 600;
pub const POPUP_HEIGHT: u32 = 900;

/// Account slots offered by the account switcher.
pub const ACCOUNT_SLOTS: [&str; 3] = ["0", "1", "2"];

/// The fixed set of AI chat agents the tool can target. Not mutable at
/// runtime; exactly one entry ([`AgentId::Gemini`]) tolerates being shown in
/// the embedded surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    #[default]
    Gemini,
    Grok,
    ChatGpt,
    Perplexity,
}

impl AgentId {
    pub const ALL: [AgentId; 4] = [
        AgentId::Gemini,
        AgentId::Grok,
        AgentId::ChatGpt,
        AgentId::Perplexity,
    ];

    pub fn base_url(self) -> &'static str {
        match self {
            AgentId::Gemini => "https://gemini.google.com/app",
            AgentId::Grok => "https://x.com/i/grok",
            AgentId::ChatGpt => "https://chatgpt.com/",
            AgentId::Perplexity => "https://www.perplexity.ai/",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgentId::Gemini => "Gemini",
            AgentId::Grok => "Grok",
            AgentId::ChatGpt => "ChatGPT",
            AgentId::Perplexity => "Perplexity",
        }
    }

    /// Stable key used in the persisted record.
    pub fn key(self) -> &'static str {
        match self {
            AgentId::Gemini => "gemini",
            AgentId::Grok => "grok",
            AgentId::ChatGpt => "chatgpt",
            AgentId::Perplexity => "perplexity",
        }
    }

    pub fn from_key(key: &str) -> Option<AgentId> {
        AgentId::ALL.iter().copied().find(|a| a.key() == key)
    }

    pub fn is_embeddable(self) -> bool {
        matches!(self, AgentId::Gemini)
    }

    /// URL for the embedded surface, derived from the selected account slot.
    /// Slot "0" is the bare base URL; other slots get an account-scoped path.
    pub fn embedded_url(self, account_index: &str) -> String {
        match self {
            AgentId::Gemini if account_index != "0" => {
                format!("https://gemini.google.com/u/{}/app", account_index)
            }
            _ => self.base_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_embeddable_agent() {
        let embeddable: Vec<AgentId> = AgentId::ALL
            .iter()
            .copied()
            .filter(|a| a.is_embeddable())
            .collect();
        assert_eq!(embeddable, vec![AgentId::Gemini]);
    }

    #[test]
    fn test_embedded_url_account_zero_is_base() {
        assert_eq!(
            AgentId::Gemini.embedded_url("0"),
            "https://gemini.google.com/app"
        );
    }

    #[test]
    fn test_embedded_url_account_scoped() {
        assert_eq!(
            AgentId::Gemini.embedded_url("2"),
            "https://gemini.google.com/u/2/app"
        );
        assert_eq!(
            AgentId::Gemini.embedded_url("1"),
            "https://gemini.google.com/u/1/app"
        );
    }

    #[test]
    fn test_embedded_url_non_embeddable_ignores_account() {
        assert_eq!(AgentId::Grok.embedded_url("2"), AgentId::Grok.base_url());
    }

    #[test]
    fn test_key_roundtrip() {
        for agent in AgentId::ALL {
            assert_eq!(AgentId::from_key(agent.key()), Some(agent));
        }
        assert_eq!(AgentId::from_key("copilot"), None);
    }

    #[test]
    fn test_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&AgentId::ChatGpt).unwrap();
        assert_eq!(json, "\"chatgpt\"");
        let back: AgentId = serde_json::from_str("\"perplexity\"").unwrap();
        assert_eq!(back, AgentId::Perplexity);
    }
}
