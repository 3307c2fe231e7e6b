//! Structural-symbol outline extracted from the highlight token stream.
//!
//! A structural symbol is a token the highlighting library classifies as a
//! name-like construct (function/class/type names, document sections, CSS
//! class/id selectors). The ordered list of them drives the navigable
//! outline panel.

use syntect::parsing::Scope;

/// Maximum label length shown in the outline panel.
const LABEL_MAX_CHARS: usize = 40;

/// Scope prefixes treated as structural symbols.
pub const STRUCTURAL_SCOPES: [&str; 6] = [
    "entity.name.function",
    "entity.name.class",
    "entity.name.type",
    "entity.name.section",
    "entity.other.attribute-name.class",
    "entity.other.attribute-name.id",
];

/// One entry of the navigable outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Panel label, truncated for display.
    pub label: String,
    /// Full symbol text.
    pub text: String,
    /// Byte range of the symbol in the rendered text.
    pub start: usize,
    pub end: usize,
}

impl OutlineEntry {
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        let trimmed = text.trim();
        Self {
            label: trimmed.chars().take(LABEL_MAX_CHARS).collect(),
            text: trimmed.to_string(),
            start,
            end,
        }
    }
}

/// Pre-parsed structural scope prefixes for fast stack checks.
pub struct StructuralScopes {
    prefixes: Vec<Scope>,
}

impl StructuralScopes {
    pub fn new() -> Self {
        Self {
            prefixes: STRUCTURAL_SCOPES
                .iter()
                .filter_map(|s| Scope::new(s).ok())
                .collect(),
        }
    }

    /// Whether any scope on the stack sits under a structural prefix.
    pub fn matches(&self, scopes: &[Scope]) -> bool {
        scopes
            .iter()
            .any(|scope| self.prefixes.iter().any(|p| p.is_prefix_of(*scope)))
    }
}

impl Default for StructuralScopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_label_truncation() {
        let long = "a".repeat(60);
        let entry = OutlineEntry::new(&long, 0, 60);
        assert_eq!(entry.label.chars().count(), 40);
        assert_eq!(entry.text.len(), 60);
    }

    #[test]
    fn test_entry_trims_whitespace() {
        let entry = OutlineEntry::new("  main  ", 10, 18);
        assert_eq!(entry.label, "main");
        assert_eq!(entry.start, 10);
        assert_eq!(entry.end, 18);
    }

    #[test]
    fn test_structural_scope_matching() {
        let structural = StructuralScopes::new();

        let function = Scope::new("entity.name.function.rust").unwrap();
        let keyword = Scope::new("keyword.control.rust").unwrap();
        let selector = Scope::new("entity.other.attribute-name.class.css").unwrap();

        assert!(structural.matches(&[keyword, function]));
        assert!(structural.matches(&[selector]));
        assert!(!structural.matches(&[keyword]));
        assert!(!structural.matches(&[]));
    }
}
