//! Selection-triggered auto actions.
//!
//! Pointer-up on the rendered output feeds the dispatcher. Auto copy and
//! auto format wait out a debounce window so mid-drag selections don't
//! fire; every deferred callback re-checks its generation stamp before
//! acting, which is how a newer selection cancels an older pending action.

use super::settings::{AppSettings, DEFAULT_QUERY_TEMPLATE};

/// Debounce window for selection-triggered auto actions, restarted on each
/// new selection event.
pub const DEBOUNCE_SECS: f64 = 0.6;

/// What a settled selection should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAction {
    None,
    /// Copy the raw selection and confirm.
    Copy(String),
    /// Hand the templated query to the agent panel.
    SendToAgent(String),
}

/// Debounce bookkeeping for selection-triggered actions.
#[derive(Debug, Default)]
pub struct SelectionDispatcher {
    generation: u64,
    pending: Option<String>,
}

impl SelectionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new selection supersedes any pending one: the generation bump turns
    /// an in-flight debounce callback into a no-op. Returns the stamp the
    /// caller schedules the debounce timer with.
    pub fn arm(&mut self, text: String) -> u64 {
        self.generation += 1;
        self.pending = Some(text);
        self.generation
    }

    /// Cancel whatever is pending (view switches and renders do this).
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// A debounce timer fired. Stale stamps return `None`.
    pub fn settle(&mut self, stamp: u64) -> Option<String> {
        if stamp != self.generation {
            return None;
        }
        self.pending.take()
    }
}

/// Substitute the selection into the query template. Blank templates fall
/// back to the default; only the first placeholder occurrence is replaced.
pub fn build_query(template: &str, text: &str) -> String {
    let template = if template.trim().is_empty() {
        DEFAULT_QUERY_TEMPLATE
    } else {
        template
    };
    template.replacen("{text}", text, 1)
}

/// Decide what a settled selection does under the current preferences.
/// Auto-format and auto-copy are mutually exclusive by the settings
/// invariant; format takes the branch when somehow both are observed.
pub fn auto_action(settings: &AppSettings, text: &str) -> AutoAction {
    if settings.auto_format {
        AutoAction::SendToAgent(build_query(&settings.query_template, text))
    } else if settings.auto_copy {
        AutoAction::Copy(text.to_string())
    } else {
        AutoAction::None
    }
}
