//! Agent panel state machine.
//!
//! Exactly one agent is active at a time. Every window-system side effect
//! goes through [`AgentShell`] so switching and activation stay testable
//! without a live UI; the production shell lives in `ui::sidebar`. Deferred
//! steps (focus retries, pulse expiry, popup opening) re-check the panel
//! state when they fire, because the active agent may have changed while
//! the timer was pending.

use std::collections::HashMap;
use std::time::Instant;

use super::agents::AgentId;
use super::error::Result;

/// Seconds the panel needs to settle after opening before focus cues land.
pub const PANEL_OPEN_DELAY_SECS: f64 = 0.35;
/// Focus retry offsets after the first attempt.
pub const FOCUS_RETRY_SECS: [f64; 3] = [0.1, 0.3, 0.6];
/// Attention pulse duration on the embedded surface.
pub const PULSE_SECS: f64 = 4.0;
/// Minimum time the pulse stays up before focus may cancel it early.
pub const PULSE_MIN_SECS: f64 = 1.2;
/// Delay before the popup path opens or refocuses the external window.
pub const POPUP_DELAY_SECS: f64 = 0.1;

/// Side-effect seam to the window system.
pub trait AgentShell {
    /// Handle to a spawned popup window. Holding one does not guarantee the
    /// window is still open; check [`AgentShell::popup_is_open`] before reuse.
    type Popup;

    /// Show or hide the whole panel.
    fn set_panel_visible(&mut self, visible: bool);
    /// Show or hide the embedded surface.
    fn show_embedded(&mut self, visible: bool);
    /// Point the embedded surface at `url`. Reassignment reloads the
    /// surface, so callers skip it when the URL is unchanged.
    fn navigate_embedded(&mut self, url: &str);
    /// Show the open-a-window prompt for a non-embeddable agent, or clear it.
    fn show_external_prompt(&mut self, agent: Option<AgentId>);
    /// Show or hide the account switcher controls.
    fn show_account_switcher(&mut self, visible: bool);
    /// Give the embedded surface input focus.
    fn focus_embedded(&mut self);
    /// Start or stop the visual pulse on the embedded surface.
    fn pulse_embedded(&mut self, on: bool);
    /// Open a popup window for `agent` at `url`.
    fn open_popup(&mut self, agent: AgentId, url: &str) -> Result<Self::Popup>;
    /// Whether a previously opened popup is still alive.
    fn popup_is_open(&self, popup: &mut Self::Popup) -> bool;
    /// Bring a live popup to the front (best effort).
    fn focus_popup(&mut self, popup: &mut Self::Popup);
}

/// What `activate` wants the caller to schedule after the immediate work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationFollowUp {
    /// Cue the embedded surface (pulse + focus retries) after the delay.
    EmbeddedCue { delay: f64 },
    /// Open or refocus the active agent's popup after the delay.
    OpenPopup { delay: f64 },
}

pub struct AgentPanel<S: AgentShell> {
    shell: S,
    active: Option<AgentId>,
    open: bool,
    embedded_url: Option<String>,
    popups: HashMap<AgentId, S::Popup>,
    pulse_started: Option<Instant>,
}

impl<S: AgentShell> AgentPanel<S> {
    pub fn new(shell: S) -> Self {
        Self {
            shell,
            active: None,
            open: false,
            embedded_url: None,
            popups: HashMap::new(),
            pulse_started: None,
        }
    }

    pub fn active(&self) -> Option<AgentId> {
        self.active
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn embedded_url(&self) -> Option<&str> {
        self.embedded_url.as_deref()
    }

    /// Open or close the panel. Opening selects `fallback` when no agent is
    /// active yet and re-runs the switch so the surface matches the state.
    pub fn set_open(&mut self, open: bool, fallback: AgentId, account_index: &str) {
        self.open = open;
        self.shell.set_panel_visible(open);
        if open {
            let agent = self.active.unwrap_or(fallback);
            self.switch_agent(agent, account_index);
        }
    }

    /// Switch the active agent: hide the embedded surface, clear the
    /// external prompt, then show whichever presentation the agent needs.
    pub fn switch_agent(&mut self, agent: AgentId, account_index: &str) {
        self.shell.show_embedded(false);
        self.shell.show_external_prompt(None);

        self.active = Some(agent);
        self.shell.show_account_switcher(agent.is_embeddable());

        if agent.is_embeddable() {
            self.shell.show_embedded(true);
            let required = agent.embedded_url(account_index);
            if self.embedded_url.as_deref() != Some(required.as_str()) {
                self.shell.navigate_embedded(&required);
                self.embedded_url = Some(required);
            }
        } else {
            self.shell.show_external_prompt(Some(agent));
        }
    }

    /// Open or refocus the popup for `agent`. This is the single popup path;
    /// a handle in the map may be dead and is checked live before reuse.
    pub fn open_external(&mut self, agent: AgentId) -> Result<()> {
        if let Some(popup) = self.popups.get_mut(&agent) {
            if self.shell.popup_is_open(popup) {
                self.shell.focus_popup(popup);
                return Ok(());
            }
        }
        let popup = self.shell.open_popup(agent, agent.base_url())?;
        self.popups.insert(agent, popup);
        Ok(())
    }

    /// Activation entry point: ensure the panel is open and an agent is
    /// selected, then tell the caller what to schedule. The clipboard copy
    /// and its notification are the caller's immediate work.
    pub fn activate(&mut self, fallback: AgentId, account_index: &str) -> ActivationFollowUp {
        let mut delay = 0.0;
        if !self.open {
            self.set_open(true, fallback, account_index);
            // The panel needs time to lay out before focus cues land.
            delay = PANEL_OPEN_DELAY_SECS;
        }
        if self.active.is_none() {
            self.switch_agent(fallback, account_index);
        }

        let agent = self.active.unwrap_or(fallback);
        if agent.is_embeddable() {
            ActivationFollowUp::EmbeddedCue { delay }
        } else {
            ActivationFollowUp::OpenPopup {
                delay: POPUP_DELAY_SECS,
            }
        }
    }

    /// The deferred cue fired: start the pulse and the first focus attempt.
    /// Returns false when the active agent no longer embeds (it changed
    /// while the timer was pending).
    pub fn begin_embedded_cue(&mut self) -> bool {
        let embeddable = self.active.map(AgentId::is_embeddable).unwrap_or(false);
        if !embeddable {
            return false;
        }
        self.pulse_started = Some(Instant::now());
        self.shell.pulse_embedded(true);
        self.shell.focus_embedded();
        true
    }

    /// One deferred focus retry; a no-op once the agent changed.
    pub fn retry_focus(&mut self) {
        if self.active.map(AgentId::is_embeddable).unwrap_or(false) {
            self.shell.focus_embedded();
        }
    }

    /// The pulse timer expired.
    pub fn end_pulse(&mut self) {
        self.pulse_started = None;
        self.shell.pulse_embedded(false);
    }

    /// Focus reached the embedded surface. The pulse may be dropped early,
    /// but only after its minimum blink time, so a quickly reclaimed focus
    /// doesn't flicker it away.
    pub fn cancel_pulse_on_focus(&mut self) {
        if let Some(started) = self.pulse_started {
            if started.elapsed().as_secs_f64() >= PULSE_MIN_SECS {
                self.end_pulse();
            }
        }
    }

    #[cfg(test)]
    fn shell(&self) -> &S {
        &self.shell
    }

    #[cfg(test)]
    fn force_pulse_started(&mut self, at: Instant) {
        self.pulse_started = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Records shell calls; popups are ids whose liveness the test controls.
    #[derive(Default)]
    struct FakeShell {
        log: Rc<RefCell<Vec<String>>>,
        next_popup: u32,
        dead_popups: Rc<RefCell<Vec<u32>>>,
    }

    impl FakeShell {
        fn new() -> Self {
            Self::default()
        }

        fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    impl AgentShell for FakeShell {
        type Popup = u32;

        fn set_panel_visible(&mut self, visible: bool) {
            self.log.borrow_mut().push(format!("panel:{}", visible));
        }
        fn show_embedded(&mut self, visible: bool) {
            self.log.borrow_mut().push(format!("embedded:{}", visible));
        }
        fn navigate_embedded(&mut self, url: &str) {
            self.log.borrow_mut().push(format!("navigate:{}", url));
        }
        fn show_external_prompt(&mut self, agent: Option<AgentId>) {
            self.log
                .borrow_mut()
                .push(format!("prompt:{:?}", agent.map(|a| a.key())));
        }
        fn show_account_switcher(&mut self, visible: bool) {
            self.log.borrow_mut().push(format!("accounts:{}", visible));
        }
        fn focus_embedded(&mut self) {
            self.log.borrow_mut().push("focus".to_string());
        }
        fn pulse_embedded(&mut self, on: bool) {
            self.log.borrow_mut().push(format!("pulse:{}", on));
        }
        fn open_popup(&mut self, agent: AgentId, url: &str) -> Result<u32> {
            self.next_popup += 1;
            self.log
                .borrow_mut()
                .push(format!("open:{}:{}", agent.key(), url));
            Ok(self.next_popup)
        }
        fn popup_is_open(&self, popup: &mut u32) -> bool {
            !self.dead_popups.borrow().contains(popup)
        }
        fn focus_popup(&mut self, popup: &mut u32) {
            self.log.borrow_mut().push(format!("refocus:{}", popup));
        }
    }

    fn panel() -> AgentPanel<FakeShell> {
        AgentPanel::new(FakeShell::new())
    }

    #[test]
    fn test_switch_to_embeddable_navigates_account_url() {
        let mut p = panel();
        p.switch_agent(AgentId::Gemini, "2");

        assert_eq!(p.active(), Some(AgentId::Gemini));
        assert_eq!(p.embedded_url(), Some("https://gemini.google.com/u/2/app"));
        assert!(
            p.shell()
                .calls()
                .contains(&"navigate:https://gemini.google.com/u/2/app".to_string())
        );
        assert!(p.shell().calls().contains(&"accounts:true".to_string()));
    }

    #[test]
    fn test_switch_skips_reload_when_url_unchanged() {
        let mut p = panel();
        p.switch_agent(AgentId::Gemini, "2");
        assert_eq!(p.shell().count("navigate:"), 1);

        p.switch_agent(AgentId::Gemini, "2");
        assert_eq!(p.shell().count("navigate:"), 1, "same URL must not reload");

        p.switch_agent(AgentId::Gemini, "0");
        assert_eq!(p.shell().count("navigate:"), 2);
        assert_eq!(p.embedded_url(), Some("https://gemini.google.com/app"));
    }

    #[test]
    fn test_switch_to_external_agent_shows_prompt() {
        let mut p = panel();
        p.switch_agent(AgentId::Gemini, "0");
        p.switch_agent(AgentId::Grok, "0");

        let calls = p.shell().calls();
        // The embedded surface is hidden and the prompt shown for grok.
        assert!(calls.contains(&"prompt:Some(\"grok\")".to_string()));
        // Account switcher is only for the embeddable agent.
        assert!(calls.contains(&"accounts:false".to_string()));
        // Hide precedes the prompt.
        let hide_idx = calls.iter().rposition(|c| c == "embedded:false").unwrap();
        let prompt_idx = calls
            .iter()
            .rposition(|c| c == "prompt:Some(\"grok\")")
            .unwrap();
        assert!(hide_idx < prompt_idx);
    }

    #[test]
    fn test_popup_reused_while_alive() {
        let mut p = panel();
        p.open_external(AgentId::ChatGpt).unwrap();
        p.open_external(AgentId::ChatGpt).unwrap();

        assert_eq!(p.shell().count("open:"), 1);
        assert_eq!(p.shell().count("refocus:"), 1);
    }

    #[test]
    fn test_popup_reopened_when_closed() {
        let mut p = panel();
        p.open_external(AgentId::Perplexity).unwrap();

        // The window went away; the stale handle must not be refocused.
        p.shell().dead_popups.borrow_mut().push(1);
        p.open_external(AgentId::Perplexity).unwrap();

        assert_eq!(p.shell().count("open:"), 2);
        assert_eq!(p.shell().count("refocus:"), 0);
    }

    #[test]
    fn test_popups_are_tracked_per_agent() {
        let mut p = panel();
        p.open_external(AgentId::ChatGpt).unwrap();
        p.open_external(AgentId::Grok).unwrap();
        assert_eq!(p.shell().count("open:"), 2);
    }

    #[test]
    fn test_activate_with_closed_panel_adds_settle_delay() {
        let mut p = panel();
        let follow = p.activate(AgentId::Gemini, "0");
        assert!(p.is_open());
        assert_eq!(
            follow,
            ActivationFollowUp::EmbeddedCue {
                delay: PANEL_OPEN_DELAY_SECS
            }
        );
    }

    #[test]
    fn test_activate_with_open_panel_cues_immediately() {
        let mut p = panel();
        p.set_open(true, AgentId::Gemini, "0");
        let follow = p.activate(AgentId::Gemini, "0");
        assert_eq!(follow, ActivationFollowUp::EmbeddedCue { delay: 0.0 });
    }

    #[test]
    fn test_activate_external_agent_opens_popup_path() {
        let mut p = panel();
        p.set_open(true, AgentId::ChatGpt, "0");
        let follow = p.activate(AgentId::Gemini, "0");
        assert_eq!(
            follow,
            ActivationFollowUp::OpenPopup {
                delay: POPUP_DELAY_SECS
            }
        );
    }

    #[test]
    fn test_embedded_cue_is_stale_after_agent_change() {
        let mut p = panel();
        p.set_open(true, AgentId::Gemini, "0");
        // The agent changed while the cue timer was pending.
        p.switch_agent(AgentId::Grok, "0");
        assert!(!p.begin_embedded_cue());
        assert_eq!(p.shell().count("pulse:"), 0);
    }

    #[test]
    fn test_pulse_not_cancelled_before_minimum() {
        let mut p = panel();
        p.set_open(true, AgentId::Gemini, "0");
        assert!(p.begin_embedded_cue());

        p.cancel_pulse_on_focus();
        assert_eq!(p.shell().count("pulse:false"), 0, "too early to cancel");
    }

    #[test]
    fn test_pulse_cancelled_after_minimum() {
        let mut p = panel();
        p.set_open(true, AgentId::Gemini, "0");
        assert!(p.begin_embedded_cue());
        p.force_pulse_started(Instant::now() - Duration::from_millis(1500));

        p.cancel_pulse_on_focus();
        assert_eq!(p.shell().count("pulse:false"), 1);
    }
}
