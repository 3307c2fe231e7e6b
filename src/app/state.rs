//! Application coordinator: owns the widgets, the controllers, and the
//! dispatch table the main loop feeds with channel messages.
//!
//! Timers never mutate state directly; they send a generation-stamped
//! message, and the handler re-checks the stamp and the current state
//! before acting, because anything may have changed while the timeout was
//! pending.

use fltk::{app, dialog, enums::Font, prelude::*};

use super::agent_panel::{ActivationFollowUp, AgentPanel, FOCUS_RETRY_SECS, PULSE_SECS};
use super::agents::{ACCOUNT_SLOTS, AgentId};
use super::buffer_utils::buffer_text;
use super::clipboard;
use super::messages::Message;
use super::overlay::{Layer, OverlaySet};
use super::search::{self, SearchState};
use super::selection::{self, AutoAction, DEBOUNCE_SECS, SelectionDispatcher};
use super::settings::AppSettings;
use super::syntax::{RenderOutput, Renderer};
use super::view::ViewMode;
use crate::ui::main_window::{HEADER_H, INPUT_HINT, MainWidgets, OUTLINE_W};
use crate::ui::sidebar::{FltkShell, SidebarWidgets};
use crate::ui::toast::Toast;

/// Attention pulse behind an outline jump.
const OUTLINE_PULSE_SECS: f64 = 1.5;
/// How long the Copy All button shows its confirmation label.
const COPY_CONFIRM_SECS: f64 = 2.0;

const EDITOR_FONT_SIZE: i32 = 14;

pub struct AppState {
    pub main: MainWidgets,
    pub panel: AgentPanel<FltkShell>,
    pub settings: AppSettings,
    pub view: ViewMode,
    sender: app::Sender<Message>,
    renderer: Renderer,
    rendered: Option<RenderOutput>,
    overlays: OverlaySet,
    search: SearchState,
    selection: SelectionDispatcher,
    activation_generation: u64,
    outline_pulse_generation: u64,
    header_collapsed: bool,
    outline_collapsed: bool,
    toast: Toast,
    agent_choice: fltk::menu::Choice,
    account_choice: fltk::menu::Choice,
}

impl AppState {
    pub fn new(
        mut main: MainWidgets,
        sidebar: SidebarWidgets,
        sender: app::Sender<Message>,
    ) -> Self {
        main.editor.set_text_font(Font::Courier);
        main.editor.set_text_size(EDITOR_FONT_SIZE);
        main.output.set_text_font(Font::Courier);
        main.output.set_text_size(EDITOR_FONT_SIZE);

        let agent_choice = sidebar.agent_choice.clone();
        let account_choice = sidebar.account_choice.clone();
        let shell = FltkShell::new(main.content_row.clone(), main.wind.clone(), sender, sidebar);

        Self {
            panel: AgentPanel::new(shell),
            settings: AppSettings::default(),
            view: ViewMode::Editing,
            sender,
            renderer: Renderer::new(Font::Courier, EDITOR_FONT_SIZE),
            rendered: None,
            overlays: OverlaySet::new(),
            search: SearchState::default(),
            selection: SelectionDispatcher::new(),
            activation_generation: 0,
            outline_pulse_generation: 0,
            header_collapsed: false,
            outline_collapsed: false,
            toast: Toast::new(),
            agent_choice,
            account_choice,
            main,
        }
    }

    /// Central dispatch for every channel message.
    pub fn handle(&mut self, message: Message) {
        match message {
            Message::RenderCode => self.render_code(true),
            Message::BackToEdit => self.switch_view(ViewMode::Editing, true),
            Message::ClearInput => self.clear_input(),
            Message::PasteInput => self.paste_input(),
            Message::CopyAllInput => self.copy_all_input(),
            Message::RestoreCopyLabel => self.main.copy_btn.set_label("Copy All"),
            Message::ContentChanged => self.content_changed(),

            Message::AutoCopyToggled => self.auto_copy_toggled(),
            Message::AutoHighlightToggled => self.auto_highlight_toggled(),
            Message::AutoFormatToggled => self.auto_format_toggled(),
            Message::TemplateChanged => self.save_state(),

            Message::ToggleHeader => self.collapse_header(!self.header_collapsed),
            Message::ToggleOutline => self.toggle_outline(),
            Message::OutlineJump(idx) => self.outline_jump(idx),
            Message::OutlinePulseExpired(stamp) => self.outline_pulse_expired(stamp),

            Message::ToggleSidebar => self.set_sidebar_open(!self.panel.is_open()),
            Message::CloseSidebar => self.set_sidebar_open(false),
            Message::AgentSelected => self.agent_selected(),
            Message::AccountChanged => self.account_changed(),
            Message::RenameAccount => self.rename_account(),
            Message::OpenExternalAgent(agent) => self.open_external(agent),
            Message::SendSelectionToAgent => self.send_selection_to_agent(),

            Message::EmbeddedCue(stamp) => self.embedded_cue(stamp),
            Message::FocusEmbedded(stamp) => {
                if stamp == self.activation_generation {
                    self.panel.retry_focus();
                }
            }
            Message::PulseExpired(stamp) => {
                if stamp == self.activation_generation {
                    self.panel.end_pulse();
                }
            }
            Message::OpenActivePopup(stamp) => self.open_active_popup(stamp),
            Message::EmbeddedSurfaceClicked => self.panel.cancel_pulse_on_focus(),

            Message::SelectionMade => self.selection_made(),
            Message::SelectionSettled(stamp) => self.selection_settled(stamp),

            Message::SearchChanged => self.run_search(),
            Message::SearchNext => self.search_step(true),
            Message::SearchPrev => self.search_step(false),
            Message::SearchClose => self.search_close(),
            Message::FocusSearch => self.focus_search(),

            Message::Quit => self.quit(),
        }
    }

    // --- Persistence ---

    /// Rehydrate every component from the persisted record.
    pub fn load_state(&mut self) {
        self.settings = AppSettings::load();
        let restored = self.settings.clone();

        self.main.editor_buffer.set_text(&restored.content);
        self.main.auto_copy_toggle.set_value(restored.auto_copy);
        self.main
            .auto_highlight_toggle
            .set_value(restored.auto_highlight);
        self.main.auto_format_toggle.set_value(restored.auto_format);
        self.main.template_input.set_value(&restored.query_template);

        let agent_idx = AgentId::ALL
            .iter()
            .position(|a| *a == restored.last_agent)
            .unwrap_or(0);
        self.agent_choice.set_value(agent_idx as i32);
        self.refresh_account_choice();

        if restored.active_view.is_rendered() && !restored.content.trim().is_empty() {
            // Re-render when the session ended in the rendered view.
            self.render_code(false);
        } else {
            self.switch_view(ViewMode::Editing, false);
        }

        if restored.sidebar_open {
            self.panel
                .set_open(true, restored.last_agent, &restored.account_index);
        }
        self.update_input_hint();
    }

    /// Capture current values from all observed controls and persist them.
    /// A write failure is logged and the session carries on.
    pub fn save_state(&mut self) {
        self.settings.content = buffer_text(&self.main.editor_buffer);
        self.settings.auto_copy = self.main.auto_copy_toggle.is_checked();
        self.settings.auto_highlight = self.main.auto_highlight_toggle.is_checked();
        self.settings.auto_format = self.main.auto_format_toggle.is_checked();
        self.settings.query_template = self.main.template_input.value();
        self.settings.last_agent = self.panel.active().unwrap_or_else(|| self.selected_agent());
        self.settings.sidebar_open = self.panel.is_open();
        self.settings.active_view = self.view;
        self.settings.account_index = self.account_index();

        if let Err(e) = self.settings.save() {
            eprintln!("Failed to save state: {}", e);
        }
    }

    // --- View transitions ---

    pub fn switch_view(&mut self, mode: ViewMode, persist: bool) {
        // Every transition drops live selections and any pending auto action.
        self.selection.cancel();
        self.main.editor_buffer.unselect();
        self.main.output_buffer.unselect();

        self.view = mode;
        match mode {
            ViewMode::Rendered => {
                self.main.input_group.hide();
                self.main.output_group.show();
            }
            ViewMode::Editing => {
                self.main.output_group.hide();
                self.main.input_group.show();
                let _ = self.main.editor.take_focus();
            }
        }
        self.main.wind.redraw();
        if persist {
            self.save_state();
        }
    }

    /// Render the source buffer: one highlight pass, badge update, outline
    /// rebuild, then the view switch. A highlight failure shows the error
    /// badge and leaves the output empty; there is no retry.
    pub fn render_code(&mut self, persist: bool) {
        let raw = buffer_text(&self.main.editor_buffer);
        if raw.trim().is_empty() {
            return;
        }
        if persist {
            self.save_state();
        }
        self.selection.cancel();

        match self.renderer.render(&raw) {
            Ok(output) => {
                self.main.output_buffer.set_text(&raw);
                self.main.style_buffer.set_text(&output.style_string);
                let style_buf = self.main.style_buffer.clone();
                let table = self.renderer.style_table();
                self.main.output.set_highlight_data(style_buf, table);
                let badge = match &output.language {
                    Some(lang) => format!("Detected: {}", lang),
                    None => "Detected: Plain Text".to_string(),
                };
                self.main.lang_badge.set_label(&badge);

                self.rendered = Some(output);
                self.overlays.clear_all();
                self.rebuild_outline();
                self.collapse_header(true);
                self.switch_view(ViewMode::Rendered, persist);
                // The match set is rebuilt on every re-render.
                self.run_search();
            }
            Err(e) => {
                eprintln!("Highlight error: {}", e);
                self.rendered = None;
                self.main.output_buffer.set_text("");
                self.main.style_buffer.set_text("");
                self.main.lang_badge.set_label("Error parsing");
                self.overlays.clear_all();
                self.rebuild_outline();
            }
        }
    }

    fn collapse_header(&mut self, collapsed: bool) {
        self.header_collapsed = collapsed;
        if collapsed {
            self.main.flex.fixed(&self.main.header_row, 0);
            self.main.header_row.hide();
        } else {
            self.main.flex.fixed(&self.main.header_row, HEADER_H);
            self.main.header_row.show();
        }
        self.main.wind.redraw();
    }

    // --- Editor verbs ---

    fn clear_input(&mut self) {
        self.main.editor_buffer.set_text("");
        self.main.output_buffer.set_text("");
        self.main.style_buffer.set_text("");
        self.main.lang_badge.set_label("Detected: None");
        self.rendered = None;
        self.overlays.clear_all();
        self.search = SearchState::default();
        self.rebuild_outline();
        let _ = self.main.editor.take_focus();
    }

    fn paste_input(&mut self) {
        match clipboard::read_text() {
            Ok(text) => {
                self.main.editor_buffer.set_text(&text);
            }
            Err(e) => {
                eprintln!("{}", e);
                // Degrade to the manual route, surfaced where the
                // placeholder hint lives.
                self.main.input_hint.set_label("Pasting failed. Use Ctrl+V.");
            }
        }
    }

    fn copy_all_input(&mut self) {
        let text = buffer_text(&self.main.editor_buffer);
        if text.is_empty() {
            return;
        }
        match clipboard::copy_text(&text) {
            Ok(()) => {
                self.main.copy_btn.set_label("Copied!");
                let s = self.sender;
                app::add_timeout3(COPY_CONFIRM_SECS, move |_| {
                    s.send(Message::RestoreCopyLabel);
                });
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    fn content_changed(&mut self) {
        self.update_input_hint();
        self.save_state();
    }

    fn update_input_hint(&mut self) {
        if self.main.editor_buffer.length() == 0 {
            self.main.input_hint.set_label(INPUT_HINT);
        } else {
            self.main.input_hint.set_label("");
        }
    }

    // --- Settings toolbar ---

    fn auto_copy_toggled(&mut self) {
        if self.main.auto_copy_toggle.is_checked() {
            self.main.auto_format_toggle.set_value(false);
        }
        self.save_state();
    }

    fn auto_format_toggled(&mut self) {
        if self.main.auto_format_toggle.is_checked() {
            self.main.auto_copy_toggle.set_value(false);
        }
        self.save_state();
    }

    fn auto_highlight_toggled(&mut self) {
        if !self.main.auto_highlight_toggle.is_checked() {
            self.overlays.clear(Layer::AutoHighlight);
            self.recompose_styles();
        }
        self.save_state();
    }

    // --- Outline ---

    fn rebuild_outline(&mut self) {
        self.main.outline_list.clear();
        let labels: Vec<String> = self
            .rendered
            .as_ref()
            .map(|r| r.outline.iter().map(|e| e.label.clone()).collect())
            .unwrap_or_default();

        if labels.is_empty() {
            // Hidden rather than shown empty.
            self.main.body_row.fixed(&self.main.outline_panel, 0);
            self.main.outline_panel.hide();
        } else {
            for label in &labels {
                // '@' starts a browser format sequence; double it to show
                // the literal character.
                self.main.outline_list.add(&label.replace('@', "@@"));
            }
            self.outline_collapsed = false;
            self.main.body_row.fixed(&self.main.outline_panel, OUTLINE_W);
            self.main.outline_panel.show();
        }
        self.main.wind.redraw();
    }

    fn toggle_outline(&mut self) {
        let has_entries = self
            .rendered
            .as_ref()
            .map(|r| !r.outline.is_empty())
            .unwrap_or(false);
        if !has_entries {
            return;
        }
        self.outline_collapsed = !self.outline_collapsed;
        if self.outline_collapsed {
            self.main.body_row.fixed(&self.main.outline_panel, 0);
            self.main.outline_panel.hide();
        } else {
            self.main.body_row.fixed(&self.main.outline_panel, OUTLINE_W);
            self.main.outline_panel.show();
        }
        self.main.wind.redraw();
    }

    fn outline_jump(&mut self, idx: usize) {
        let Some((start, end)) = self
            .rendered
            .as_ref()
            .and_then(|r| r.outline.get(idx))
            .map(|e| (e.start, e.end))
        else {
            return;
        };

        self.scroll_output_to(start);

        // Transient pulse; purely attention-drawing, no data change.
        self.outline_pulse_generation += 1;
        let stamp = self.outline_pulse_generation;
        self.overlays.set(Layer::Pulse, vec![(start, end)]);
        self.recompose_styles();
        let s = self.sender;
        app::add_timeout3(OUTLINE_PULSE_SECS, move |_| {
            s.send(Message::OutlinePulseExpired(stamp));
        });
    }

    fn outline_pulse_expired(&mut self, stamp: u64) {
        if stamp != self.outline_pulse_generation {
            return;
        }
        self.overlays.clear(Layer::Pulse);
        self.recompose_styles();
    }

    // --- Selection dispatch ---

    fn selection_made(&mut self) {
        if !self.view.is_rendered() {
            return;
        }
        let mut out_buf = self.main.output_buffer.clone();
        let Some((start, end)) = out_buf.selection_position() else {
            return;
        };
        if start >= end {
            return;
        }
        let text = out_buf.selection_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.main.auto_highlight_toggle.is_checked() {
            self.overlays
                .set(Layer::AutoHighlight, vec![(start as usize, end as usize)]);
            self.recompose_styles();
        }

        let wants_auto = self.main.auto_copy_toggle.is_checked()
            || self.main.auto_format_toggle.is_checked();
        if wants_auto {
            let stamp = self.selection.arm(trimmed.to_string());
            let s = self.sender;
            app::add_timeout3(DEBOUNCE_SECS, move |_| {
                s.send(Message::SelectionSettled(stamp));
            });
        }
    }

    fn selection_settled(&mut self, stamp: u64) {
        let Some(text) = self.selection.settle(stamp) else {
            return;
        };
        if !self.view.is_rendered() {
            return;
        }

        // Preferences may have changed during the debounce; read them fresh.
        self.settings.auto_copy = self.main.auto_copy_toggle.is_checked();
        self.settings.auto_format = self.main.auto_format_toggle.is_checked();
        self.settings.query_template = self.main.template_input.value();

        match selection::auto_action(&self.settings, &text) {
            AutoAction::Copy(raw) => {
                match clipboard::copy_text(&raw) {
                    Ok(()) => self.show_toast("Auto-Copied!", 1.5),
                    Err(e) => {
                        eprintln!("{}", e);
                        self.show_toast("Copy failed.", 2.0);
                    }
                }
                // Consume the selection so a stale one can't re-trigger.
                self.main.output_buffer.unselect();
            }
            AutoAction::SendToAgent(query) => {
                self.activate_ai(&query);
                self.main.output_buffer.unselect();
            }
            AutoAction::None => {}
        }
    }

    fn send_selection_to_agent(&mut self) {
        let mut buffer = if self.view.is_rendered() {
            self.main.output_buffer.clone()
        } else {
            self.main.editor_buffer.clone()
        };
        let text = buffer.selection_text();
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            return;
        }
        let query = selection::build_query(&self.main.template_input.value(), &trimmed);
        self.activate_ai(&query);
    }

    // --- Agent panel ---

    fn selected_agent(&self) -> AgentId {
        AgentId::ALL
            .get(self.agent_choice.value().max(0) as usize)
            .copied()
            .unwrap_or_default()
    }

    fn account_index(&self) -> String {
        ACCOUNT_SLOTS
            .get(self.account_choice.value().max(0) as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "0".to_string())
    }

    fn refresh_account_choice(&mut self) {
        self.account_choice.clear();
        for slot in ACCOUNT_SLOTS {
            // '|' is the choice separator; keep user labels literal.
            let label = self.settings.account_label(slot).replace('|', "/");
            self.account_choice.add_choice(&label);
        }
        let idx = ACCOUNT_SLOTS
            .iter()
            .position(|s| *s == self.settings.account_index)
            .unwrap_or(0);
        self.account_choice.set_value(idx as i32);
    }

    fn set_sidebar_open(&mut self, open: bool) {
        let fallback = self.selected_agent();
        let account = self.account_index();
        self.panel.set_open(open, fallback, &account);
        self.save_state();
    }

    fn agent_selected(&mut self) {
        let agent = self.selected_agent();
        let account = self.account_index();
        self.panel.switch_agent(agent, &account);
        self.save_state();
    }

    fn account_changed(&mut self) {
        self.save_state();
        // Re-run the switch so the embedded surface picks up the new URL.
        if self.panel.active() == Some(AgentId::Gemini) {
            let account = self.account_index();
            self.panel.switch_agent(AgentId::Gemini, &account);
        }
    }

    fn rename_account(&mut self) {
        let slot = self.account_index();
        let current = self.settings.account_label(&slot);
        let prompt = format!(
            "Enter a display name for Account {} (e.g. \"Personal\"):",
            slot
        );
        let Some(new_label) = dialog::input_default(&prompt, &current) else {
            return;
        };
        let trimmed = new_label.trim().to_string();
        if trimmed.is_empty() {
            return;
        }

        self.settings.account_index = slot.clone();
        self.settings.account_labels.insert(slot, trimmed.clone());
        self.refresh_account_choice();
        self.save_state();
        self.show_toast(&format!("Renamed to \"{}\"", trimmed), 2.0);
    }

    fn open_external(&mut self, agent: AgentId) {
        if let Err(e) = self.panel.open_external(agent) {
            eprintln!("Failed to open agent window: {}", e);
            self.show_toast("Could not open agent window.", 2.0);
        }
    }

    /// The activation routine: open the panel, copy the query, then cue the
    /// embedded surface or the popup. The user pastes manually; the query
    /// cannot be injected into the agent.
    fn activate_ai(&mut self, query: &str) {
        self.activation_generation += 1;
        let stamp = self.activation_generation;

        let fallback = self.selected_agent();
        let account = self.account_index();
        let follow_up = self.panel.activate(fallback, &account);

        match clipboard::copy_text(query) {
            Ok(()) => {
                let agent = self.panel.active().unwrap_or(fallback);
                let message = if self.main.auto_format_toggle.is_checked() {
                    format!("Copied & formatted, paste it to {}", agent.display_name())
                } else {
                    "Copied!".to_string()
                };
                self.show_toast(&message, 2.5);
            }
            Err(e) => {
                eprintln!("{}", e);
                self.show_toast("Copy failed.", 2.0);
            }
        }

        let s = self.sender;
        match follow_up {
            ActivationFollowUp::EmbeddedCue { delay } => {
                app::add_timeout3(delay, move |_| s.send(Message::EmbeddedCue(stamp)));
            }
            ActivationFollowUp::OpenPopup { delay } => {
                app::add_timeout3(delay, move |_| s.send(Message::OpenActivePopup(stamp)));
            }
        }
        self.save_state();
    }

    fn embedded_cue(&mut self, stamp: u64) {
        if stamp != self.activation_generation {
            return;
        }
        if !self.panel.begin_embedded_cue() {
            return;
        }
        self.show_toast("Ready to Paste! (Ctrl+V)", 3.0);

        let s = self.sender;
        for delay in FOCUS_RETRY_SECS {
            app::add_timeout3(delay, move |_| s.send(Message::FocusEmbedded(stamp)));
        }
        app::add_timeout3(PULSE_SECS, move |_| s.send(Message::PulseExpired(stamp)));
    }

    fn open_active_popup(&mut self, stamp: u64) {
        if stamp != self.activation_generation {
            return;
        }
        let Some(agent) = self.panel.active() else {
            return;
        };
        if agent.is_embeddable() {
            // The agent changed to the embedded one while the timer was
            // pending; nothing to open.
            return;
        }
        self.open_external(agent);
    }

    // --- In-page search ---

    fn run_search(&mut self) {
        let term = self.main.search_input.value();
        let text = if self.rendered.is_some() {
            buffer_text(&self.main.output_buffer)
        } else {
            String::new()
        };

        match SearchState::build(&text, &term) {
            Ok(state) => {
                self.search = state;
                self.apply_search_overlays();
                if term.is_empty() {
                    self.main.search_count.set_label("");
                    self.main.search_count.hide();
                } else {
                    self.main.search_count.set_label(&self.search.counter_label());
                    self.main.search_count.show();
                }
                self.scroll_to_active_match();
            }
            Err(e) => {
                // Prior search state stays untouched.
                eprintln!("{}", e);
            }
        }
    }

    fn search_step(&mut self, forward: bool) {
        if forward {
            self.search.next();
        } else {
            self.search.prev();
        }
        if !self.search.is_empty() {
            self.main.search_count.set_label(&self.search.counter_label());
        }
        self.apply_search_overlays();
        self.scroll_to_active_match();
    }

    fn search_close(&mut self) {
        self.main.search_input.set_value("");
        self.run_search();
    }

    fn focus_search(&mut self) {
        // Only meaningful while the rendered view is up.
        if self.view.is_rendered() {
            let _ = self.main.search_input.take_focus();
        }
    }

    fn apply_search_overlays(&mut self) {
        let all: Vec<(usize, usize)> = self
            .search
            .matches
            .iter()
            .map(|m| (m.start, m.end))
            .collect();
        self.overlays.set(Layer::SearchResult, all);
        match self.search.active_range() {
            Some(m) => self
                .overlays
                .set(Layer::SearchActive, vec![(m.start, m.end)]),
            None => self.overlays.clear(Layer::SearchActive),
        }
        self.recompose_styles();
    }

    fn scroll_to_active_match(&mut self) {
        let Some(rendered) = &self.rendered else {
            return;
        };
        let Some(active) = self.search.active_range() else {
            return;
        };
        // Anchor on the segment holding the match start.
        if let Some((start_pos, _end_pos)) = search::resolve_bounds(&rendered.segments, active) {
            let segment = rendered.segments[start_pos.segment];
            let anchor = segment.start + start_pos.offset;
            self.scroll_output_to(anchor);
        }
    }

    // --- Shared helpers ---

    fn recompose_styles(&mut self) {
        if let Some(rendered) = &self.rendered {
            self.main
                .style_buffer
                .set_text(&self.overlays.compose(&rendered.style_string));
            self.main.output.redraw();
        }
    }

    fn scroll_output_to(&mut self, pos: usize) {
        self.main.output.set_insert_position(pos as i32);
        self.main.output.show_insert_position();
    }

    fn show_toast(&mut self, message: &str, secs: f64) {
        self.toast.show(&self.main.wind, message, secs);
    }

    fn quit(&mut self) {
        self.save_state();
        app::quit();
    }
}
