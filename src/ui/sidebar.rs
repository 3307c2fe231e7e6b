//! Agent sidebar widgets and the production [`AgentShell`].
//!
//! FLTK has no web engine, so the "embedded surface" is an in-panel
//! HelpView pane carrying the account-scoped session URL and the paste
//! instructions; the focus and pulse cues land on it. Popups for
//! non-embeddable agents are handed to the system browser launcher, keeping
//! the spawned child as the reuse handle.

use std::process::Child;

use fltk::{
    app::Sender,
    button::Button,
    enums::{Align, Color, Event},
    frame::Frame,
    group::{Flex, FlexType, Group},
    menu::Choice,
    misc::HelpView,
    prelude::*,
    window::Window,
};

use crate::app::agent_panel::AgentShell;
use crate::app::agents::{AgentId, POPUP_HEIGHT, POPUP_WIDTH};
use crate::app::error::{AppError, Result};
use crate::app::messages::Message;

pub const SIDEBAR_WIDTH: i32 = 400;

fn surface_color() -> Color {
    Color::from_rgb(30, 30, 30)
}

fn pulse_color() -> Color {
    Color::from_rgb(250, 204, 21)
}

pub struct SidebarWidgets {
    pub group: Flex,
    pub agent_choice: Choice,
    pub account_wrapper: Flex,
    pub account_choice: Choice,
    pub rename_btn: Button,
    pub close_btn: Button,
    pub surface: Group,
    pub embedded: HelpView,
    pub placeholder_group: Flex,
    pub placeholder_label: Frame,
    pub open_window_btn: Button,
}

/// Build the sidebar inside the current group. `x`/`y`/`w`/`h` are the
/// initial bounds; the parent row flexes it afterwards.
pub fn build_sidebar(x: i32, y: i32, w: i32, h: i32, sender: &Sender<Message>) -> SidebarWidgets {
    let mut group = Flex::new(x, y, w, h, None);
    group.set_type(FlexType::Column);
    group.set_margin(6);
    group.set_pad(6);

    // Header row: title + close button.
    let mut header = Flex::new(x, y, w, 28, None);
    header.set_type(FlexType::Row);
    let mut title = Frame::new(0, 0, 0, 0, "AI Agent");
    title.set_align(Align::Inside | Align::Left);
    title.set_label_size(14);
    let mut close_btn = Button::new(0, 0, 0, 0, "@1+");
    close_btn.set_tooltip("Close panel (Ctrl+B)");
    header.fixed(&close_btn, 28);
    header.end();
    group.fixed(&header, 28);

    let mut agent_choice = Choice::new(0, 0, 0, 0, None);
    agent_choice.add_choice("Gemini|Grok|ChatGPT|Perplexity");
    agent_choice.set_value(0);
    group.fixed(&agent_choice, 28);

    // Account switcher, visible only for the embeddable agent.
    let mut account_wrapper = Flex::new(0, 0, w, 28, None);
    account_wrapper.set_type(FlexType::Row);
    let account_choice = Choice::new(0, 0, 0, 0, None);
    let mut rename_btn = Button::new(0, 0, 0, 0, "Rename");
    rename_btn.set_tooltip("Rename this account slot");
    account_wrapper.fixed(&rename_btn, 70);
    account_wrapper.end();
    group.fixed(&account_wrapper, 28);

    // Surface area: the embedded pane and the external-agent prompt overlap;
    // exactly one is shown at a time.
    let surface_h = (h - 110).max(100);
    let mut surface = Group::new(x, y + 96, w - 12, surface_h, None);

    // Colors and sizing for the pane content come from the markup itself.
    let mut embedded = HelpView::new(x, y + 96, w - 12, surface_h, "");
    embedded.set_color(surface_color());
    embedded.hide();

    let mut placeholder_group = Flex::new(x, y + 96, w - 12, surface_h, None);
    placeholder_group.set_type(FlexType::Column);
    placeholder_group.set_margin(12);
    let mut placeholder_label = Frame::new(0, 0, 0, 0, "");
    placeholder_label.set_align(Align::Inside | Align::Center | Align::Wrap);
    let mut open_window_btn = Button::new(0, 0, 0, 0, "Open Agent Window");
    placeholder_group.fixed(&open_window_btn, 36);
    placeholder_group.end();
    placeholder_group.hide();

    surface.resizable(&embedded);
    surface.end();
    group.end();
    group.hide();

    // Focus landing on the embedded pane may cancel the pulse early.
    {
        let s = *sender;
        embedded.handle(move |_, ev| {
            if matches!(ev, Event::Push | Event::Focus) {
                s.send(Message::EmbeddedSurfaceClicked);
            }
            false
        });
    }

    {
        let s = *sender;
        close_btn.set_callback(move |_| s.send(Message::CloseSidebar));
    }
    {
        let s = *sender;
        agent_choice.set_callback(move |_| s.send(Message::AgentSelected));
    }
    {
        let s = *sender;
        let mut account_choice = account_choice.clone();
        account_choice.set_callback(move |_| s.send(Message::AccountChanged));
    }
    {
        let s = *sender;
        rename_btn.set_callback(move |_| s.send(Message::RenameAccount));
    }

    SidebarWidgets {
        group,
        agent_choice,
        account_wrapper,
        account_choice,
        rename_btn,
        close_btn,
        surface,
        embedded,
        placeholder_group,
        placeholder_label,
        open_window_btn,
    }
}

/// Production shell: drives the sidebar widgets and the system browser.
pub struct FltkShell {
    content_row: Flex,
    wind: Window,
    sender: Sender<Message>,
    widgets: SidebarWidgets,
}

impl FltkShell {
    pub fn new(content_row: Flex, wind: Window, sender: Sender<Message>, widgets: SidebarWidgets) -> Self {
        Self {
            content_row,
            wind,
            sender,
            widgets,
        }
    }
}

impl AgentShell for FltkShell {
    type Popup = Child;

    fn set_panel_visible(&mut self, visible: bool) {
        if visible {
            self.content_row.fixed(&self.widgets.group, SIDEBAR_WIDTH);
            self.widgets.group.show();
        } else {
            self.content_row.fixed(&self.widgets.group, 0);
            self.widgets.group.hide();
        }
        self.wind.redraw();
    }

    fn show_embedded(&mut self, visible: bool) {
        if visible {
            self.widgets.embedded.show();
        } else {
            self.widgets.embedded.hide();
        }
    }

    fn navigate_embedded(&mut self, url: &str) {
        self.widgets.embedded.set_value(&surface_markup(url));
        self.widgets.embedded.redraw();
    }

    fn show_external_prompt(&mut self, agent: Option<AgentId>) {
        match agent {
            Some(agent) => {
                self.widgets
                    .placeholder_label
                    .set_label(&prompt_text(agent));
                self.widgets
                    .open_window_btn
                    .set_label(&format!("Open {} Window", agent.display_name()));
                let s = self.sender;
                self.widgets
                    .open_window_btn
                    .set_callback(move |_| s.send(Message::OpenExternalAgent(agent)));
                self.widgets.placeholder_group.show();
            }
            None => self.widgets.placeholder_group.hide(),
        }
        self.wind.redraw();
    }

    fn show_account_switcher(&mut self, visible: bool) {
        if visible {
            self.widgets.account_wrapper.show();
        } else {
            self.widgets.account_wrapper.hide();
        }
        self.wind.redraw();
    }

    fn focus_embedded(&mut self) {
        let _ = self.widgets.embedded.take_focus();
    }

    fn pulse_embedded(&mut self, on: bool) {
        let color = if on { pulse_color() } else { surface_color() };
        self.widgets.embedded.set_color(color);
        self.widgets.embedded.redraw();
    }

    fn open_popup(&mut self, agent: AgentId, url: &str) -> Result<Child> {
        // Launcher hand-off: the first launcher that spawns wins. The child
        // is the reuse handle; launchers that exit right after handing off
        // read as closed, and the next activation simply opens again (the
        // browser reuses its window).
        let mut last_err: Option<std::io::Error> = None;
        for mut cmd in open::commands(url) {
            match cmd.spawn() {
                Ok(child) => return Ok(child),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => AppError::Io(e),
            None => AppError::Popup(format!(
                "no launcher available for {}",
                agent.display_name()
            )),
        })
    }

    fn popup_is_open(&self, popup: &mut Child) -> bool {
        matches!(popup.try_wait(), Ok(None))
    }

    fn focus_popup(&mut self, _popup: &mut Child) {
        // The window manager owns focus of the spawned window; reuse only
        // guarantees we don't spawn a duplicate launcher.
    }
}

fn surface_markup(url: &str) -> String {
    format!(
        "<body bgcolor=\"#1e1e1e\" text=\"#dcdcdc\"><font face=\"Helvetica\" size=\"3\">\
         <h3>Gemini session</h3>\
         <p>Surface URL: <a href=\"{url}\">{url}</a></p>\
         <p>The copied query is on the clipboard; paste it with Ctrl+V once \
         the agent window has focus.</p>\
         </font></body>"
    )
}

fn prompt_text(agent: AgentId) -> String {
    let mut text = format!(
        "{} cannot be embedded directly.\n\nOpens as a floating {}x{} popup window \
         (no toolbar or menubar).",
        agent.display_name(),
        POPUP_WIDTH,
        POPUP_HEIGHT
    );
    if agent == AgentId::ChatGpt {
        text.push_str("\n\nNote: ChatGPT opens a new window for every auto-trigger.");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text_names_agent_and_geometry() {
        let text = prompt_text(AgentId::Grok);
        assert!(text.contains("Grok"));
        assert!(text.contains("600x900"));
        assert!(!text.contains("auto-trigger"));

        let chatgpt = prompt_text(AgentId::ChatGpt);
        assert!(chatgpt.contains("new window for every auto-trigger"));
    }

    #[test]
    fn test_surface_markup_embeds_url() {
        let markup = surface_markup("https://gemini.google.com/u/2/app");
        assert!(markup.contains("href=\"https://gemini.google.com/u/2/app\""));
    }
}
