use fltk::{
    app::{self, Sender},
    browser::HoldBrowser,
    button::{Button, CheckButton},
    enums::{Align, Event, EventState, Key},
    frame::Frame,
    group::{Flex, FlexType, Group},
    input::Input,
    menu::MenuBar,
    prelude::*,
    text::{TextBuffer, TextDisplay, TextEditor},
    window::Window,
};

use crate::app::messages::Message;

use super::sidebar::{self, SidebarWidgets};

pub const WINDOW_W: i32 = 1200;
pub const WINDOW_H: i32 = 760;
pub const MENU_H: i32 = 30;
pub const HEADER_H: i32 = 56;
pub const OUTLINE_W: i32 = 220;

pub const INPUT_HINT: &str = "Paste or type code, then Render (Ctrl+Enter)";

pub struct MainWidgets {
    pub wind: Window,
    pub flex: Flex,
    pub menu: MenuBar,
    pub header_row: Flex,
    pub header_title: Frame,
    pub header_toggle: Button,
    pub content_row: Flex,
    pub main_area: Group,

    // Input view
    pub input_group: Flex,
    pub render_btn: Button,
    pub clear_btn: Button,
    pub paste_btn: Button,
    pub copy_btn: Button,
    pub input_hint: Frame,
    pub editor: TextEditor,
    pub editor_buffer: TextBuffer,

    // Output view
    pub output_group: Flex,
    pub back_btn: Button,
    pub lang_badge: Frame,
    pub auto_highlight_toggle: CheckButton,
    pub auto_copy_toggle: CheckButton,
    pub auto_format_toggle: CheckButton,
    pub template_input: Input,
    pub search_input: Input,
    pub search_count: Frame,
    pub search_prev: Button,
    pub search_next: Button,
    pub search_close: Button,
    pub outline_toggle: Button,
    pub body_row: Flex,
    pub output: TextDisplay,
    pub output_buffer: TextBuffer,
    pub style_buffer: TextBuffer,
    pub outline_panel: Flex,
    pub outline_list: HoldBrowser,
}

pub fn build_main_window(sender: &Sender<Message>) -> (MainWidgets, SidebarWidgets) {
    let mut wind = Window::new(100, 100, WINDOW_W, WINDOW_H, "CodeScope");
    wind.set_xclass("CodeScope");

    let mut flex = Flex::new(0, 0, WINDOW_W, WINDOW_H, None);
    flex.set_type(FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, MENU_H, "");
    flex.fixed(&menu, MENU_H);

    // Collapsible header; rendering auto-collapses it.
    let mut header_row = Flex::new(0, MENU_H, WINDOW_W, HEADER_H, None);
    header_row.set_type(FlexType::Row);
    header_row.set_margin(8);
    let mut header_title = Frame::new(0, 0, 0, 0, "CodeScope: paste code, read it highlighted, ask an agent about it");
    header_title.set_align(Align::Inside | Align::Left);
    header_title.set_label_size(16);
    let mut header_toggle = Button::new(0, 0, 0, 0, "@2>");
    header_toggle.set_tooltip("Collapse header");
    header_row.fixed(&header_toggle, 28);
    header_row.end();
    flex.fixed(&header_row, HEADER_H);

    let content_y = MENU_H + HEADER_H;
    let content_h = WINDOW_H - content_y;
    let mut content_row = Flex::new(0, content_y, WINDOW_W, content_h, None);
    content_row.set_type(FlexType::Row);

    // The two views overlap inside one group; exactly one is shown.
    let mut main_area = Group::new(0, content_y, WINDOW_W, content_h, None);

    // --- Input view ---
    let mut input_group = Flex::new(0, content_y, WINDOW_W, content_h, None);
    input_group.set_type(FlexType::Column);
    input_group.set_margin(6);
    input_group.set_pad(6);

    let mut input_toolbar = Flex::new(0, 0, WINDOW_W, 36, None);
    input_toolbar.set_type(FlexType::Row);
    let mut paste_btn = Button::new(0, 0, 0, 0, "Paste");
    let mut clear_btn = Button::new(0, 0, 0, 0, "Clear");
    let mut copy_btn = Button::new(0, 0, 0, 0, "Copy All");
    let mut input_hint = Frame::new(0, 0, 0, 0, INPUT_HINT);
    input_hint.set_align(Align::Inside | Align::Left);
    let mut render_btn = Button::new(0, 0, 0, 0, "Render (Ctrl+Enter)");
    input_toolbar.fixed(&paste_btn, 80);
    input_toolbar.fixed(&clear_btn, 80);
    input_toolbar.fixed(&copy_btn, 90);
    input_toolbar.fixed(&render_btn, 160);
    input_toolbar.end();
    input_group.fixed(&input_toolbar, 36);

    let editor_buffer = TextBuffer::default();
    let mut editor = TextEditor::new(0, 0, 0, 0, "");
    editor.set_buffer(editor_buffer.clone());
    input_group.end();

    // --- Output view ---
    let mut output_group = Flex::new(0, content_y, WINDOW_W, content_h, None);
    output_group.set_type(FlexType::Column);
    output_group.set_margin(6);
    output_group.set_pad(6);

    let mut settings_bar = Flex::new(0, 0, WINDOW_W, 32, None);
    settings_bar.set_type(FlexType::Row);
    let mut back_btn = Button::new(0, 0, 0, 0, "Back to Edit");
    let mut lang_badge = Frame::new(0, 0, 0, 0, "Detected: None");
    lang_badge.set_align(Align::Inside | Align::Left);
    let auto_highlight_toggle = CheckButton::new(0, 0, 0, 0, "Auto Highlight");
    let auto_copy_toggle = CheckButton::new(0, 0, 0, 0, "Auto Copy");
    let auto_format_toggle = CheckButton::new(0, 0, 0, 0, "Auto Format & Ask AI");
    let template_input = Input::new(0, 0, 0, 0, None);
    settings_bar.fixed(&back_btn, 100);
    settings_bar.fixed(&lang_badge, 170);
    settings_bar.fixed(&auto_highlight_toggle, 120);
    settings_bar.fixed(&auto_copy_toggle, 100);
    settings_bar.fixed(&auto_format_toggle, 160);
    settings_bar.end();
    output_group.fixed(&settings_bar, 32);

    let mut search_bar = Flex::new(0, 0, WINDOW_W, 28, None);
    search_bar.set_type(FlexType::Row);
    let mut search_label = Frame::new(0, 0, 0, 0, "Find:");
    search_label.set_align(Align::Inside | Align::Right);
    let search_input = Input::new(0, 0, 0, 0, None);
    let search_count = Frame::new(0, 0, 0, 0, "");
    let mut search_prev = Button::new(0, 0, 0, 0, "@<");
    let mut search_next = Button::new(0, 0, 0, 0, "@>");
    let mut search_close = Button::new(0, 0, 0, 0, "@1+");
    let mut outline_toggle = Button::new(0, 0, 0, 0, "Outline");
    search_bar.fixed(&search_label, 45);
    search_bar.fixed(&search_count, 60);
    search_bar.fixed(&search_prev, 28);
    search_bar.fixed(&search_next, 28);
    search_bar.fixed(&search_close, 28);
    search_bar.fixed(&outline_toggle, 80);
    search_bar.end();
    output_group.fixed(&search_bar, 28);

    let mut body_row = Flex::new(0, 0, WINDOW_W, content_h - 80, None);
    body_row.set_type(FlexType::Row);

    let output_buffer = TextBuffer::default();
    let style_buffer = TextBuffer::default();
    let mut output = TextDisplay::new(0, 0, 0, 0, "");
    output.set_buffer(output_buffer.clone());

    let mut outline_panel = Flex::new(0, 0, OUTLINE_W, content_h - 80, None);
    outline_panel.set_type(FlexType::Column);
    let mut outline_title = Frame::new(0, 0, 0, 0, "Structure");
    outline_title.set_align(Align::Inside | Align::Left);
    let outline_list = HoldBrowser::new(0, 0, 0, 0, "");
    outline_panel.fixed(&outline_title, 22);
    outline_panel.end();
    body_row.fixed(&outline_panel, 0);
    outline_panel.hide();

    body_row.end();
    output_group.end();
    output_group.hide();

    main_area.end();

    // Agent sidebar, collapsed until opened.
    let sidebar_widgets = sidebar::build_sidebar(
        WINDOW_W - sidebar::SIDEBAR_WIDTH,
        content_y,
        sidebar::SIDEBAR_WIDTH,
        content_h,
        sender,
    );
    content_row.fixed(&sidebar_widgets.group, 0);

    content_row.end();
    flex.end();
    wind.end();
    wind.resizable(&flex);

    // --- Plain message-sending callbacks ---
    {
        let s = *sender;
        render_btn.set_callback(move |_| s.send(Message::RenderCode));
    }
    {
        let s = *sender;
        back_btn.set_callback(move |_| s.send(Message::BackToEdit));
    }
    {
        let s = *sender;
        clear_btn.set_callback(move |_| s.send(Message::ClearInput));
    }
    {
        let s = *sender;
        paste_btn.set_callback(move |_| s.send(Message::PasteInput));
    }
    {
        let s = *sender;
        copy_btn.set_callback(move |_| s.send(Message::CopyAllInput));
    }
    {
        let s = *sender;
        header_toggle.set_callback(move |_| s.send(Message::ToggleHeader));
    }
    {
        let s = *sender;
        outline_toggle.set_callback(move |_| s.send(Message::ToggleOutline));
    }
    {
        let s = *sender;
        search_prev.set_callback(move |_| s.send(Message::SearchPrev));
    }
    {
        let s = *sender;
        search_next.set_callback(move |_| s.send(Message::SearchNext));
    }
    {
        let s = *sender;
        search_close.set_callback(move |_| s.send(Message::SearchClose));
    }
    {
        let s = *sender;
        let mut toggle = auto_copy_toggle.clone();
        toggle.set_callback(move |_| s.send(Message::AutoCopyToggled));
    }
    {
        let s = *sender;
        let mut toggle = auto_highlight_toggle.clone();
        toggle.set_callback(move |_| s.send(Message::AutoHighlightToggled));
    }
    {
        let s = *sender;
        let mut toggle = auto_format_toggle.clone();
        toggle.set_callback(move |_| s.send(Message::AutoFormatToggled));
    }
    {
        let s = *sender;
        let mut input = template_input.clone();
        input.set_trigger(fltk::enums::CallbackTrigger::Changed);
        input.set_callback(move |_| s.send(Message::TemplateChanged));
    }
    // Search re-runs on every keystroke; Enter steps through matches.
    {
        let s = *sender;
        let mut input = search_input.clone();
        input.set_trigger(fltk::enums::CallbackTrigger::Changed);
        input.set_callback(move |_| s.send(Message::SearchChanged));
        input.handle(move |_, ev| {
            if ev == Event::KeyDown && app::event_key() == Key::Enter {
                if app::event_state().contains(EventState::Shift) {
                    s.send(Message::SearchPrev);
                } else {
                    s.send(Message::SearchNext);
                }
                return true;
            }
            false
        });
    }
    {
        let s = *sender;
        let mut list = outline_list.clone();
        list.set_callback(move |b| {
            let line = b.value();
            if line > 0 {
                s.send(Message::OutlineJump((line - 1) as usize));
            }
        });
    }
    // Shortcuts the focused editor would otherwise swallow.
    {
        let s = *sender;
        editor.handle(move |_, ev| {
            if ev != Event::KeyDown {
                return false;
            }
            let state = app::event_state();
            if !(state.contains(EventState::Ctrl) || state.contains(EventState::Meta)) {
                return false;
            }
            let key = app::event_key();
            if key == Key::Enter || key == Key::KPEnter {
                s.send(Message::RenderCode);
                return true;
            }
            if key == Key::from_char('b') {
                s.send(Message::ToggleSidebar);
                return true;
            }
            if key == Key::from_char('i') {
                s.send(Message::SendSelectionToAgent);
                return true;
            }
            false
        });
    }
    // Pointer-up over the rendered output drives the selection dispatcher.
    {
        let s = *sender;
        output.handle(move |_, ev| {
            if ev == Event::Released {
                s.send(Message::SelectionMade);
            }
            false
        });
    }
    // Buffer edits persist the content.
    {
        let s = *sender;
        let mut buf = editor_buffer.clone();
        buf.add_modify_callback(move |_pos, inserted, deleted, _restyled, _deleted_text| {
            if inserted > 0 || deleted > 0 {
                s.send(Message::ContentChanged);
            }
        });
    }
    // Closing the window quits through the normal path so state is saved.
    {
        let s = *sender;
        wind.set_callback(move |_| s.send(Message::Quit));
    }

    let widgets = MainWidgets {
        wind,
        flex,
        menu,
        header_row,
        header_title,
        header_toggle,
        content_row,
        main_area,
        input_group,
        render_btn,
        clear_btn,
        paste_btn,
        copy_btn,
        input_hint,
        editor,
        editor_buffer,
        output_group,
        back_btn,
        lang_badge,
        auto_highlight_toggle,
        auto_copy_toggle,
        auto_format_toggle,
        template_input,
        search_input,
        search_count,
        search_prev,
        search_next,
        search_close,
        outline_toggle,
        body_row,
        output,
        output_buffer,
        style_buffer,
        outline_panel,
        outline_list,
    };

    (widgets, sidebar_widgets)
}
