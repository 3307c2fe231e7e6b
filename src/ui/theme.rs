use fltk::{enums::Color, prelude::*};

use super::main_window::MainWidgets;
use super::sidebar::SidebarWidgets;

/// Apply the fixed dark theme. CodeScope ships one palette; the syntax
/// colors come from the highlight theme, everything else from here.
pub fn apply_theme(main: &mut MainWidgets, sidebar: &mut SidebarWidgets) {
    let bg = Color::from_rgb(25, 25, 25);
    let surface = Color::from_rgb(30, 30, 30);
    let chrome = Color::from_rgb(35, 35, 35);
    let text = Color::from_rgb(220, 220, 220);
    let dim_text = Color::from_rgb(150, 150, 150);
    let selection = Color::from_rgb(70, 70, 100);

    main.wind.set_color(bg);
    main.wind.set_label_color(text);

    main.menu.set_color(chrome);
    main.menu.set_text_color(text);
    main.menu.set_selection_color(Color::from_rgb(60, 60, 60));

    main.header_title.set_label_color(text);
    main.header_toggle.set_color(chrome);
    main.header_toggle.set_label_color(text);

    main.editor.set_color(surface);
    main.editor.set_text_color(text);
    main.editor.set_cursor_color(Color::White);
    main.editor.set_selection_color(selection);
    main.input_hint.set_label_color(dim_text);

    main.output.set_color(surface);
    main.output.set_text_color(text);
    main.output.set_selection_color(selection);

    main.lang_badge.set_label_color(dim_text);
    main.search_count.set_label_color(dim_text);

    for button in [
        &mut main.render_btn,
        &mut main.clear_btn,
        &mut main.paste_btn,
        &mut main.copy_btn,
        &mut main.back_btn,
        &mut main.search_prev,
        &mut main.search_next,
        &mut main.search_close,
        &mut main.outline_toggle,
    ] {
        button.set_color(chrome);
        button.set_label_color(text);
    }

    for toggle in [
        &mut main.auto_highlight_toggle,
        &mut main.auto_copy_toggle,
        &mut main.auto_format_toggle,
    ] {
        toggle.set_label_color(text);
    }

    for input in [&mut main.template_input, &mut main.search_input] {
        input.set_color(surface);
        input.set_text_color(text);
        input.set_cursor_color(Color::White);
    }

    // The outline browser keeps its stock colors; browser item text is
    // drawn black and stays readable on the default background.
    main.outline_list.set_selection_color(selection);

    sidebar.group.set_color(bg);
    sidebar.agent_choice.set_color(chrome);
    sidebar.agent_choice.set_text_color(text);
    sidebar.account_choice.set_color(chrome);
    sidebar.account_choice.set_text_color(text);
    sidebar.rename_btn.set_color(chrome);
    sidebar.rename_btn.set_label_color(text);
    sidebar.close_btn.set_color(chrome);
    sidebar.close_btn.set_label_color(text);
    sidebar.placeholder_label.set_label_color(text);
    sidebar.open_window_btn.set_color(chrome);
    sidebar.open_window_btn.set_label_color(text);
}
