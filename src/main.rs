use fltk::{app, prelude::*};

use code_scope::app::messages::Message;
use code_scope::app::state::AppState;
use code_scope::ui;

fn main() {
    let a = app::App::default();
    let (sender, receiver) = app::channel::<Message>();

    let (mut main_widgets, mut sidebar_widgets) = ui::main_window::build_main_window(&sender);
    ui::menu::build_menu(&mut main_widgets.menu, &sender);
    ui::theme::apply_theme(&mut main_widgets, &mut sidebar_widgets);

    main_widgets.wind.show();

    let mut state = AppState::new(main_widgets, sidebar_widgets, sender);
    state.load_state();

    while a.wait() {
        if let Some(message) = receiver.recv() {
            state.handle(message);
        }
    }
}
