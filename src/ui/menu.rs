use fltk::{
    app::Sender,
    enums::{Key, Shortcut},
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::messages::Message;

pub fn build_menu(menu: &mut MenuBar, sender: &Sender<Message>) {
    let s = sender;

    // File
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::Quit)
    });

    // Edit
    menu.add("Edit/Clear", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::ClearInput)
    });
    menu.add("Edit/Paste Into Editor", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::PasteInput)
    });
    menu.add("Edit/Copy All", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::CopyAllInput)
    });

    // View
    menu.add("View/Render", Shortcut::Ctrl | Key::Enter, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::RenderCode)
    });
    menu.add("View/Back to Editor", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::BackToEdit)
    });
    menu.add("View/Find in Output", Shortcut::Ctrl | 'f', MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::FocusSearch)
    });
    menu.add("View/Toggle Header", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::ToggleHeader)
    });
    menu.add("View/Toggle Outline", Shortcut::None, MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::ToggleOutline)
    });

    // Agent
    menu.add("Agent/Toggle Panel", Shortcut::Ctrl | 'b', MenuFlag::Normal, {
        let s = *s;
        move |_| s.send(Message::ToggleSidebar)
    });
    menu.add(
        "Agent/Send Selection to Agent",
        Shortcut::Ctrl | 'i',
        MenuFlag::Normal,
        {
            let s = *s;
            move |_| s.send(Message::SendSelectionToAgent)
        },
    );
}
