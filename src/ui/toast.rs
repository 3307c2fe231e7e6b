use std::cell::Cell;
use std::rc::Rc;

use fltk::{
    app,
    enums::Color,
    frame::Frame,
    prelude::*,
    window::Window,
};

const TOAST_HEIGHT: i32 = 40;

/// Transient bottom-center notification.
///
/// One shared toast window; a newer message supersedes the running hide
/// timer, so the expiry callback re-checks its stamp before hiding.
pub struct Toast {
    wind: Window,
    label: Frame,
    generation: Rc<Cell<u64>>,
}

impl Toast {
    pub fn new() -> Self {
        let mut wind = Window::new(0, 0, 320, TOAST_HEIGHT, "");
        wind.set_border(false);
        wind.set_color(Color::from_rgb(51, 51, 51));
        let mut label = Frame::new(0, 0, 320, TOAST_HEIGHT, "");
        label.set_label_color(Color::White);
        label.set_label_size(13);
        wind.end();
        wind.hide();
        Self {
            wind,
            label,
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Show `message` for `secs`, centered near the bottom of `parent`.
    pub fn show(&mut self, parent: &Window, message: &str, secs: f64) {
        let width = (message.len() as i32 * 8 + 40).clamp(160, 560);
        let x = parent.x() + (parent.w() - width) / 2;
        let y = parent.y() + parent.h() - 70;
        self.wind.resize(x, y, width, TOAST_HEIGHT);
        self.label.resize(0, 0, width, TOAST_HEIGHT);
        self.label.set_label(message);
        self.wind.show();

        self.generation.set(self.generation.get() + 1);
        let stamp = self.generation.get();
        let generation = self.generation.clone();
        let mut wind = self.wind.clone();
        app::add_timeout3(secs, move |_| {
            if generation.get() == stamp {
                wind.hide();
            }
        });
    }
}

impl Default for Toast {
    fn default() -> Self {
        Self::new()
    }
}
