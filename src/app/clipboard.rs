use std::cell::RefCell;

use super::error::{AppError, Result};

thread_local! {
    // One long-lived handle: on X11 the copied data is owned by the
    // providing process and would vanish if the handle were dropped.
    static CLIPBOARD: RefCell<Option<arboard::Clipboard>> = const { RefCell::new(None) };
}

fn with_clipboard<T>(
    f: impl FnOnce(&mut arboard::Clipboard) -> std::result::Result<T, arboard::Error>,
) -> std::result::Result<T, arboard::Error> {
    CLIPBOARD.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(arboard::Clipboard::new()?);
        }
        match slot.as_mut() {
            Some(clipboard) => f(clipboard),
            None => Err(arboard::Error::ClipboardNotSupported),
        }
    })
}

/// Copy `text` to the system clipboard.
///
/// The system clipboard (arboard) is tried first; when the session denies it
/// (some sandboxed Wayland/X11 setups), FLTK's own clipboard is the
/// synchronous fallback. The fallback is verified with a read-back so a
/// failure of both paths reaches the caller instead of silently dropping
/// the copy.
pub fn copy_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    let primary = with_clipboard(|cb| cb.set_text(text.to_string()));
    let Err(err) = primary else {
        return Ok(());
    };

    fltk::app::copy(text);
    match with_clipboard(|cb| cb.get_text()) {
        Ok(seen) if seen == text => Ok(()),
        _ => Err(AppError::Clipboard(err.to_string())),
    }
}

/// Read text from the system clipboard.
pub fn read_text() -> Result<String> {
    with_clipboard(|cb| cb.get_text()).map_err(|e| AppError::Clipboard(e.to_string()))
}
