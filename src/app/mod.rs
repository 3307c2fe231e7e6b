//! Application layer: the state coordinator, the controllers, and the pure
//! engines behind the FLTK UI.
//!
//! # Structure
//!
//! - `settings` - the single persisted preferences record (State Store)
//! - `view` / `state` - view transitions and the application coordinator
//! - `syntax` - Highlight Adapter over the external highlighting library
//! - `selection` / `search` / `overlay` - selection dispatch, in-page search,
//!   and the named highlight layers they render through
//! - `agents` / `agent_panel` - the fixed agent registry and the panel state
//!   machine behind the sidebar

pub mod agent_panel;
pub mod agents;
pub mod buffer_utils;
pub mod clipboard;
pub mod error;
pub mod messages;
pub mod overlay;
pub mod search;
pub mod selection;
pub mod settings;
pub mod state;
pub mod syntax;
pub mod view;

// Re-exports for convenient external access
pub use agents::AgentId;
pub use error::{AppError, Result};
pub use messages::Message;
pub use settings::AppSettings;
pub use view::ViewMode;
