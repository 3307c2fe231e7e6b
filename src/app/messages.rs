use super::agents::AgentId;

/// All messages that can be sent through the FLTK channel.
/// Each widget callback sends one of these; the dispatch loop in main handles
/// them. Deferred steps carry a generation stamp so a callback that outlived
/// its trigger becomes a no-op instead of acting on stale state.
#[derive(Debug, Clone)]
pub enum Message {
    // Editor
    RenderCode,
    BackToEdit,
    ClearInput,
    PasteInput,
    CopyAllInput,
    RestoreCopyLabel,
    ContentChanged,

    // Settings toolbar
    AutoCopyToggled,
    AutoHighlightToggled,
    AutoFormatToggled,
    TemplateChanged,

    // Header & outline
    ToggleHeader,
    ToggleOutline,
    OutlineJump(usize),
    OutlinePulseExpired(u64),

    // Agent sidebar
    ToggleSidebar,
    CloseSidebar,
    AgentSelected,
    AccountChanged,
    RenameAccount,
    OpenExternalAgent(AgentId),
    SendSelectionToAgent,

    // Deferred agent-activation steps
    EmbeddedCue(u64),
    FocusEmbedded(u64),
    PulseExpired(u64),
    OpenActivePopup(u64),
    EmbeddedSurfaceClicked,

    // Selection
    SelectionMade,
    SelectionSettled(u64),

    // In-page search
    SearchChanged,
    SearchNext,
    SearchPrev,
    SearchClose,
    FocusSearch,

    Quit,
}
