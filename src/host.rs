// ── Host windowing collaborators ──────────────────────────────────────────────
//
// The session never talks to a GUI toolkit directly.  Whatever hosts it (the
// Win32 window in `platform::win32`, or fakes in tests) implements these
// traits.  Every method is called on the UI thread only, except
// `UiWaker::wake`, which worker threads use to get back onto it.

use std::path::{Path, PathBuf};

/// Outcome of a modal path-selection dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picked {
    /// The user confirmed this path.
    Path(PathBuf),
    /// The user dismissed the dialog.
    Cancelled,
}

/// The host's text widget.  It owns the buffer.
pub trait TextView {
    /// A copy of the full buffer.  Only taken when saving.
    fn text(&self) -> String;
    /// Replace the full buffer.
    fn set_text(&mut self, text: &str);
    /// Set the window title.
    fn set_title(&mut self, title: &str);
}

/// Modal open/save dialogs.
pub trait Picker {
    /// Ask for an existing file to open.
    fn pick_open(&mut self, start_dir: Option<&Path>) -> Picked;
    /// Ask for a location to save to.  `suggested_name` pre-fills the name.
    fn pick_save(&mut self, start_dir: Option<&Path>, suggested_name: &str) -> Picked;
}

/// Modal user-facing messages.
pub trait Notifier {
    fn notify(&mut self, title: &str, message: &str);
}

/// Everything a session needs from its host.
pub trait Host: TextView + Picker + Notifier {}

impl<T: TextView + Picker + Notifier> Host for T {}

/// Nudges the UI thread to call `Session::pump`.
///
/// Called from worker threads after a completion has been queued.
pub trait UiWaker: Send + Sync + 'static {
    fn wake(&self);
}
