// ── Win32 session host ────────────────────────────────────────────────────────
//
// Implements the session's host traits on top of the main window and its
// multi-line EDIT child.  The EDIT control owns the text buffer.

#![allow(unsafe_code)]

use std::path::Path;

use inkpad::host::{Picked, Picker, Notifier, TextView, UiWaker};
use tracing::warn;
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HWND, LPARAM, WPARAM},
        UI::WindowsAndMessaging::{
            GetWindowTextLengthW, GetWindowTextW, MessageBoxW, PostMessageW, SetWindowTextW,
            MB_ICONERROR, MB_OK, WM_APP,
        },
    },
};

use super::dialogs::{self, wide};

/// Posted to the main window when a worker has queued a completion.
pub(crate) const WM_APP_IO_DONE: u32 = WM_APP + 1;

/// The main window plus its EDIT child.
pub(crate) struct Win32Host {
    pub(crate) hwnd: HWND,
    pub(crate) edit: HWND,
}

impl TextView for Win32Host {
    fn text(&self) -> String {
        // SAFETY: `edit` is a live child window owned by this thread.
        let len = unsafe { GetWindowTextLengthW(self.edit) }.max(0) as usize;
        let mut buf = vec![0u16; len + 1];
        // SAFETY: `buf` holds `len + 1` units; the call writes at most that
        // many including the terminator and returns the count copied.
        let copied = unsafe { GetWindowTextW(self.edit, &mut buf) }.max(0) as usize;
        String::from_utf16_lossy(&buf[..copied.min(len)])
    }

    fn set_text(&mut self, text: &str) {
        set_window_text(self.edit, text);
    }

    fn set_title(&mut self, title: &str) {
        set_window_text(self.hwnd, title);
    }
}

impl Picker for Win32Host {
    fn pick_open(&mut self, start_dir: Option<&Path>) -> Picked {
        dialogs::show_open_dialog(self.hwnd, start_dir)
    }

    fn pick_save(&mut self, start_dir: Option<&Path>, suggested_name: &str) -> Picked {
        dialogs::show_save_dialog(self.hwnd, start_dir, suggested_name)
    }
}

impl Notifier for Win32Host {
    fn notify(&mut self, title: &str, message: &str) {
        message_box(self.hwnd, title, message);
    }
}

/// Wakes the UI thread by posting `WM_APP_IO_DONE` to the main window.
///
/// Holds the raw handle value because `HWND` is not `Send`.
pub(crate) struct PostMessageWaker(pub(crate) isize);

impl UiWaker for PostMessageWaker {
    fn wake(&self) {
        let hwnd = HWND(self.0 as *mut _);
        // SAFETY: PostMessageW is documented as callable from any thread.
        // If the window is already destroyed the call simply fails.
        if let Err(e) = unsafe { PostMessageW(hwnd, WM_APP_IO_DONE, WPARAM(0), LPARAM(0)) } {
            warn!(error = %e, "could not wake UI thread");
        }
    }
}

/// Show a modal error box owned by `owner` (or ownerless when null).
pub(crate) fn message_box(owner: HWND, title: &str, message: &str) {
    let title = wide(title);
    let body = wide(message);
    // SAFETY: both buffers are null-terminated and outlive the call.
    // The return value (button pressed) is unused for an error box.
    unsafe {
        let _ = MessageBoxW(
            owner,
            PCWSTR(body.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

fn set_window_text(hwnd: HWND, text: &str) {
    let text = wide(text);
    // SAFETY: `text` is null-terminated and outlives the call.
    if let Err(e) = unsafe { SetWindowTextW(hwnd, PCWSTR(text.as_ptr())) } {
        warn!(error = %e, "SetWindowTextW failed");
    }
}
