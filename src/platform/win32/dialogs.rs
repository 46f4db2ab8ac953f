// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin wrappers around the Win32 common-dialog APIs, returning the session's
// `Picked` result.  Both are modal and must run on the UI thread.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::path::{Path, PathBuf};

use inkpad::host::Picked;
use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        UI::Controls::Dialogs::{
            GetOpenFileNameW, GetSaveFileNameW, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY,
            OFN_OVERWRITEPROMPT, OFN_PATHMUSTEXIST, OPENFILENAMEW, OPEN_FILENAME_FLAGS,
        },
    },
};

/// Maximum path length in `WCHAR`s, including the null terminator.
/// 32 768 is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

/// Null-separated display/pattern pairs, ending with a double null.
const FILTER: &str = "Text Files (*.txt)\0*.txt\0All Files (*.*)\0*.*\0\0";

/// Show the standard "Open" dialog, starting in `start_dir` when given.
pub(crate) fn show_open_dialog(owner: HWND, start_dir: Option<&Path>) -> Picked {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    run_dialog(
        owner,
        &mut buf,
        start_dir,
        OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY,
        |ofn| {
            // SAFETY: see `run_dialog`.
            unsafe { GetOpenFileNameW(ofn) }.as_bool()
        },
    )
}

/// Show the standard "Save As" dialog with `suggested_name` pre-filled.
///
/// Overwriting an existing file asks for confirmation first.
pub(crate) fn show_save_dialog(
    owner: HWND,
    start_dir: Option<&Path>,
    suggested_name: &str,
) -> Picked {
    let mut buf: Vec<u16> = suggested_name
        .encode_utf16()
        .take(PATH_BUF_LEN - 1)
        .chain(std::iter::repeat(0))
        .take(PATH_BUF_LEN)
        .collect();
    run_dialog(
        owner,
        &mut buf,
        start_dir,
        OFN_OVERWRITEPROMPT | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY,
        |ofn| {
            // SAFETY: see `run_dialog`.
            unsafe { GetSaveFileNameW(ofn) }.as_bool()
        },
    )
}

/// Fill an `OPENFILENAMEW` and hand it to `show`.
///
/// `show` must call one of the `Get*FileNameW` functions.  `ofn` points into
/// `buf`, `filter` and `initial_dir`, all of which outlive the call, and the
/// dialog writes only within `buf` (bounded by `nMaxFile`).
fn run_dialog(
    owner: HWND,
    buf: &mut [u16],
    start_dir: Option<&Path>,
    flags: OPEN_FILENAME_FLAGS,
    show: impl FnOnce(&mut OPENFILENAMEW) -> bool,
) -> Picked {
    let filter = wide(FILTER);
    let initial_dir = start_dir.map(|d| wide(&d.to_string_lossy()));

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: buf.len() as u32,
        lpstrInitialDir: initial_dir
            .as_ref()
            .map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
        lpstrDefExt: windows::core::w!("txt"),
        Flags: flags,
        ..Default::default()
    };

    if show(&mut ofn) {
        Picked::Path(path_from_buf(buf))
    } else {
        Picked::Cancelled
    }
}

/// Null-terminated UTF-16 copy of `s`.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert a null-terminated UTF-16 buffer to a `PathBuf`.
fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(String::from_utf16_lossy(&buf[..len]))
}
