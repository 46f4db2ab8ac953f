// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class and create the window, its EDIT child,
//     menu bar and accelerator table.
//   • Own the process-wide `Session` in thread-local state; only the UI
//     thread ever touches it.
//   • Run the message loop and route WM_COMMAND to session operations.
//   • Apply I/O completions when a worker posts WM_APP_IO_DONE.

#![allow(unsafe_code)]

use std::{cell::RefCell, sync::Arc};

use inkpad::{
    session::{Session, DEFAULT_TITLE},
    settings::{self, Settings},
};
use tracing::{debug, info, warn};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{
            CreateFontW, GetStockObject, CLEARTYPE_QUALITY, CLIP_DEFAULT_PRECIS,
            DEFAULT_CHARSET, FF_MODERN, FIXED_PITCH, FW_NORMAL, HBRUSH, HFONT,
            OUT_DEFAULT_PRECIS, WHITE_BRUSH,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::{SetFocus, VK_A, VK_N, VK_O, VK_S},
            WindowsAndMessaging::{
                AppendMenuW, CreateAcceleratorTableW, CreateMenu, CreateWindowExW,
                DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
                GetWindowPlacement, LoadCursorW, LoadIconW, MessageBoxW, MoveWindow,
                PostQuitMessage, RegisterClassExW, SendMessageW, SetMenu, ShowWindow,
                TranslateAcceleratorW, TranslateMessage, UpdateWindow, ACCEL, CS_HREDRAW,
                CS_VREDRAW, CW_USEDEFAULT, ES_AUTOHSCROLL, ES_AUTOVSCROLL, ES_MULTILINE,
                ES_NOHIDESEL, EM_SETLIMITTEXT, EM_SETSEL, FCONTROL, FSHIFT, FVIRTKEY, HACCEL,
                HMENU, IDC_IBEAM, IDI_APPLICATION, MB_OK, MF_POPUP, MF_SEPARATOR, MF_STRING,
                MSG, SW_SHOW, WINDOWPLACEMENT, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE,
                WM_COMMAND, WM_COPY, WM_CUT, WM_DESTROY, WM_PASTE, WM_SETFOCUS, WM_SETFONT,
                WM_SIZE, WNDCLASSEXW, WS_CHILD, WS_EX_CLIENTEDGE, WS_HSCROLL,
                WS_OVERLAPPEDWINDOW, WS_VISIBLE, WS_VSCROLL,
            },
        },
    },
};

use super::host::{message_box, PostMessageWaker, Win32Host, WM_APP_IO_DONE};
use crate::platform::win32::dialogs::wide;
use inkpad::error::{InkpadError, Result};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("InkpadMainWindow");

/// Face name of the editor font.
const FONT_FACE: PCWSTR = w!("Consolas");

// ── Menu command IDs ──────────────────────────────────────────────────────────

const IDM_FILE_NEW: u16 = 1001;
const IDM_FILE_OPEN: u16 = 1002;
const IDM_FILE_SAVE: u16 = 1003;
const IDM_FILE_SAVE_AS: u16 = 1004;
const IDM_FILE_EXIT: u16 = 1099;

const IDM_EDIT_CUT: u16 = 2001;
const IDM_EDIT_COPY: u16 = 2002;
const IDM_EDIT_PASTE: u16 = 2003;
const IDM_EDIT_SELECT_ALL: u16 = 2004;

const IDM_HELP_ABOUT: u16 = 9001;

// ── UI-thread state ───────────────────────────────────────────────────────────

/// Everything the window procedure needs between messages.
struct WindowState {
    session: Session<Win32Host>,
    settings: Settings,
}

thread_local! {
    static STATE: RefCell<Option<WindowState>> = const { RefCell::new(None) };
}

/// Run `f` against the window state.
///
/// Returns `None` before the state exists, after it is dropped, or while it
/// is already borrowed.  The last case happens when a modal dialog opened by
/// a session operation pumps messages back into `wnd_proc`.
fn with_state<R>(f: impl FnOnce(&mut WindowState) -> R) -> Option<R> {
    STATE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Create the main window and drive the message loop until it is closed.
pub(crate) fn run(settings: Settings) -> Result<()> {
    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // valid for the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(None) }?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;
    let hwnd = create_window(hinstance, &settings)?;
    let edit = create_edit(hinstance, hwnd, settings.font_points())?;
    let accel = build_accelerators()?;

    let host = Win32Host { hwnd, edit };
    let waker = Arc::new(PostMessageWaker(hwnd.0 as isize));
    let session = Session::new(host, waker, settings.last_directory.clone());
    STATE.with(|cell| *cell.borrow_mut() = Some(WindowState { session, settings }));

    // SAFETY: hwnd was just created on this thread.  Return values (previous
    // visibility, success BOOL) are intentionally ignored.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
        let _ = SetFocus(edit);
    }
    info!("main window shown");

    message_loop(hwnd, accel)
}

/// Show a modal, ownerless error dialog.  Used by `main()` when `run()`
/// fails before the window exists.
pub(crate) fn show_error_dialog(message: &str) {
    message_box(HWND::default(), "Inkpad \u{2014} Fatal Error", message);
}

// ── Creation ──────────────────────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: IDI_APPLICATION and IDC_IBEAM are built-in resources.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;
    let cursor = unsafe { LoadCursorW(None, IDC_IBEAM) }?;
    // SAFETY: stock brushes are always valid and never need freeing.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised; CLASS_NAME is a static literal.
    if unsafe { RegisterClassExW(&wndclass) } == 0 {
        return Err(last_error("RegisterClassExW"));
    }
    Ok(())
}

fn create_window(hinstance: HINSTANCE, settings: &Settings) -> Result<HWND> {
    let title = wide(DEFAULT_TITLE);
    // SAFETY: CLASS_NAME was just registered; `title` outlives the call.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            settings.window_width,
            settings.window_height,
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )
    }?;

    let menu = build_menu()?;
    // SAFETY: hwnd and menu are valid handles owned by this thread.
    unsafe { SetMenu(hwnd, menu) }?;
    Ok(hwnd)
}

/// Create the multi-line EDIT child that holds the document text.
/// `font_points` must already be clamped (`Settings::font_points`).
fn create_edit(hinstance: HINSTANCE, parent: HWND, font_points: i32) -> Result<HWND> {
    let style = WS_CHILD
        | WS_VISIBLE
        | WS_VSCROLL
        | WS_HSCROLL
        | WINDOW_STYLE((ES_MULTILINE | ES_AUTOVSCROLL | ES_AUTOHSCROLL | ES_NOHIDESEL) as u32);

    // SAFETY: "EDIT" is a system class; parent is our live main window.
    // The child is sized in WM_SIZE.
    let edit = unsafe {
        CreateWindowExW(
            WS_EX_CLIENTEDGE,
            w!("EDIT"),
            PCWSTR::null(),
            style,
            0,
            0,
            0,
            0,
            parent,
            HMENU::default(),
            hinstance,
            None,
        )
    }?;

    // Point size → logical height at 96 DPI; negative selects by glyph height.
    let height = -(font_points * 96 / 72);
    // SAFETY: all arguments are plain values; FONT_FACE is a static literal.
    let font: HFONT = unsafe {
        CreateFontW(
            height,
            0,
            0,
            0,
            FW_NORMAL.0 as i32,
            0,
            0,
            0,
            DEFAULT_CHARSET.0 as u32,
            OUT_DEFAULT_PRECIS.0 as u32,
            CLIP_DEFAULT_PRECIS.0 as u32,
            CLEARTYPE_QUALITY.0 as u32,
            (FIXED_PITCH.0 | FF_MODERN.0) as u32,
            FONT_FACE,
        )
    };

    // SAFETY: edit is valid.  WM_SETFONT takes the HFONT in WPARAM;
    // EM_SETLIMITTEXT 0 lifts the default 32K character limit.
    unsafe {
        SendMessageW(edit, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        SendMessageW(edit, EM_SETLIMITTEXT, WPARAM(0), LPARAM(0));
    }
    Ok(edit)
}

// ── Menu and accelerators ─────────────────────────────────────────────────────

fn build_menu() -> Result<HMENU> {
    // SAFETY: CreateMenu/AppendMenuW have no preconditions beyond valid
    // handles, which each call below receives from the one before.
    unsafe {
        let bar = CreateMenu()?;

        let file = CreateMenu()?;
        AppendMenuW(file, MF_STRING, IDM_FILE_NEW as usize, w!("&New\tCtrl+N"))?;
        AppendMenuW(file, MF_STRING, IDM_FILE_OPEN as usize, w!("&Open\u{2026}\tCtrl+O"))?;
        AppendMenuW(file, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(file, MF_STRING, IDM_FILE_SAVE as usize, w!("&Save\tCtrl+S"))?;
        AppendMenuW(
            file,
            MF_STRING,
            IDM_FILE_SAVE_AS as usize,
            w!("Save &As\u{2026}\tCtrl+Shift+S"),
        )?;
        AppendMenuW(file, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(file, MF_STRING, IDM_FILE_EXIT as usize, w!("E&xit\tAlt+F4"))?;

        let edit = CreateMenu()?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_CUT as usize, w!("Cu&t\tCtrl+X"))?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_COPY as usize, w!("&Copy\tCtrl+C"))?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_PASTE as usize, w!("&Paste\tCtrl+V"))?;
        AppendMenuW(edit, MF_SEPARATOR, 0, PCWSTR::null())?;
        AppendMenuW(edit, MF_STRING, IDM_EDIT_SELECT_ALL as usize, w!("Select &All\tCtrl+A"))?;

        let help = CreateMenu()?;
        AppendMenuW(help, MF_STRING, IDM_HELP_ABOUT as usize, w!("&About Inkpad\u{2026}"))?;

        // For MF_POPUP the item ID is the child HMENU.
        AppendMenuW(bar, MF_POPUP, file.0 as usize, w!("&File"))?;
        AppendMenuW(bar, MF_POPUP, edit.0 as usize, w!("&Edit"))?;
        AppendMenuW(bar, MF_POPUP, help.0 as usize, w!("&Help"))?;

        Ok(bar)
    }
}

/// Ctrl+N/O/S/Shift+S/A.  Cut, copy and paste are handled by the EDIT
/// control itself.
fn build_accelerators() -> Result<HACCEL> {
    let ctrl = FVIRTKEY | FCONTROL;
    let table = [
        ACCEL {
            fVirt: ctrl,
            key: VK_N.0,
            cmd: IDM_FILE_NEW,
        },
        ACCEL {
            fVirt: ctrl,
            key: VK_O.0,
            cmd: IDM_FILE_OPEN,
        },
        ACCEL {
            fVirt: ctrl,
            key: VK_S.0,
            cmd: IDM_FILE_SAVE,
        },
        ACCEL {
            fVirt: ctrl | FSHIFT,
            key: VK_S.0,
            cmd: IDM_FILE_SAVE_AS,
        },
        ACCEL {
            fVirt: ctrl,
            key: VK_A.0,
            cmd: IDM_EDIT_SELECT_ALL,
        },
    ];
    // SAFETY: `table` is a valid slice for the duration of the call.
    Ok(unsafe { CreateAcceleratorTableW(&table) }?)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(hwnd: HWND, accel: HACCEL) -> Result<()> {
    let mut msg = MSG::default();
    loop {
        // SAFETY: &mut msg is a valid MSG pointer; null HWND retrieves
        // messages for every window on this thread.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            0 => break,
            // SAFETY: msg was filled by a successful GetMessageW call.
            _ => unsafe {
                if TranslateAcceleratorW(hwnd, accel, &msg) == 0 {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            },
        }
    }
    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: registered as lpfnWndProc; Windows guarantees the arguments are
// valid for the duration of the call.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_APP_IO_DONE => {
            if with_state(|s| s.session.pump()).is_none() {
                debug!("I/O completion deferred, state busy");
            }
            LRESULT(0)
        }

        WM_SIZE => {
            let width = (lparam.0 & 0xFFFF) as i32;
            let height = ((lparam.0 >> 16) & 0xFFFF) as i32;
            with_state(|s| {
                let _ = MoveWindow(s.session.host().edit, 0, 0, width, height, true);
            });
            LRESULT(0)
        }

        WM_SETFOCUS => {
            with_state(|s| {
                let _ = SetFocus(s.session.host().edit);
            });
            LRESULT(0)
        }

        WM_COMMAND => {
            let cmd = (wparam.0 & 0xFFFF) as u16;
            if on_command(hwnd, cmd) {
                LRESULT(0)
            } else {
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
        }

        WM_CLOSE => {
            remember_settings(hwnd);
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            STATE.with(|cell| {
                if let Ok(mut guard) = cell.try_borrow_mut() {
                    guard.take();
                }
            });
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Handle a menu or accelerator command.  Returns `false` for IDs we do
/// not own.
fn on_command(hwnd: HWND, cmd: u16) -> bool {
    match cmd {
        IDM_FILE_NEW | IDM_FILE_OPEN | IDM_FILE_SAVE | IDM_FILE_SAVE_AS => {
            with_state(|s| {
                // Catch up on a completion whose wake-up arrived while the
                // state was borrowed.
                s.session.pump();
                let outcome = match cmd {
                    IDM_FILE_NEW => s.session.new_document(),
                    IDM_FILE_OPEN => s.session.open(),
                    IDM_FILE_SAVE => s.session.save(),
                    _ => s.session.save_as(),
                };
                debug!(cmd, ?outcome, "file command");
            });
            true
        }

        IDM_FILE_EXIT => {
            remember_settings(hwnd);
            // SAFETY: hwnd is our main window; triggers WM_DESTROY.
            let _ = unsafe { DestroyWindow(hwnd) };
            true
        }

        IDM_EDIT_CUT | IDM_EDIT_COPY | IDM_EDIT_PASTE | IDM_EDIT_SELECT_ALL => {
            with_state(|s| {
                let edit = s.session.host().edit;
                let (m, w, l) = match cmd {
                    IDM_EDIT_CUT => (WM_CUT, 0, 0),
                    IDM_EDIT_COPY => (WM_COPY, 0, 0),
                    IDM_EDIT_PASTE => (WM_PASTE, 0, 0),
                    _ => (EM_SETSEL, 0, -1),
                };
                // SAFETY: edit is a live child of this window.
                unsafe { SendMessageW(edit, m, WPARAM(w), LPARAM(l)) };
            });
            true
        }

        IDM_HELP_ABOUT => {
            about_dialog(hwnd);
            true
        }

        _ => false,
    }
}

/// Store window size and picker directory; failures are only logged.
fn remember_settings(hwnd: HWND) {
    with_state(|s| {
        // The restored rect, so closing while minimized or maximized does not
        // store the iconic or full-screen size.
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        // SAFETY: hwnd is our live main window; placement is writable and
        // its `length` is set as the API requires.
        if unsafe { GetWindowPlacement(hwnd, &mut placement) }.is_ok() {
            let rect = placement.rcNormalPosition;
            s.settings.window_width = rect.right - rect.left;
            s.settings.window_height = rect.bottom - rect.top;
        }
        s.settings.last_directory = s.session.last_directory().map(Into::into);
        if let Err(e) = settings::save(&s.settings) {
            warn!(error = %e, "could not save settings");
        }
    });
}

// ── Helper dialogs ────────────────────────────────────────────────────────────

fn about_dialog(hwnd: HWND) {
    let body = wide(&format!(
        "Inkpad {}\n\nA minimal plain-text editor.\n\nLicensed under MIT OR Apache-2.0.",
        env!("CARGO_PKG_VERSION"),
    ));
    // SAFETY: body is null-terminated and outlives the call; hwnd is the
    // owner from WndProc.
    unsafe {
        let _ = MessageBoxW(hwnd, PCWSTR(body.as_ptr()), w!("About Inkpad"), MB_OK);
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Wrap the calling thread's last Win32 error.  Call immediately after the
/// failing function.
fn last_error(function: &'static str) -> InkpadError {
    // SAFETY: GetLastError only reads thread-local state.
    let code = unsafe { GetLastError() };
    InkpadError::Win32 {
        function,
        code: code.0,
    }
}
