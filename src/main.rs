// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod platform;

#[cfg(windows)]
fn main() {
    inkpad::logging::init();
    let settings = inkpad::settings::load();

    if let Err(e) = platform::win32::window::run(settings) {
        // Startup failed before or during the message loop.
        tracing::error!(error = %e, "editor exited with an error");
        platform::win32::window::show_error_dialog(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
fn main() {
    inkpad::logging::init();
    eprintln!("inkpad: no windowing host is available for this platform");
    std::process::exit(1);
}
