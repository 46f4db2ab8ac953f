// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the codebase where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment stating which invariant
// makes the operation sound.

#![allow(unsafe_code)]

pub(crate) mod dialogs; // open/save common dialogs
pub(crate) mod host; // session host traits over the main window
pub mod window; // main window, WndProc, message loop
