// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI),
// which lives in the `inkpad` binary.  The library is entirely safe.
#![forbid(unsafe_code)]

//! A minimal plain-text editor core and the generator for its icon.
//!
//! * [`session`]: the editor's file session (New / Open / Save / Save As),
//!   independent of any GUI toolkit.  A host plugs in through the traits in
//!   [`host`].
//! * [`icon`]: draws the application icon and writes `icon.png`.

pub mod error;
pub mod fileio;
pub mod host;
pub mod icon;
pub mod logging;
pub mod session;
pub mod settings;

pub use error::{InkpadError, Result};
