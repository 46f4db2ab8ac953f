// ── Platform layer ────────────────────────────────────────────────────────────
//
// Hosts the editor session in a native window.  All FFI is confined to the
// platform sub-modules and never leaks outward.

#[cfg(windows)]
pub mod win32;
