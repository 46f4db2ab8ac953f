// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Inkpad return `error::Result<T>`.  No panics in
// production paths.  Session errors surface as a modal dialog through the
// host's `Notifier`; icon errors become process exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// What the session was doing when an I/O error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
    /// Replacing the target with the freshly written temp file.
    Replace,
}

impl IoOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Replace => "replace",
        }
    }
}

/// Every error that Inkpad can produce.
#[derive(Debug, Error)]
pub enum InkpadError {
    /// The file's bytes are not valid UTF-8.  No other encoding is guessed.
    #[error("{} is not valid UTF-8 text: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A read, write, permission or rename failure.
    #[error("could not {} {}: {source}", op.as_str(), path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The icon raster could not be serialised to PNG.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// The settings file exists but is not valid JSON for our schema.
    #[error("settings file is malformed: {0}")]
    Settings(#[from] serde_json::Error),

    /// A Win32 API call returned a failure code.
    #[cfg(windows)]
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },
}

impl InkpadError {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

// Lets `?` work on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for InkpadError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InkpadError>;
