// ── Whole-file text I/O ───────────────────────────────────────────────────────
//
// Blocking helpers run on the session's worker thread.  Content is UTF-8 and
// passes through verbatim: no BOM stripping, no line-ending conversion.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::error::{InkpadError, IoOp, Result};

/// Read `path` in full and decode it as UTF-8.
///
/// Invalid UTF-8 is a hard [`InkpadError::Decode`]; no fallback encoding.
pub fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| InkpadError::io(IoOp::Read, path, e))?;
    String::from_utf8(bytes).map_err(|source| InkpadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the contents of `path` with `text`, all or nothing.
///
/// The text is written to a temp file in the target's directory, flushed to
/// disk, then renamed over the target.  On any error the temp file is removed
/// and the previous file (if any) is left as it was.
///
/// An existing target keeps its permissions, and a symlink is written
/// through: the file it points to is replaced, the link stays.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let target = resolve_target(path)?;
    let dir = match target.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };

    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| InkpadError::io(IoOp::Write, path, e))?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| InkpadError::io(IoOp::Write, path, e))?;

    match fs::metadata(&target) {
        Ok(meta) => tmp
            .as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| InkpadError::io(IoOp::Write, path, e))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(InkpadError::io(IoOp::Write, path, e)),
    }

    tmp.persist(&target)
        .map_err(|e| InkpadError::io(IoOp::Replace, path, e.error))?;
    Ok(())
}

/// The file a save to `path` must replace: `path` itself, or what it
/// points to when it is a symlink.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| InkpadError::io(IoOp::Write, path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}
