// ── Settings persistence ──────────────────────────────────────────────────────
//
// Reads and writes `<config dir>/Inkpad/settings.json`, where `<config dir>`
// is `%APPDATA%` on Windows and `$XDG_CONFIG_HOME` (or `~/.config`) elsewhere.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InkpadError, IoOp, Result};

// ── Format version ────────────────────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Root of the JSON settings file.
///
/// Every field but `version` has a default, so files written by older builds
/// (or edited by hand) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: u32,
    /// Outer window size in device pixels.
    pub window_width: i32,
    pub window_height: i32,
    /// Point size of the fixed-pitch editor font.
    pub font_size: i32,
    /// Directory the open/save dialogs start in.
    pub last_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            window_width: 900,
            window_height: 600,
            font_size: 13,
            last_directory: None,
        }
    }
}

/// Font sizes outside this range are clamped; the file is hand-editable.
const FONT_SIZE_RANGE: (i32, i32) = (6, 96);

impl Settings {
    /// `font_size`, clamped to a size the editor can actually render.
    pub fn font_points(&self) -> i32 {
        self.font_size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1)
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path of the settings file, or `None` when the platform has no
/// per-user config directory.
pub fn settings_path() -> Option<PathBuf> {
    let mut p = dirs::config_dir()?;
    p.push("Inkpad");
    p.push("settings.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load settings from the default location.
///
/// Never fails: a missing, malformed or foreign-version file yields
/// `Settings::default()`.
pub fn load() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };
    match load_from(&path) {
        Ok(Some(s)) => s,
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!(error = %e, "ignoring settings file");
            Settings::default()
        }
    }
}

/// Read and parse `path`.
///
/// `Ok(None)` when the file does not exist or carries an unrecognised
/// version number.
pub fn load_from(path: &Path) -> Result<Option<Settings>> {
    let data = match fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(InkpadError::io(IoOp::Read, path, e)),
    };
    let settings: Settings = serde_json::from_slice(&data)?;
    if settings.version != SETTINGS_VERSION {
        debug!(version = settings.version, "unknown settings version");
        return Ok(None);
    }
    Ok(Some(settings))
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write settings to the default location.
///
/// Callers log and otherwise discard the error; losing settings is never
/// worth interrupting the user.
pub fn save(settings: &Settings) -> Result<()> {
    let path = settings_path().ok_or_else(|| {
        InkpadError::io(
            IoOp::Write,
            "settings.json",
            io::Error::new(io::ErrorKind::NotFound, "no config directory"),
        )
    })?;
    save_to(&path, settings)
}

/// Write `settings` as pretty JSON to `path`, creating parent directories.
pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| InkpadError::io(IoOp::Write, dir, e))?;
    }
    let json = serde_json::to_vec_pretty(settings)?;
    fs::write(path, json).map_err(|e| InkpadError::io(IoOp::Write, path, e))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            window_width: 1280,
            window_height: 720,
            font_size: 16,
            last_directory: Some(PathBuf::from("/home/me/notes")),
            ..Settings::default()
        };

        save_to(&path, &s).expect("save");
        let loaded = load_from(&path).expect("load").expect("present");
        assert_eq!(loaded, s);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("absent.json")).unwrap().is_none());
    }

    /// Files from before `font_size` / `last_directory` existed still parse.
    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{"version":1,"window_width":1000,"window_height":700}"#;
        let s: Settings = serde_json::from_str(json).expect("deserialize old format");
        assert_eq!(s.window_width, 1000);
        assert_eq!(s.font_size, 13);
        assert_eq!(s.last_directory, None);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"version":99}"#).unwrap();
        assert!(load_from(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, InkpadError::Settings(_)), "{err:?}");
    }

    #[test]
    fn font_size_is_clamped() {
        let huge = Settings {
            font_size: i32::MAX,
            ..Settings::default()
        };
        assert_eq!(huge.font_points(), 96);
        let tiny = Settings {
            font_size: -4,
            ..Settings::default()
        };
        assert_eq!(tiny.font_points(), 6);
        assert_eq!(Settings::default().font_points(), 13);
    }
}
