use std::path::{Path, PathBuf};

/// Title shown while the buffer is not associated with any file.
pub const DEFAULT_TITLE: &str = "Inkpad";

/// The association between the buffer and a file on disk.
///
/// Held as one value and replaced whole on each successful transition, so the
/// path and the title derived from it can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Binding {
    /// Never saved, or reset by New.
    #[default]
    Untitled,
    /// Loaded from or last saved to this path.
    Bound(PathBuf),
}

impl Binding {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Untitled => None,
            Self::Bound(p) => Some(p),
        }
    }

    /// Window title for this binding.
    ///
    /// | Binding | Title |
    /// |---|---|
    /// | `Untitled` | `"Inkpad"` |
    /// | `Bound("/notes/todo.txt")` | `"todo.txt"` |
    pub fn display_title(&self) -> String {
        match self {
            Self::Untitled => DEFAULT_TITLE.to_owned(),
            Self::Bound(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
        }
    }

    /// Name to pre-fill in the Save As dialog.
    pub(crate) fn suggested_name(&self) -> String {
        match self {
            Self::Untitled => "Untitled.txt".to_owned(),
            Self::Bound(_) => self.display_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untitled_title_is_default() {
        assert_eq!(Binding::Untitled.display_title(), "Inkpad");
        assert_eq!(Binding::default(), Binding::Untitled);
    }

    #[test]
    fn bound_title_is_base_name() {
        let b = Binding::Bound(PathBuf::from("notes").join("todo.txt"));
        assert_eq!(b.display_title(), "todo.txt");
        assert_eq!(b.suggested_name(), "todo.txt");
        assert_eq!(b.path(), Some(Path::new("notes").join("todo.txt").as_path()));
    }

    #[test]
    fn suggested_name_for_untitled() {
        assert_eq!(Binding::Untitled.suggested_name(), "Untitled.txt");
        assert_eq!(Binding::Untitled.path(), None);
    }
}
