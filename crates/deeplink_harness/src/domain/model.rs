//! Domain models for fixture content and remote element identity.

use std::path::PathBuf;

/// Display name used for the fixture document unless overridden.
pub const DEFAULT_FILE_NAME: &str = "Deeplinks";

/// Where the fixture HTML comes from. Chosen at facade construction and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    FileUrl(PathBuf),
    InlineHtml(String),
}

/// Naming of the staged fixture inside the remote application's storage.
/// `folder_name = None` places the fixture at the top-level location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureIdentity {
    pub file_name: String,
    pub folder_name: Option<String>,
}

impl FixtureIdentity {
    pub fn top_level(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            folder_name: None,
        }
    }
}

/// Semantic kind of an element staged in the remote application's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    File,
    Folder,
}

impl ElementKind {
    /// Suffix table of the cell-identifier contract with the remote
    /// accessibility surface. A platform-version change is an edit here,
    /// not at call sites.
    const fn cell_suffix(self) -> &'static str {
        match self {
            Self::File => "html",
            Self::Folder => "Folder",
        }
    }

    /// Accessibility identifier of the storage cell for `name`.
    pub fn cell_identifier(self, name: &str) -> String {
        format!("{name}, {}", self.cell_suffix())
    }
}
