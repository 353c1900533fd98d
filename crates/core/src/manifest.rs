//! The fixed set of resources that must be available offline.
//!
//! Paths are origin-relative; the worker resolves them against its scope.

/// Static shell files served to every visitor.
pub const SHELL_PATHS: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/manifest.json",
    "/assets/icon-192.png",
    "/assets/icon-512.png",
];

/// Named room-assignment and mess-menu documents.
pub const DATA_DOCUMENTS: &[&str] = &[
    "VITC-A-L", "VITC-B-L", "VITC-CB-L", "VITC-CG-L", "VITC-D1-L", "VITC-D2-L", "VITC-M-N", "VITC-M-S", "VITC-M-V",
    "VITC-W-N", "VITC-W-S", "VITC-W-V",
];

/// Shell document served to navigations that fail while offline.
pub const SHELL_FALLBACK: &str = "/index.html";

/// Resolve a data document name to its request path.
pub fn data_path(name: &str) -> String {
    format!("/json/{name}.json")
}

/// Ordered list of paths to cache on install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    shell: Vec<String>,
    data: Vec<String>,
}

impl AssetManifest {
    /// Build a manifest from shell paths and data document names.
    pub fn new<S, D>(shell: impl IntoIterator<Item = S>, documents: impl IntoIterator<Item = D>) -> Self
    where
        S: Into<String>,
        D: AsRef<str>,
    {
        Self {
            shell: shell.into_iter().map(Into::into).collect(),
            data: documents.into_iter().map(|name| data_path(name.as_ref())).collect(),
        }
    }

    /// The manifest this build ships with.
    pub fn standard() -> Self {
        Self::new(SHELL_PATHS.iter().copied(), DATA_DOCUMENTS.iter().copied())
    }

    /// Every path: shell first, then data documents.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.shell.iter().chain(self.data.iter()).map(String::as_str)
    }

    pub fn shell_paths(&self) -> impl Iterator<Item = &str> {
        self.shell.iter().map(String::as_str)
    }

    /// The dynamic subset refreshed by background sync.
    pub fn data_paths(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.shell.len() + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::standard()
    }
}
