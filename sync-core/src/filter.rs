//! Eligibility rules for local files.
//!
//! Two independent rules decide whether a path takes part in a sync:
//! - the state file itself (and its temporary write sibling) is never synced
//! - with "ignore disallowed file types" on, any file whose extension is in
//!   the denylist is skipped
//!
//! The write sibling is the state path plus [`STATE_TMP_SUFFIX`], so a file
//! of your own named `.state.tmp` next to `.state` is never synced either.
//!
//! Paths are relative to the sync root with forward slashes. Extensions are
//! compared with their leading dot and are case-sensitive.

/// Extensions skipped when disallowed file types are ignored.
#[rustfmt::skip]
pub const DISALLOWED_EXTENSIONS: &[&str] = &[
    ".apng", ".asc", ".atom", ".avif", ".bin", ".cjs", ".css", ".csv", ".dae", ".eot",
    ".epub", ".geojson", ".gif", ".glb", ".gltf", ".gpg", ".htm", ".html", ".ico",
    ".jpeg", ".jpg", ".js", ".json", ".key", ".kml", ".knowl", ".less", ".manifest",
    ".map", ".markdown", ".md", ".mf", ".mid", ".midi", ".mjs", ".mtl", ".obj", ".opml",
    ".osdx", ".otf", ".pdf", ".pgp", ".pls", ".png", ".py", ".rdf", ".resolveHandle",
    ".rss", ".sass", ".scss", ".svg", ".text", ".toml", ".ts", ".tsv", ".ttf", ".txt",
    ".webapp", ".webmanifest", ".webp", ".woff", ".woff2", ".xcf", ".xml", ".yaml",
    ".yml",
];

/// Suffix of the temporary file a state write goes through before it is
/// renamed into place.
pub const STATE_TMP_SUFFIX: &str = ".tmp";

/// Extension of the last path component, including the leading dot.
///
/// A leading dot on the file name does not start an extension, so
/// `.htaccess` has none while `archive.tar.gz` has `.gz`.
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// The exclusion predicate applied during scans and to remembered state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions {
    state_file: Option<String>,
    ignore_disallowed: bool,
    disallowed: Vec<String>,
}

impl Exclusions {
    /// Exclude nothing; uses the default denylist once enabled.
    pub fn new() -> Self {
        Self {
            state_file: None,
            ignore_disallowed: false,
            disallowed: DISALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Always exclude the state file, given relative to the sync root.
    ///
    /// Pass `None` when the state file lives outside the root.
    pub fn with_state_file(mut self, relative: Option<String>) -> Self {
        self.state_file = relative;
        self
    }

    /// Turn the extension denylist on or off.
    pub fn ignore_disallowed_file_types(mut self, enabled: bool) -> Self {
        self.ignore_disallowed = enabled;
        self
    }

    /// Replace the denylist. Entries without a leading dot get one.
    pub fn with_disallowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallowed = extensions
            .into_iter()
            .map(Into::into)
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        self
    }

    /// The state file path this predicate excludes, if any.
    pub fn state_file(&self) -> Option<&str> {
        self.state_file.as_deref()
    }

    /// Whether the denylist is active.
    pub fn ignores_disallowed(&self) -> bool {
        self.ignore_disallowed
    }

    /// Whether `path` is the temporary file state writes go through.
    pub fn is_state_sibling(&self, path: &str) -> bool {
        self.state_file.as_deref().is_some_and(|state| {
            path.strip_suffix(STATE_TMP_SUFFIX) == Some(state)
        })
    }

    /// Whether `path` must be left out of the sync.
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.state_file.as_deref() == Some(path) || self.is_state_sibling(path) {
            return true;
        }
        self.ignore_disallowed
            && extension(path).is_some_and(|ext| self.disallowed.iter().any(|d| d == ext))
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::new()
    }
}
