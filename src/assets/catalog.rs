use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::foundation::error::{NovellaError, NovellaResult};

#[derive(Clone, Debug, Default)]
/// Lookup from story asset paths (`/bg/room.avif`) to files on disk.
///
/// Built explicitly and handed to [`crate::RenderView::project`]; there is no process-wide
/// image registry.
pub struct AssetCatalog {
    root: Option<PathBuf>,
    files: BTreeMap<String, PathBuf>,
}

impl AssetCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every regular file below `root` under its root-relative, `/`-separated path.
    pub fn scan(root: impl AsRef<Path>) -> NovellaResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(NovellaError::validation(format!(
                "asset root '{}' is not a directory",
                root.display()
            )));
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(key, entry.path().to_path_buf());
        }

        tracing::debug!(root = %root.display(), files = files.len(), "asset scan complete");
        Ok(Self {
            root: Some(root.to_path_buf()),
            files,
        })
    }

    /// Root passed to [`AssetCatalog::scan`], if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Register one file under a story asset path.
    pub fn insert(&mut self, source: &str, file: impl Into<PathBuf>) -> NovellaResult<()> {
        let key = normalize_asset_path(source)?;
        self.files.insert(key, file.into());
        Ok(())
    }

    /// File for a story asset path. Malformed paths never resolve.
    pub fn resolve(&self, source: &str) -> Option<&Path> {
        let key = normalize_asset_path(source).ok()?;
        self.files.get(&key).map(PathBuf::as_path)
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Canonical catalog key for a story asset path.
///
/// Backslashes become `/`, a leading `/` and `.` segments are dropped, `..` is rejected.
pub fn normalize_asset_path(source: &str) -> NovellaResult<String> {
    let s = source.replace('\\', "/");
    if s.trim().is_empty() {
        return Err(NovellaError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(NovellaError::validation(format!(
                "asset path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(NovellaError::validation(format!(
            "asset path '{source}' must contain a file name"
        )));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
