//! Filesystem queries used for discovery and browsing.
//!
//! Entries are query-time snapshots. Build outputs, Visual Studio metadata and
//! archives are never offered to the user.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name fragments that hide a file from browsing.
pub const EXCLUDED_FILE_PATTERNS: &[&str] = &[
    ".sln",
    ".vcxproj.user",
    ".vcxproj.filters",
    ".rar",
    ".zip",
    ".txt",
    ".props",
    ".bin",
    ".exe",
];

/// Directory names that hold build outputs or IDE state.
pub const EXCLUDED_DIR_NAMES: &[&str] = &["x64", "x86", "Release", "Debug", ".vs", ".git"];

pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hxx", "hh", "inl"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_file: bool,
}

impl FileSystemEntry {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// Exclusion rules plus any extra names from `dllify.toml` or the build dir.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    extra: Vec<String>,
}

impl EntryFilter {
    pub fn new(extra: impl IntoIterator<Item = String>) -> Self {
        Self {
            extra: extra.into_iter().collect(),
        }
    }

    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if self.extra.iter().any(|e| e.as_str() == name) {
            return true;
        }
        if is_dir {
            EXCLUDED_DIR_NAMES.contains(&name.as_ref())
        } else {
            EXCLUDED_FILE_PATTERNS.iter().any(|p| name.contains(p))
        }
    }
}

/// Immediate children of `dir`: files first, then directories, each by name.
pub fn list_entries(dir: &Path, filter: &EntryFilter) -> Result<Vec<FileSystemEntry>> {
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut entries: Vec<FileSystemEntry> = read_dir
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let file_type = e.file_type().ok()?;
            let path = e.path();
            // follow symlinks for the kind, like a plain stat would
            let (is_dir, is_file) = if file_type.is_symlink() {
                (path.is_dir(), path.is_file())
            } else {
                (file_type.is_dir(), file_type.is_file())
            };
            Some(FileSystemEntry {
                path,
                is_dir,
                is_file,
            })
        })
        .filter(|e| !filter.is_excluded(&e.path, e.is_dir))
        .collect();

    entries.sort_by(|a, b| {
        a.is_dir
            .cmp(&b.is_dir)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
    Ok(entries)
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

pub fn is_header(path: &Path) -> bool {
    has_extension(path, HEADER_EXTENSIONS)
}

/// Regular files directly inside `dir` with one of `extensions`, sorted.
pub fn files_with_extension(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, extensions))
        .collect();
    files.sort();
    Ok(files)
}

/// First file below `dir` (any depth) whose name ends with `suffix`,
/// skipping excluded directories.
pub fn find_recursive(dir: &Path, suffix: &str, filter: &EntryFilter) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && filter.is_excluded(e.path(), true)))
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name().to_string_lossy().ends_with(suffix))
        .map(|e| e.into_path())
}

/// Number of directories between `root` and the directory holding `file`.
pub fn depth_below(root: &Path, file: &Path) -> usize {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| rel.components().count())
        .unwrap_or(0)
}
