use crate::walk::{self, EntryFilter, HEADER_EXTENSIONS};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// What a directory holds, judged by its immediate regular files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryClassification {
    HeadersOnly,
    ContainsSources,
    HeadersLibs,
    HeadersLibsDlls,
    /// No regular files, only subdirectories
    Container,
    /// Nothing recognisable (empty, or files of other kinds only)
    Ambiguous,
}

impl DirectoryClassification {
    /// Choices offered for each child of a container, in menu order.
    pub const MENU: [DirectoryClassification; 4] = [
        DirectoryClassification::HeadersOnly,
        DirectoryClassification::ContainsSources,
        DirectoryClassification::HeadersLibs,
        DirectoryClassification::HeadersLibsDlls,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DirectoryClassification::HeadersOnly => "headers only",
            DirectoryClassification::ContainsSources => "sources (.cpp)",
            DirectoryClassification::HeadersLibs => "headers + .lib files",
            DirectoryClassification::HeadersLibsDlls => "headers + .lib + .dll files",
            DirectoryClassification::Container => "folder of libraries",
            DirectoryClassification::Ambiguous => "unrecognised",
        }
    }
}

/// `.cpp`, `.cppm` and the like: any extension starting with `cpp`.
fn is_cpp_source(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase().starts_with("cpp"))
        .unwrap_or(false)
}

/// Classifies `dir` by priority: sources, then DLLs, then `.lib` files, then
/// headers. A directory with subdirectories and no regular files is a
/// container.
pub fn classify(dir: &Path, filter: &EntryFilter) -> Result<DirectoryClassification> {
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut has_files = false;
    let mut has_dirs = false;
    let (mut has_dll, mut has_lib, mut has_header) = (false, false, false);

    for entry in read_dir.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            if !filter.is_excluded(&path, true) {
                has_dirs = true;
            }
            continue;
        }
        if !path.is_file() {
            continue;
        }
        has_files = true;
        if is_cpp_source(&path) {
            return Ok(DirectoryClassification::ContainsSources);
        }
        has_dll |= walk::has_extension(&path, &["dll"]);
        has_lib |= walk::has_extension(&path, &["lib"]);
        has_header |= walk::has_extension(&path, HEADER_EXTENSIONS);
    }

    Ok(if has_dll {
        DirectoryClassification::HeadersLibsDlls
    } else if has_lib {
        DirectoryClassification::HeadersLibs
    } else if has_header {
        DirectoryClassification::HeadersOnly
    } else if !has_files && has_dirs {
        DirectoryClassification::Container
    } else {
        DirectoryClassification::Ambiguous
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_headers_only_then_sources_take_priority() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let filter = EntryFilter::default();
        touch(dir.path(), &["a.h", "b.hpp"]);
        assert_eq!(classify(dir.path(), &filter)?, DirectoryClassification::HeadersOnly);

        touch(dir.path(), &["core.lib", "core.dll"]);
        assert_eq!(
            classify(dir.path(), &filter)?,
            DirectoryClassification::HeadersLibsDlls
        );

        touch(dir.path(), &["a.cpp"]);
        assert_eq!(
            classify(dir.path(), &filter)?,
            DirectoryClassification::ContainsSources
        );
        Ok(())
    }

    #[test]
    fn test_lib_without_dll() -> Result<()> {
        let dir = tempfile::tempdir()?;
        touch(dir.path(), &["a.h", "a.lib"]);
        assert_eq!(
            classify(dir.path(), &EntryFilter::default())?,
            DirectoryClassification::HeadersLibs
        );
        Ok(())
    }

    #[test]
    fn test_only_subdirectories_is_container() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("glm"))?;
        fs::create_dir(dir.path().join("sdl"))?;
        assert_eq!(
            classify(dir.path(), &EntryFilter::default())?,
            DirectoryClassification::Container
        );
        Ok(())
    }

    #[test]
    fn test_unrecognised_contents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let filter = EntryFilter::default();
        assert_eq!(classify(dir.path(), &filter)?, DirectoryClassification::Ambiguous);

        fs::create_dir(dir.path().join("sub"))?;
        touch(dir.path(), &["readme.md"]);
        assert_eq!(classify(dir.path(), &filter)?, DirectoryClassification::Ambiguous);
        Ok(())
    }

    #[test]
    fn test_cpp_variants_count_as_sources() {
        assert!(is_cpp_source(Path::new("a.cpp")));
        assert!(is_cpp_source(Path::new("a.cppm")));
        assert!(!is_cpp_source(Path::new("a.c")));
        assert!(!is_cpp_source(Path::new("a.hpp")));
    }
}
