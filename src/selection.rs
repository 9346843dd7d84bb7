//! Interactive choice of the files to convert.
//!
//! Root files are offered one by one. A root directory the user enters is
//! shown as a numbered listing, where files to convert and subdirectories to
//! enter are both picked by index, recursively.

use crate::prompt::Prompter;
use crate::ui;
use crate::walk::{self, EntryFilter, FileSystemEntry};
use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

/// Paths the user confirmed, in the order they were confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: Vec<PathBuf>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the path was already selected.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

/// Walks the root entries and returns everything the user picked.
pub fn select(
    root_entries: &[FileSystemEntry],
    filter: &EntryFilter,
    prompter: &mut dyn Prompter,
) -> Result<SelectionSet> {
    let mut selection = SelectionSet::new();

    for entry in root_entries.iter().filter(|e| e.is_file) {
        if prompter.confirm(&format!("Convert {}?", entry.name()))? {
            selection.add(&entry.path);
        }
    }
    for entry in root_entries.iter().filter(|e| e.is_dir) {
        if prompter.confirm(&format!("Look for headers in {}?", entry.name()))? {
            browse(&entry.path, filter, prompter, &mut selection)?;
        }
    }
    Ok(selection)
}

fn browse(
    dir: &Path,
    filter: &EntryFilter,
    prompter: &mut dyn Prompter,
    selection: &mut SelectionSet,
) -> Result<()> {
    let entries = walk::list_entries(dir, filter)?;
    let (files, dirs): (Vec<FileSystemEntry>, Vec<FileSystemEntry>) =
        entries.into_iter().partition(|e| e.is_file);

    ui::clear_screen();
    println!("{} {}", "📂".cyan(), dir.display().to_string().bold());

    if !files.is_empty() {
        ui::print_entries(&files);
        for i in prompter.select_indices("Files to convert:", files.len())? {
            selection.add(&files[i].path);
        }
    }
    if dirs.is_empty() {
        return Ok(());
    }

    ui::print_entries(&dirs);
    let chosen = prompter.select_indices("Directories to enter:", dirs.len())?;
    for i in chosen {
        browse(&dirs[i].path, filter, prompter, selection)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use std::fs;

    #[test]
    fn test_selection_set_keeps_order_and_skips_duplicates() {
        let mut set = SelectionSet::new();
        assert!(set.add("b.h"));
        assert!(set.add("a.h"));
        assert!(!set.add("b.h"));
        let paths: Vec<_> = set.iter().cloned().collect();
        assert_eq!(paths, [PathBuf::from("b.h"), PathBuf::from("a.h")]);
        assert!(set.contains(Path::new("a.h")));
    }

    #[test]
    fn test_browse_recurses_into_chosen_directories() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path();
        fs::write(root.join("Main.h"), "")?;
        fs::write(root.join("Other.h"), "")?;
        fs::create_dir_all(root.join("src/math"))?;
        fs::create_dir_all(root.join("src/io"))?;
        fs::write(root.join("src/App.h"), "")?;
        fs::write(root.join("src/math/Vec.h"), "")?;
        fs::write(root.join("src/math/Mat.h"), "")?;
        fs::write(root.join("src/io/File.h"), "")?;

        let filter = EntryFilter::default();
        let entries = walk::list_entries(root, &filter)?;
        // Main.h yes, Other.h no, enter src; pick App.h; enter math only
        // (io is 0, math is 1); pick ALL there
        let mut prompter = ScriptedPrompter::new(["y", "n", "y", "0", "1", "ALL"]);
        let selection = select(&entries, &filter, &mut prompter)?;

        let names: Vec<String> = selection
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, ["Main.h", "src/App.h", "src/math/Mat.h", "src/math/Vec.h"]);
        assert_eq!(prompter.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_none_selects_nothing() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        fs::create_dir(tmp.path().join("lib"))?;
        fs::write(tmp.path().join("lib/A.h"), "")?;

        let filter = EntryFilter::default();
        let entries = walk::list_entries(tmp.path(), &filter)?;
        let mut prompter = ScriptedPrompter::new(["y", "5", "NONE"]);
        let selection = select(&entries, &filter, &mut prompter)?;
        assert!(selection.is_empty());
        Ok(())
    }
}
