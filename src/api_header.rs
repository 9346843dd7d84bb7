//! Export header generation.
//!
//! The header is named after the project folder: `My Lib` becomes
//! `My_Lib_API.h` defining `MY_LIB_API`. An existing file with that name is
//! only replaced with the user's permission; otherwise one disambiguating
//! suffix is tried before giving up.

use crate::error::ConvertError;
use crate::prompt::Prompter;
use crate::template::{Preset, Presets, Substitutions};
use crate::walk::FileSystemEntry;
use anyhow::Result;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_SUFFIX: &str = "_API";
pub const DISAMBIGUATION_SUFFIX: &str = "_Export";

/// Names derived from the project root, fixed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub root: PathBuf,
    /// Root folder name with spaces and dashes replaced
    pub project_name: String,
    pub api_macro: String,
    pub api_header_name: String,
    pub api_header_path: PathBuf,
}

pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c,
        })
        .collect()
}

pub fn project_name(root: &Path) -> String {
    let folder = root
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("project"))
        .to_string_lossy();
    sanitize_name(&folder)
}

impl ProjectIdentity {
    /// Identity for `<base>.h` / `<BASE>`, where `base` is already sanitized.
    fn with_base(root: &Path, base: &str) -> Self {
        let api_header_name = format!("{}.h", base);
        Self {
            root: root.to_path_buf(),
            project_name: project_name(root),
            api_macro: base.to_uppercase(),
            api_header_path: root.join(&api_header_name),
            api_header_name,
        }
    }

    pub fn derive(root: &Path) -> Self {
        let base = format!("{}{}", project_name(root), API_SUFFIX);
        Self::with_base(root, &base)
    }

    fn disambiguated(&self) -> Self {
        let base = self.api_header_name.trim_end_matches(".h");
        Self::with_base(&self.root, &format!("{}{}", base, DISAMBIGUATION_SUFFIX))
    }
}

fn collides(identity: &ProjectIdentity, entries: &[FileSystemEntry]) -> bool {
    entries
        .iter()
        .any(|e| e.path.file_name() == Some(std::ffi::OsStr::new(&identity.api_header_name)))
        || identity.api_header_path.exists()
}

/// Picks the header name for this run, asking before reusing an existing file.
pub fn resolve_identity(
    root: &Path,
    entries: &[FileSystemEntry],
    prompter: &mut dyn Prompter,
) -> Result<ProjectIdentity> {
    let identity = ProjectIdentity::derive(root);
    if !collides(&identity, entries) {
        return Ok(identity);
    }

    let overwrite = prompter.confirm(&format!(
        "{} already exists. Overwrite it?",
        identity.api_header_name
    ))?;
    if overwrite {
        return Ok(identity);
    }

    let retry = identity.disambiguated();
    if collides(&retry, entries) {
        return Err(ConvertError::Naming(format!(
            "both {} and {} already exist in {}",
            identity.api_header_name,
            retry.api_header_name,
            root.display()
        ))
        .into());
    }
    println!(
        "{} Using {} instead",
        "!".yellow(),
        retry.api_header_name.bold()
    );
    Ok(retry)
}

pub fn render_api_header(presets: &Presets, api_macro: &str) -> Result<String, ConvertError> {
    presets.render(
        Preset::ApiHeader,
        &Substitutions::new().set("API_MACRO", api_macro),
    )
}

/// Writes the header to `<root>/<header name>`, replacing any existing file.
pub fn write_api_header(identity: &ProjectIdentity, presets: &Presets) -> Result<PathBuf> {
    let content = render_api_header(presets, &identity.api_macro)?;
    fs::write(&identity.api_header_path, content)
        .map_err(|e| ConvertError::resource(&identity.api_header_path, e))?;
    Ok(identity.api_header_path.clone())
}

/// Resolves the name and writes the header in one step.
pub fn generate(
    root: &Path,
    entries: &[FileSystemEntry],
    presets: &Presets,
    prompter: &mut dyn Prompter,
) -> Result<ProjectIdentity> {
    let identity = resolve_identity(root, entries, prompter)?;
    write_api_header(&identity, presets)?;
    println!(
        "{} Wrote {} defining {}",
        "✓".green(),
        identity.api_header_name.bold(),
        identity.api_macro.cyan()
    );
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::walk::{self, EntryFilter};

    const EXPECTED_HEADER: &str = "#pragma once\n\n#ifdef _WIN32\n\t#ifdef EXPORT\n\t\t#define DEMO_API __declspec(dllexport)\n\t#else\n\t\t#define DEMO_API __declspec(dllimport)\n\t#endif\n#else\n\t#define DEMO_API\n#endif\n";

    #[test]
    fn test_derive_sanitizes_folder_name() {
        let id = ProjectIdentity::derive(Path::new("/work/my-cool lib"));
        assert_eq!(id.project_name, "my_cool_lib");
        assert_eq!(id.api_header_name, "my_cool_lib_API.h");
        assert_eq!(id.api_macro, "MY_COOL_LIB_API");
        assert_eq!(id.api_header_path, Path::new("/work/my-cool lib/my_cool_lib_API.h"));
    }

    #[test]
    fn test_header_content_is_exact() {
        let text = render_api_header(&Presets::builtin(), "DEMO_API").unwrap();
        assert_eq!(text, EXPECTED_HEADER);
    }

    #[test]
    fn test_declined_overwrite_gets_suffix() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("Demo");
        fs::create_dir(&root)?;
        fs::write(root.join("Demo_API.h"), "// user file")?;
        let entries = walk::list_entries(&root, &EntryFilter::default())?;

        let mut prompter = ScriptedPrompter::new(["N"]);
        let id = generate(&root, &entries, &Presets::builtin(), &mut prompter)?;
        assert_eq!(id.api_header_name, "Demo_API_Export.h");
        assert_eq!(id.api_macro, "DEMO_API_EXPORT");
        assert_eq!(fs::read_to_string(root.join("Demo_API.h"))?, "// user file");
        assert!(root.join("Demo_API_Export.h").exists());
        Ok(())
    }

    #[test]
    fn test_accepted_overwrite_replaces_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("Demo");
        fs::create_dir(&root)?;
        fs::write(root.join("Demo_API.h"), "// old")?;
        let entries = walk::list_entries(&root, &EntryFilter::default())?;

        let mut prompter = ScriptedPrompter::new(["y"]);
        let id = generate(&root, &entries, &Presets::builtin(), &mut prompter)?;
        assert_eq!(id.api_header_name, "Demo_API.h");
        assert_eq!(fs::read_to_string(root.join("Demo_API.h"))?, EXPECTED_HEADER);
        Ok(())
    }

    #[test]
    fn test_second_collision_is_naming_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("Demo");
        fs::create_dir(&root)?;
        fs::write(root.join("Demo_API.h"), "")?;
        fs::write(root.join("Demo_API_Export.h"), "")?;
        let entries = walk::list_entries(&root, &EntryFilter::default())?;

        let mut prompter = ScriptedPrompter::new(["n"]);
        let err = resolve_identity(&root, &entries, &mut prompter).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::Naming(_))
        ));
        Ok(())
    }
}
