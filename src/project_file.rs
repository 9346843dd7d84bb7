//! Visual Studio project file (`.vcxproj`) discovery and patching.
//!
//! The file is treated as lines of text, not parsed as XML. Two kinds of line
//! matter:
//!
//! - `<PreprocessorDefinitions>` lines get the export symbol inserted before
//!   the last `;` on the line, so `A;B;%(PreprocessorDefinitions)` becomes
//!   `A;B;EXPORT;%(PreprocessorDefinitions)`.
//! - `<ConfigurationType>` lines have their value switched to
//!   `DynamicLibrary`.
//!
//! Each build configuration carries one of each. When the counts differ the
//! file is not a layout this editor understands and nothing is written.

use crate::buffer::{InsertionPlan, TextBuffer};
use crate::error::ConvertError;
use crate::prompt::Prompter;
use crate::walk::{self, EntryFilter, FileSystemEntry};
use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_SUFFIX: &str = ".vcxproj";
pub const DEFINITIONS_MARKER: &str = "<PreprocessorDefinitions>";
pub const CONFIGURATION_TYPE_MARKER: &str = "<ConfigurationType>";
pub const DEFINITION_SEPARATOR: u8 = b';';
/// Inserted before the last separator of a definitions line.
pub const EXPORT_TOKEN: &str = ";EXPORT";
pub const DYNAMIC_LIBRARY: &str = "DynamicLibrary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionReport {
    pub definitions_patched: usize,
    pub configurations_patched: usize,
    /// Configuration type found first, e.g. `Application`
    pub previous_type: String,
}

/// A `<ConfigurationType>` value located in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigurationValue {
    offset: usize,
    len: usize,
    value: String,
}

fn is_project_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(PROJECT_FILE_SUFFIX))
        .unwrap_or(false)
}

/// Looks for the project file among the root's children, then below each
/// child directory.
pub fn find_project_file(entries: &[FileSystemEntry], filter: &EntryFilter) -> Option<PathBuf> {
    if let Some(entry) = entries
        .iter()
        .find(|e| e.is_file && is_project_file(&e.path))
    {
        return Some(entry.path.clone());
    }
    entries
        .iter()
        .filter(|e| e.is_dir)
        .find_map(|e| walk::find_recursive(&e.path, PROJECT_FILE_SUFFIX, filter))
}

/// Like [`find_project_file`], but asks for a path until the user names an
/// existing `.vcxproj` when the search comes up empty.
pub fn locate_project_file(
    entries: &[FileSystemEntry],
    filter: &EntryFilter,
    prompter: &mut dyn Prompter,
) -> Result<PathBuf> {
    if let Some(path) = find_project_file(entries, filter) {
        println!("{} Found project file {}", "✓".green(), path.display());
        return Ok(path);
    }

    println!("{} No {} file found below the root.", "!".yellow(), PROJECT_FILE_SUFFIX);
    loop {
        let answer = prompter.text("Path to the .vcxproj file:")?;
        let path = PathBuf::from(answer.trim_matches('"'));
        if is_project_file(&path) && path.is_file() {
            return Ok(path);
        }
        println!(
            "{} '{}' is not an existing {} file",
            "x".red(),
            path.display(),
            PROJECT_FILE_SUFFIX
        );
    }
}

/// Computes the export edits for `buf` without touching it.
pub fn plan_export_injection(
    buf: &TextBuffer,
    path: &Path,
) -> Result<(InsertionPlan, InjectionReport), ConvertError> {
    let mut definition_offsets = Vec::new();
    let mut configurations: Vec<ConfigurationValue> = Vec::new();

    for line in buf.lines() {
        let text = buf.line_text(&line);
        let text_str = String::from_utf8_lossy(text);

        if text_str.contains(DEFINITIONS_MARKER) {
            let Some(sep) = buf.rfind_byte_in(DEFINITION_SEPARATOR, line.start, line.end) else {
                return Err(ConvertError::schema(
                    path,
                    format!(
                        "line {}: {} without a ';' separator",
                        line.number, DEFINITIONS_MARKER
                    ),
                ));
            };
            definition_offsets.push(sep);
        }

        if text_str.contains(CONFIGURATION_TYPE_MARKER) {
            let open = buf.find_byte_in(b'>', line.start, line.end);
            let close = buf.rfind_byte_in(b'<', line.start, line.end);
            match (open, close) {
                (Some(open), Some(close)) if close > open => {
                    configurations.push(ConfigurationValue {
                        offset: open + 1,
                        len: close - open - 1,
                        value: String::from_utf8_lossy(buf.slice(open + 1, close))
                            .trim()
                            .to_string(),
                    });
                }
                _ => {
                    return Err(ConvertError::schema(
                        path,
                        format!(
                            "line {}: {} value is not enclosed in a tag",
                            line.number, CONFIGURATION_TYPE_MARKER
                        ),
                    ));
                }
            }
        }
    }

    if definition_offsets.is_empty() {
        return Err(ConvertError::schema(
            path,
            format!("no {} lines found", DEFINITIONS_MARKER),
        ));
    }
    if definition_offsets.len() != configurations.len() {
        return Err(ConvertError::schema(
            path,
            format!(
                "{} {} lines but {} {} lines",
                definition_offsets.len(),
                DEFINITIONS_MARKER,
                configurations.len(),
                CONFIGURATION_TYPE_MARKER
            ),
        ));
    }

    let mut plan = InsertionPlan::new();
    for offset in &definition_offsets {
        plan.insert(*offset, EXPORT_TOKEN);
    }

    let previous_type = configurations[0].value.clone();
    let mut configurations_patched = 0;
    for cfg in configurations.iter().filter(|c| c.value == previous_type) {
        plan.replace(cfg.offset, cfg.len, DYNAMIC_LIBRARY);
        configurations_patched += 1;
    }

    let report = InjectionReport {
        definitions_patched: definition_offsets.len(),
        configurations_patched,
        previous_type,
    };
    Ok((plan, report))
}

/// Patches the project file in place. On any schema error the file is left
/// as it was.
pub fn inject_export_definitions(path: &Path) -> Result<InjectionReport, ConvertError> {
    let mut buf = TextBuffer::load(path).map_err(|e| ConvertError::resource(path, e))?;
    let (plan, report) = plan_export_injection(&buf, path)?;
    plan.apply(&mut buf)?;
    buf.save(path).map_err(|e| ConvertError::resource(path, e))?;
    Ok(report)
}
