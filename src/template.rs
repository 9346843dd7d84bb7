//! Preset templates and placeholder substitution.
//!
//! Presets are plain text files with `<UPPER_CASE>` placeholders. The built-in
//! set is compiled into the binary from `resources/presets/`; a preset
//! directory given on the command line or in `dllify.toml` replaces it, and
//! every preset must then exist there.
//!
//! ## Available Presets
//!
//! - `root` - top-level `CMakeLists.txt` building the shared library
//! - `headers_only` - interface target for a folder of headers
//! - `sources` - static library from a folder of `.cpp` files
//! - `libraries` - prebuilt `.lib` files plus headers
//! - `libraries_dlls` - as `libraries`, plus DLLs copied next to the output
//! - `container` - folder that only groups other library folders
//! - `api_header` - the generated export header

use crate::error::ConvertError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Root,
    HeadersOnly,
    Sources,
    Libraries,
    LibrariesWithDlls,
    Container,
    ApiHeader,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Root,
        Preset::HeadersOnly,
        Preset::Sources,
        Preset::Libraries,
        Preset::LibrariesWithDlls,
        Preset::Container,
        Preset::ApiHeader,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Preset::Root => "root.cmake.in",
            Preset::HeadersOnly => "headers_only.cmake.in",
            Preset::Sources => "sources.cmake.in",
            Preset::Libraries => "libraries.cmake.in",
            Preset::LibrariesWithDlls => "libraries_dlls.cmake.in",
            Preset::Container => "container.cmake.in",
            Preset::ApiHeader => "api_header.h.in",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            Preset::Root => include_str!("../resources/presets/root.cmake.in"),
            Preset::HeadersOnly => include_str!("../resources/presets/headers_only.cmake.in"),
            Preset::Sources => include_str!("../resources/presets/sources.cmake.in"),
            Preset::Libraries => include_str!("../resources/presets/libraries.cmake.in"),
            Preset::LibrariesWithDlls => {
                include_str!("../resources/presets/libraries_dlls.cmake.in")
            }
            Preset::Container => include_str!("../resources/presets/container.cmake.in"),
            Preset::ApiHeader => include_str!("../resources/presets/api_header.h.in"),
        }
    }
}

/// Where presets come from for this run.
#[derive(Debug, Clone, Default)]
pub struct Presets {
    dir: Option<PathBuf>,
}

impl Presets {
    pub fn builtin() -> Self {
        Self { dir: None }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn load(&self, preset: Preset) -> Result<String, ConvertError> {
        match &self.dir {
            None => Ok(preset.builtin().to_string()),
            Some(dir) => {
                let path = dir.join(preset.file_name());
                fs::read_to_string(&path).map_err(|e| ConvertError::resource(path, e))
            }
        }
    }

    /// Fails on the first preset that cannot be read, before anything is
    /// written.
    pub fn check(&self) -> Result<(), ConvertError> {
        for preset in Preset::ALL {
            self.load(preset)?;
        }
        Ok(())
    }

    pub fn render(&self, preset: Preset, subs: &Substitutions) -> Result<String, ConvertError> {
        render(&self.load(preset)?, subs).map_err(|e| match e {
            ConvertError::Template(msg) => {
                ConvertError::Template(format!("{} ({})", msg, preset.file_name()))
            }
            other => other,
        })
    }
}

/// Placeholder values keyed by name without the angle brackets.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Multi-value placeholders render as one space-joined token list.
    pub fn set_list<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        self.set(key, joined)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([A-Z][A-Z0-9_]*)>").expect("placeholder pattern is valid"))
}

/// Placeholder names still present in `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Replaces every placeholder in `template`.
///
/// A placeholder without a value means the template and the caller disagree,
/// so it is reported instead of being left in the output.
pub fn render(template: &str, subs: &Substitutions) -> Result<String, ConvertError> {
    let missing: Vec<String> = placeholders(template)
        .into_iter()
        .filter(|name| subs.get(name).is_none())
        .collect();
    if !missing.is_empty() {
        let list = missing
            .iter()
            .map(|n| format!("<{}>", n))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ConvertError::Template(format!("no value for {}", list)));
    }

    let rendered = placeholder_regex().replace_all(template, |caps: &regex::Captures| {
        subs.get(&caps[1]).unwrap_or_default().to_string()
    });
    Ok(rendered.into_owned())
}

/// Quotes a CMake list element that would otherwise split on whitespace.
pub fn cmake_quote(item: &str) -> String {
    if item.chars().any(char::is_whitespace) {
        format!("\"{}\"", item)
    } else {
        item.to_string()
    }
}
