//! Header annotation with the export macro.
//!
//! Two modes per header:
//!
//! - **whole type**: the macro goes right after the first standalone `class`
//!   or `struct` keyword (`class Foo` becomes `class DEMO_API Foo`).
//! - **functions**: declarations are picked out with a pattern and the user
//!   chooses which ones get the macro in front.
//!
//! Either way the header then includes the generated API header, right after
//! `#pragma once` when there is one.
//!
//! The function pattern is a best-effort heuristic, not a C++ parser. It
//! looks for one or more type-like tokens, a possibly scoped name, a
//! parameter list without nested parentheses and a trailing `;`, `{` or `=`.
//! Constructors, function-pointer parameters and macros will be missed or
//! misread.

use crate::api_header::ProjectIdentity;
use crate::buffer::{InsertionPlan, TextBuffer};
use crate::error::ConvertError;
use crate::prompt::Prompter;
use crate::walk;
use anyhow::Result;
use colored::*;
use regex::bytes::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const PRAGMA_ONCE: &str = "#pragma once";

/// Leading words that make a match a statement, not a declaration.
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "else", "delete", "new", "throw", "case", "goto", "typedef", "using",
];

fn type_keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(class|struct)\b").expect("keyword pattern is valid"))
}

fn signature_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?P<sig>(?:[A-Za-z_][\w:<>,]*[ \t*&]+)+[*&]*~?[A-Za-z_]\w*(?:::~?[A-Za-z_]\w*)*[ \t]*\([^;{}()]*\)(?:[ \t]*(?:const|override|final|noexcept))*)[ \t]*(?:;|\{|=)",
        )
        .expect("signature pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub text: String,
    pub offset: usize,
    pub len: usize,
}

impl Signature {
    /// Single-line form for listings.
    pub fn display(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    WholeType,
    /// Indices into [`extract_signatures`] of the header text
    Functions(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationReport {
    pub path: PathBuf,
    pub macros_inserted: usize,
    pub include_line: String,
}

/// Offset just past the first `class`/`struct` keyword that declares a type.
///
/// Keywords inside a template parameter list (after `<` or `,`) and the
/// `class` of `enum class` are skipped: a macro there does not compile.
pub fn find_type_keyword(text: &[u8]) -> Option<usize> {
    type_keyword_regex()
        .find_iter(text)
        .find(|m| !is_nested_keyword(&text[..m.start()]))
        .map(|m| m.end())
}

fn is_nested_keyword(before: &[u8]) -> bool {
    let before = before.trim_ascii_end();
    match before.last() {
        Some(b'<' | b',') => true,
        _ => {
            before.ends_with(b"enum")
                && !before[..before.len() - 4]
                    .last()
                    .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
        }
    }
}

pub fn extract_signatures(text: &[u8]) -> Vec<Signature> {
    signature_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.name("sig"))
        .map(|m| Signature {
            text: String::from_utf8_lossy(m.as_bytes()).into_owned(),
            offset: m.start(),
            len: m.len(),
        })
        .filter(|sig| {
            let first = sig.text.split_whitespace().next().unwrap_or_default();
            !STATEMENT_KEYWORDS.contains(&first)
        })
        .collect()
}

/// `#include "../../Demo_API.h"` with one `../` per directory below the root.
pub fn include_directive(root: &Path, file: &Path, header_name: &str) -> String {
    let depth = walk::depth_below(root, file);
    format!("#include \"{}{}\"", "../".repeat(depth), header_name)
}

/// Terminator of the line ending at the `\n` at `newline`.
fn line_ending(buf: &TextBuffer, newline: usize) -> &'static str {
    if newline > 0 && buf.slice(newline - 1, newline) == b"\r" {
        "\r\n"
    } else {
        "\n"
    }
}

/// Where the include goes and the exact text to insert there. The include
/// line ends like the line it follows (`#pragma once`) or, at the start of
/// the file, like the first line.
fn include_insertion(buf: &TextBuffer, include: &str) -> (usize, String) {
    match buf.find_str(PRAGMA_ONCE, 0) {
        Some(pragma) => match buf.find_byte_in(b'\n', pragma, buf.len()) {
            Some(newline) => {
                let eol = line_ending(buf, newline);
                (newline + 1, format!("{}{}", include, eol))
            }
            None => (buf.len(), format!("\n{}\n", include)),
        },
        None => {
            let eol = buf
                .find_byte_in(b'\n', 0, buf.len())
                .map_or("\n", |newline| line_ending(buf, newline));
            (0, format!("{}{}", include, eol))
        }
    }
}

/// Computes every edit for one header. Returns the plan and how many macros
/// it inserts.
pub fn plan_header(
    buf: &TextBuffer,
    include: &str,
    api_macro: &str,
    mode: &ExportMode,
) -> (InsertionPlan, usize) {
    let text = buf.as_bytes();
    let mut plan = InsertionPlan::new();
    let mut macros = 0;

    // first, so a macro at the same offset lands after the include line
    let (offset, line) = include_insertion(buf, include);
    plan.insert(offset, line);

    match mode {
        ExportMode::WholeType => {
            if let Some(offset) = find_type_keyword(text) {
                plan.insert(offset, format!(" {}", api_macro));
                macros += 1;
            }
        }
        ExportMode::Functions(indices) => {
            let signatures = extract_signatures(text);
            let mut offsets: Vec<usize> = indices
                .iter()
                .filter_map(|&i| signatures.get(i))
                .filter_map(|sig| buf.find(buf.slice(sig.offset, sig.offset + sig.len), 0))
                .collect();
            offsets.sort_unstable();
            offsets.dedup();
            for offset in offsets {
                plan.insert(offset, format!("{} ", api_macro));
                macros += 1;
            }
        }
    }

    (plan, macros)
}

fn ask_mode(text: &[u8], path: &Path, prompter: &mut dyn Prompter) -> Result<ExportMode> {
    let choice = prompter.menu(
        &format!("How should {} be exported?", path.display()),
        &["Export the whole class/struct", "Export selected functions"],
    )?;
    if choice == 0 {
        return Ok(ExportMode::WholeType);
    }

    let signatures = extract_signatures(text);
    if signatures.is_empty() {
        println!("{} No function declarations recognised.", "!".yellow());
        return Ok(ExportMode::Functions(Vec::new()));
    }
    for (i, sig) in signatures.iter().enumerate() {
        println!("  {:>3}. {}", i.to_string().bold(), sig.display());
    }
    let indices =
        prompter.select_indices("Which functions should be exported?", signatures.len())?;
    Ok(ExportMode::Functions(indices))
}

/// Rewrites one header in place with the mode the user picks.
pub fn annotate_header(
    path: &Path,
    identity: &ProjectIdentity,
    prompter: &mut dyn Prompter,
) -> Result<AnnotationReport> {
    let mut buf = TextBuffer::load(path).map_err(|e| ConvertError::resource(path, e))?;
    let mode = ask_mode(buf.as_bytes(), path, prompter)?;
    annotate_with_mode(path, &mut buf, identity, &mode)
}

fn annotate_with_mode(
    path: &Path,
    buf: &mut TextBuffer,
    identity: &ProjectIdentity,
    mode: &ExportMode,
) -> Result<AnnotationReport> {
    let include = include_directive(&identity.root, path, &identity.api_header_name);
    let (plan, macros_inserted) = plan_header(buf, &include, &identity.api_macro, mode);
    plan.apply(buf).map_err(ConvertError::from)?;
    buf.save(path).map_err(|e| ConvertError::resource(path, e))?;

    if macros_inserted == 0 && *mode == ExportMode::WholeType {
        println!(
            "   {} No class/struct in {}, only the include was added",
            "!".yellow(),
            path.display()
        );
    }
    Ok(AnnotationReport {
        path: path.to_path_buf(),
        macros_inserted,
        include_line: include,
    })
}
