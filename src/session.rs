//! One conversion run.
//!
//! [`Session`] owns everything that lives for the whole run: the root, the
//! loaded `dllify.toml`, the preset source, the browsing filter and the
//! prompter. [`Session::convert`] performs the steps in order and stops at the
//! first fatal error; files already rewritten by then stay rewritten.
//!
//! ## Steps
//!
//! 1. Select the headers to export
//! 2. Patch the `.vcxproj` for a DLL build
//! 3. Write the API header
//! 4. Annotate the selected headers
//! 5. Generate `CMakeLists.txt` files
//! 6. Configure and build with CMake

use crate::annotate::{self, AnnotationReport};
use crate::api_header::{self, ProjectIdentity};
use crate::cmake::{BuildInvocation, BuildOutcome, CMakeGenerator};
use crate::config::{self, DllifyConfig};
use crate::project_file::{self, InjectionReport};
use crate::prompt::Prompter;
use crate::selection::{self, SelectionSet};
use crate::template::Presets;
use crate::ui::{self, Table};
use crate::walk::{self, EntryFilter};
use anyhow::{Context, Result, bail};
use colored::*;
use std::path::{Path, PathBuf};

/// Splits command-line tokens into the root and optional output path.
///
/// Tokens are joined with spaces until the result names an existing path, so
/// an unquoted `My Project` still resolves. Whatever follows is the output
/// path, which does not need to exist yet.
pub fn resolve_paths(
    tokens: &[String],
    exists: impl Fn(&Path) -> bool,
) -> Result<(PathBuf, Option<PathBuf>)> {
    let mut candidate = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if !candidate.is_empty() {
            candidate.push(' ');
        }
        candidate.push_str(token);
        if exists(Path::new(&candidate)) {
            let rest = tokens[i + 1..].join(" ");
            let output = (!rest.is_empty()).then(|| PathBuf::from(rest));
            return Ok((PathBuf::from(candidate), output));
        }
    }
    bail!("'{}' is not an existing directory", tokens.join(" "))
}

/// Settings that come from the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub root: PathBuf,
    pub output: Option<PathBuf>,
    pub presets_dir: Option<PathBuf>,
    pub no_build: bool,
}

/// What a finished run changed.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub project_file: PathBuf,
    pub injection: InjectionReport,
    pub identity: ProjectIdentity,
    pub annotated: Vec<AnnotationReport>,
    /// Selected files that are not headers
    pub skipped: Vec<PathBuf>,
    pub cmake_files: Vec<PathBuf>,
    pub build: BuildOutcome,
}

impl ConversionSummary {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&["Artifact", "Path", "Details"]);
        table.add_row(vec![
            "Project file".to_string(),
            self.project_file.display().to_string(),
            format!(
                "{} -> DynamicLibrary, {} definition line(s)",
                self.injection.previous_type, self.injection.definitions_patched
            ),
        ]);
        table.add_row(vec![
            "API header".to_string(),
            self.identity.api_header_path.display().to_string(),
            self.identity.api_macro.clone(),
        ]);
        for report in &self.annotated {
            table.add_row(vec![
                "Header".to_string(),
                report.path.display().to_string(),
                format!("{} macro(s)", report.macros_inserted),
            ]);
        }
        for path in &self.skipped {
            table.add_row(vec![
                "Skipped".to_string(),
                path.display().to_string(),
                "not a header".to_string(),
            ]);
        }
        for path in &self.cmake_files {
            table.add_row(vec![
                "CMakeLists".to_string(),
                path.display().to_string(),
                String::new(),
            ]);
        }
        table.add_row(vec![
            "Build".to_string(),
            String::new(),
            self.build.describe(),
        ]);
        table
    }
}

pub struct Session<'a> {
    root: PathBuf,
    output: Option<PathBuf>,
    config: DllifyConfig,
    presets: Presets,
    filter: EntryFilter,
    build_enabled: bool,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Session<'a> {
    /// Loads `dllify.toml` and checks the presets before anything is touched.
    pub fn new(options: SessionOptions, prompter: &'a mut dyn Prompter) -> Result<Self> {
        let root = options.root;
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }
        let config = config::load_config(&root)?;

        let presets = match options.presets_dir.or_else(|| config.presets.dir.clone()) {
            Some(dir) => Presets::from_dir(dir),
            None => Presets::builtin(),
        };
        presets.check()?;

        let mut excluded = config.filter.exclude.clone();
        excluded.push(config.build.dir.clone());
        if let Some(out) = &options.output
            && out.starts_with(&root)
            && let Some(name) = out.file_name()
        {
            excluded.push(name.to_string_lossy().to_string());
        }

        Ok(Self {
            build_enabled: config.build.enabled && !options.no_build,
            root,
            output: options.output,
            config,
            presets,
            filter: EntryFilter::new(excluded),
            prompter,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn convert(&mut self) -> Result<ConversionSummary> {
        let entries = walk::list_entries(&self.root, &self.filter)?;

        ui::print_step("1.", "Select headers to export");
        let selection = selection::select(&entries, &self.filter, &mut *self.prompter)?;
        println!("{} {} file(s) selected", "✓".green(), selection.len());

        ui::print_step("2.", "Patch the project file");
        let project_file =
            project_file::locate_project_file(&entries, &self.filter, &mut *self.prompter)?;
        let injection = project_file::inject_export_definitions(&project_file)?;
        println!(
            "{} {} configuration(s) now build a DLL",
            "✓".green(),
            injection.configurations_patched
        );

        ui::print_step("3.", "Write the API header");
        let identity =
            api_header::generate(&self.root, &entries, &self.presets, &mut *self.prompter)?;

        ui::print_step("4.", "Annotate headers");
        let (annotated, skipped) = self.annotate(&selection, &identity)?;

        ui::print_step("5.", "Generate CMake files");
        let cmake_files = self.generate_cmake(&identity)?;

        ui::print_step("6.", "Build");
        let build = if self.build_enabled {
            BuildInvocation::new(&self.root, &self.config.build, self.output.as_deref()).run()?
        } else {
            println!("{} Build disabled", "!".yellow());
            BuildOutcome::Disabled
        };

        Ok(ConversionSummary {
            project_file,
            injection,
            identity,
            annotated,
            skipped,
            cmake_files,
            build,
        })
    }

    fn annotate(
        &mut self,
        selection: &SelectionSet,
        identity: &ProjectIdentity,
    ) -> Result<(Vec<AnnotationReport>, Vec<PathBuf>)> {
        let mut annotated = Vec::new();
        let mut skipped = Vec::new();
        for path in selection.iter() {
            if !walk::is_header(path) {
                println!("   {} Skipping {}: not a header", "!".yellow(), path.display());
                skipped.push(path.clone());
                continue;
            }
            let report = annotate::annotate_header(path, identity, &mut *self.prompter)
                .with_context(|| format!("Failed to annotate {}", path.display()))?;
            println!(
                "{} {} ({} macro(s))",
                "✓".green(),
                path.display(),
                report.macros_inserted
            );
            annotated.push(report);
        }
        Ok((annotated, skipped))
    }

    fn generate_cmake(&mut self, identity: &ProjectIdentity) -> Result<Vec<PathBuf>> {
        let mut cmake = CMakeGenerator::new(
            &self.presets,
            &self.filter,
            &mut *self.prompter,
            &identity.project_name,
        );
        cmake.process_root(&self.root)?;
        cmake.write_root(identity, &self.config.project)?;
        Ok(cmake.written().to_vec())
    }
}
