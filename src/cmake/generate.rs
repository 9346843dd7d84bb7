use super::classify::{DirectoryClassification, classify};
use crate::api_header::{ProjectIdentity, sanitize_name};
use crate::config::ProjectConfig;
use crate::error::ConvertError;
use crate::prompt::Prompter;
use crate::template::{Preset, Presets, Substitutions, cmake_quote};
use crate::walk::{self, EntryFilter};
use anyhow::Result;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const CMAKE_LISTS: &str = "CMakeLists.txt";

/// Target names collected while processing subdirectories, consumed by the
/// root `CMakeLists.txt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryRegistry {
    /// Directories the root adds with `add_subdirectory`
    pub subdirectories: Vec<String>,
    /// Targets that provide headers
    pub includes: Vec<String>,
    /// Targets that wrap prebuilt `.lib` files
    pub libraries: Vec<String>,
    /// Targets whose DLLs are copied next to the built library
    pub dlls: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

pub struct CMakeGenerator<'a> {
    presets: &'a Presets,
    filter: &'a EntryFilter,
    prompter: &'a mut dyn Prompter,
    project_name: String,
    registry: LibraryRegistry,
    written: Vec<PathBuf>,
}

impl<'a> CMakeGenerator<'a> {
    pub fn new(
        presets: &'a Presets,
        filter: &'a EntryFilter,
        prompter: &'a mut dyn Prompter,
        project_name: &str,
    ) -> Self {
        Self {
            presets,
            filter,
            prompter,
            project_name: project_name.to_string(),
            registry: LibraryRegistry::default(),
            written: Vec::new(),
        }
    }

    pub fn registry(&self) -> &LibraryRegistry {
        &self.registry
    }

    /// Every `CMakeLists.txt` written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Target name for a folder; never the same as the project's own target.
    fn target_name(&self, dir: &Path) -> String {
        let name = sanitize_name(&dir.file_name().unwrap_or_default().to_string_lossy());
        if name == self.project_name {
            format!("{}_lib", name)
        } else {
            name
        }
    }

    fn write(&mut self, dir: &Path, content: String) -> Result<()> {
        let path = dir.join(CMAKE_LISTS);
        fs::write(&path, content).map_err(|e| ConvertError::resource(&path, e))?;
        println!("   {} {}", "+".green(), path.display());
        self.written.push(path);
        Ok(())
    }

    /// Asks for a path relative to `dir` until it names an existing directory.
    /// An empty answer means `dir` itself.
    fn ask_subpath(&mut self, dir: &Path, message: &str) -> Result<String> {
        loop {
            let answer = self.prompter.text(message)?;
            let rel = answer
                .trim()
                .replace('\\', "/")
                .trim_start_matches("./")
                .trim_end_matches('/')
                .to_string();
            let rel = if rel.is_empty() { ".".to_string() } else { rel };
            if dir.join(&rel).is_dir() {
                return Ok(rel);
            }
            println!(
                "{} {} is not a directory inside {}",
                "x".red(),
                rel,
                dir.display()
            );
        }
    }

    /// Processes every immediate subdirectory of the project root.
    pub fn process_root(&mut self, root: &Path) -> Result<()> {
        let dirs: Vec<PathBuf> = walk::list_entries(root, self.filter)?
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.path)
            .collect();
        for dir in dirs {
            self.process_directory(&dir)?;
        }
        Ok(())
    }

    /// Classifies a top-level folder and writes its `CMakeLists.txt`.
    ///
    /// Folders holding `.lib`/`.dll` files directly cannot be described from
    /// here; they have to sit inside a container folder where the user states
    /// their layout.
    pub fn process_directory(&mut self, dir: &Path) -> Result<DirectoryClassification> {
        let kind = classify(dir, self.filter)?;
        let name = dir.file_name().unwrap_or_default().to_string_lossy().to_string();
        println!("{} {} ({})", "→".cyan(), name.bold(), kind.label().dimmed());

        match kind {
            DirectoryClassification::HeadersOnly
            | DirectoryClassification::ContainsSources => self.write_library(dir, kind)?,
            DirectoryClassification::Container => self.write_container(dir)?,
            DirectoryClassification::HeadersLibs | DirectoryClassification::HeadersLibsDlls => {
                return Err(ConvertError::layout(
                    dir,
                    "prebuilt libraries must live in their own folder inside a library folder",
                )
                .into());
            }
            DirectoryClassification::Ambiguous => {
                println!("   {} Skipping {}: nothing to build", "!".yellow(), name);
                return Ok(kind);
            }
        }
        push_unique(&mut self.registry.subdirectories, &cmake_quote(&name));
        Ok(kind)
    }

    /// Writes the stanza for one library folder of a known kind.
    pub fn write_library(&mut self, dir: &Path, kind: DirectoryClassification) -> Result<()> {
        match kind {
            DirectoryClassification::HeadersOnly => self.write_headers_only(dir),
            DirectoryClassification::ContainsSources => self.write_sources(dir),
            DirectoryClassification::HeadersLibs => self.write_prebuilt(dir, false),
            DirectoryClassification::HeadersLibsDlls => self.write_prebuilt(dir, true),
            DirectoryClassification::Container | DirectoryClassification::Ambiguous => {
                Err(ConvertError::layout(dir, "not a library folder").into())
            }
        }
    }

    fn write_headers_only(&mut self, dir: &Path) -> Result<()> {
        let name = self.target_name(dir);
        let subs = Substitutions::new()
            .set("LIBRARY_NAME", &name)
            .set("HEADER_LOCATION", ".");
        let content = self.presets.render(Preset::HeadersOnly, &subs)?;
        self.write(dir, content)?;
        push_unique(&mut self.registry.includes, &name);
        Ok(())
    }

    fn write_sources(&mut self, dir: &Path) -> Result<()> {
        let name = self.target_name(dir);
        let sources: Vec<String> = walk::files_with_extension(dir, &["cpp"])?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| cmake_quote(&n.to_string_lossy()))
            .collect();
        if sources.is_empty() {
            return Err(ConvertError::layout(dir, "no .cpp files to build").into());
        }

        let colocated = self
            .prompter
            .confirm(&format!("Are the headers of {} next to its sources?", name))?;
        let header_location = if colocated {
            ".".to_string()
        } else {
            self.ask_subpath(dir, &format!("Header folder of {} (relative to it):", name))?
        };

        let subs = Substitutions::new()
            .set("LIBRARY_NAME", &name)
            .set_list("SOURCES", &sources)
            .set("SOURCE_LOCATION", ".")
            .set("HEADER_LOCATION", header_location);
        let content = self.presets.render(Preset::Sources, &subs)?;
        self.write(dir, content)?;
        push_unique(&mut self.registry.includes, &name);
        Ok(())
    }

    fn write_prebuilt(&mut self, dir: &Path, with_dlls: bool) -> Result<()> {
        let name = self.target_name(dir);
        let library_location =
            self.ask_subpath(dir, &format!("Folder with the .lib files of {}:", name))?;
        let header_location =
            self.ask_subpath(dir, &format!("Folder with the headers of {}:", name))?;

        let mut subs = Substitutions::new()
            .set("LIBRARY_NAME", &name)
            .set("LIBRARY_LOCATION", &library_location)
            .set("HEADER_LOCATION", header_location);

        let preset = if with_dlls {
            let dlls: Vec<String> = walk::files_with_extension(&dir.join(&library_location), &["dll"])?
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| cmake_quote(&n.to_string_lossy()))
                .collect();
            if dlls.is_empty() {
                println!(
                    "   {} No .dll files in {}/{}",
                    "!".yellow(),
                    name,
                    library_location
                );
            }
            subs = subs.set_list("DLL_FILES", &dlls);
            Preset::LibrariesWithDlls
        } else {
            Preset::Libraries
        };

        let content = self.presets.render(preset, &subs)?;
        self.write(dir, content)?;
        push_unique(&mut self.registry.includes, &name);
        push_unique(&mut self.registry.libraries, &name);
        if with_dlls {
            push_unique(&mut self.registry.dlls, &name);
        }
        Ok(())
    }

    fn write_container(&mut self, dir: &Path) -> Result<()> {
        let children: Vec<PathBuf> = walk::list_entries(dir, self.filter)?
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.path)
            .collect();

        let options: Vec<&str> = DirectoryClassification::MENU
            .iter()
            .map(|k| k.label())
            .collect();
        let mut names = Vec::new();
        for child in &children {
            let child_name = child.file_name().unwrap_or_default().to_string_lossy();
            let choice = self
                .prompter
                .menu(&format!("What does {} contain?", child.display()), &options)?;
            self.write_library(child, DirectoryClassification::MENU[choice])?;
            names.push(cmake_quote(&child_name));
        }

        let subs = Substitutions::new()
            .set("LIBRARY_NAME", self.target_name(dir))
            .set_list("SUBDIRECTORIES", &names);
        let content = self.presets.render(Preset::Container, &subs)?;
        self.write(dir, content)
    }

    /// Writes the root `CMakeLists.txt` from everything registered so far.
    pub fn write_root(
        &mut self,
        identity: &ProjectIdentity,
        version: &ProjectConfig,
    ) -> Result<PathBuf> {
        let subs = root_substitutions(&self.registry, identity, version);
        let content = self.presets.render(Preset::Root, &subs)?;
        self.write(&identity.root, content)?;
        Ok(identity.root.join(CMAKE_LISTS))
    }
}

pub fn root_substitutions(
    registry: &LibraryRegistry,
    identity: &ProjectIdentity,
    version: &ProjectConfig,
) -> Substitutions {
    Substitutions::new()
        .set("PROJECT_NAME", &identity.project_name)
        .set("VERSION_MAJOR", version.version_major.to_string())
        .set("VERSION_MINOR", version.version_minor.to_string())
        .set("API_FILE", &identity.api_header_name)
        .set_list("SUBDIRECTORIES", &registry.subdirectories)
        .set_list("INCLUDES", &registry.includes)
        .set_list("LIBRARIES", &registry.libraries)
        .set_list("DLLS", &registry.dlls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::template::placeholders;

    fn touch(dir: &Path, names: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_sources_folder_lists_every_cpp() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("engine");
        touch(&dir, &["b.cpp", "a.cpp", "a.h", "notes.md"]);
        touch(&dir.join("include"), &["engine.h"]);

        let presets = Presets::builtin();
        let filter = EntryFilter::default();
        let mut prompter = ScriptedPrompter::new(["n", "missing", "include/"]);
        let mut cmake = CMakeGenerator::new(&presets, &filter, &mut prompter, "Demo");

        let kind = cmake.process_directory(&dir)?;
        assert_eq!(kind, DirectoryClassification::ContainsSources);
        let text = fs::read_to_string(dir.join(CMAKE_LISTS))?;
        assert!(text.contains("set(engine_SOURCES a.cpp b.cpp)"));
        assert!(text.contains("${CMAKE_CURRENT_SOURCE_DIR}/include)"));
        assert!(text.contains("target_compile_definitions(engine PRIVATE EXPORT)"));
        assert!(placeholders(&text).is_empty());
        assert_eq!(cmake.registry().includes, vec!["engine"]);
        assert_eq!(cmake.registry().subdirectories, vec!["engine"]);
        Ok(())
    }

    #[test]
    fn test_container_children_classified_by_user() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let deps = tmp.path().join("deps");
        touch(&deps.join("glm"), &["glm.hpp"]);
        touch(&deps.join("sdl/include"), &["SDL.h"]);
        touch(&deps.join("sdl/lib/x64"), &["SDL2.lib", "SDL2.dll"]);

        let presets = Presets::builtin();
        let filter = EntryFilter::default();
        // glm: headers only; sdl: headers + libs + dlls
        let mut prompter = ScriptedPrompter::new(["0", "3", "lib/x64", "include"]);
        let mut cmake = CMakeGenerator::new(&presets, &filter, &mut prompter, "Demo");

        let kind = cmake.process_directory(&deps)?;
        assert_eq!(kind, DirectoryClassification::Container);
        assert_eq!(cmake.written().len(), 3);

        let parent = fs::read_to_string(deps.join(CMAKE_LISTS))?;
        assert!(parent.contains("set(deps_SUBDIRECTORIES glm sdl)"));
        let sdl = fs::read_to_string(deps.join("sdl").join(CMAKE_LISTS))?;
        assert!(sdl.contains("set(sdl_DLLS SDL2.dll)"));
        assert!(sdl.contains("/lib/x64/*.lib"));

        let registry = cmake.registry();
        assert_eq!(registry.subdirectories, vec!["deps"]);
        assert_eq!(registry.includes, vec!["glm", "sdl"]);
        assert_eq!(registry.libraries, vec!["sdl"]);
        assert_eq!(registry.dlls, vec!["sdl"]);
        Ok(())
    }

    #[test]
    fn test_prebuilt_libs_at_top_level_is_layout_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("vendor");
        touch(&dir, &["x.h", "x.lib"]);

        let presets = Presets::builtin();
        let filter = EntryFilter::default();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut cmake = CMakeGenerator::new(&presets, &filter, &mut prompter, "Demo");
        let err = cmake.process_directory(&dir).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::Layout { .. })
        ));
        assert!(!dir.join(CMAKE_LISTS).exists());
        Ok(())
    }

    #[test]
    fn test_target_name_avoids_project_name() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("Demo");
        touch(&dir, &["x.h"]);

        let presets = Presets::builtin();
        let filter = EntryFilter::default();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut cmake = CMakeGenerator::new(&presets, &filter, &mut prompter, "Demo");
        cmake.process_directory(&dir)?;
        assert_eq!(cmake.registry().includes, vec!["Demo_lib"]);
        Ok(())
    }

    #[test]
    fn test_root_renders_aggregated_lists() -> Result<()> {
        let registry = LibraryRegistry {
            subdirectories: vec!["engine".into(), "deps".into()],
            includes: vec!["engine".into(), "glm".into(), "sdl".into()],
            libraries: vec!["sdl".into()],
            dlls: vec!["sdl".into()],
        };
        let identity = ProjectIdentity::derive(Path::new("/work/Demo"));
        let version = ProjectConfig {
            version_major: 2,
            version_minor: 3,
        };
        let subs = root_substitutions(&registry, &identity, &version);
        let text = Presets::builtin().render(Preset::Root, &subs)?;

        assert!(text.contains("project(Demo VERSION 2.3 LANGUAGES C CXX)"));
        assert!(text.contains("set(PROJECT_SUBDIRECTORIES engine deps)"));
        assert!(text.contains("set(PROJECT_INCLUDE_TARGETS engine glm sdl)"));
        assert!(text.contains("set(PROJECT_LIBRARY_TARGETS sdl)"));
        assert!(text.contains("set(PROJECT_DLL_TARGETS sdl)"));
        assert!(text.contains("${CMAKE_CURRENT_SOURCE_DIR}/Demo_API.h"));
        assert!(placeholders(&text).is_empty());
        Ok(())
    }
}
