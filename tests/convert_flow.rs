//! End-to-end conversion tests
//!
//! These tests build a small Visual Studio project in a temporary directory and
//! drive a whole `Session` with scripted answers, with the CMake build switched
//! off.

use dllify::cmake::{BuildOutcome, CMAKE_LISTS};
use dllify::error::ConvertError;
use dllify::prompt::ScriptedPrompter;
use dllify::session::{Session, SessionOptions};
use std::fs;
use std::path::{Path, PathBuf};

const VCXPROJ: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n\
<Project DefaultTargets=\"Build\">\r\n\
  <PropertyGroup Label=\"Configuration\">\r\n\
    <ConfigurationType>Application</ConfigurationType>\r\n\
  </PropertyGroup>\r\n\
  <PropertyGroup Label=\"Configuration\">\r\n\
    <ConfigurationType>Application</ConfigurationType>\r\n\
  </PropertyGroup>\r\n\
  <ItemDefinitionGroup>\r\n\
    <ClCompile>\r\n\
      <PreprocessorDefinitions>_DEBUG;_CONSOLE;%(PreprocessorDefinitions)</PreprocessorDefinitions>\r\n\
    </ClCompile>\r\n\
  </ItemDefinitionGroup>\r\n\
  <ItemDefinitionGroup>\r\n\
    <ClCompile>\r\n\
      <PreprocessorDefinitions>NDEBUG;_CONSOLE;%(PreprocessorDefinitions)</PreprocessorDefinitions>\r\n\
    </ClCompile>\r\n\
  </ItemDefinitionGroup>\r\n\
</Project>\r\n";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write fixture");
}

/// Demo/
///   Demo.vcxproj, Demo.h, main.cpp, dllify.toml
///   engine/Engine.cpp, engine/Engine.h
///   deps/glm/glm.hpp
///   deps/sdl/include/SDL.h, deps/sdl/lib/SDL2.lib, deps/sdl/lib/SDL2.dll
fn create_project(parent: &Path) -> PathBuf {
    let root = parent.join("Demo");
    write(&root.join("Demo.vcxproj"), VCXPROJ);
    write(&root.join("Demo.h"), "#pragma once\nclass Widget\n{\n};\n");
    write(&root.join("main.cpp"), "int main() { return 0; }\n");
    write(
        &root.join("dllify.toml"),
        "[project]\nversion_major = 2\nversion_minor = 1\n",
    );
    write(
        &root.join("engine/Engine.h"),
        "#pragma once\nint Add(int a, int b);\nint Sub(int a, int b);\n",
    );
    write(&root.join("engine/Engine.cpp"), "#include \"Engine.h\"\n");
    write(&root.join("deps/glm/glm.hpp"), "");
    write(&root.join("deps/sdl/include/SDL.h"), "");
    write(&root.join("deps/sdl/lib/SDL2.lib"), "");
    write(&root.join("deps/sdl/lib/SDL2.dll"), "");
    root
}

fn options(root: &Path) -> SessionOptions {
    SessionOptions {
        root: root.to_path_buf(),
        no_build: true,
        ..SessionOptions::default()
    }
}

#[test]
fn test_full_conversion() {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = create_project(tmp.path());

    let mut prompter = ScriptedPrompter::new([
        // root files: Demo.h, Demo.vcxproj, dllify.toml, main.cpp
        "y", "n", "n", "y",
        // root dirs: skip deps, enter engine and pick Engine.h
        "n", "y", "1",
        // Demo.h: whole class
        "0",
        // Engine.h: functions, only Sub
        "1", "1",
        // deps/glm headers only, deps/sdl headers + libs + dlls
        "0", "3", "lib", "include",
        // engine headers sit next to the sources
        "y",
    ]);
    let mut session = Session::new(options(&root), &mut prompter).expect("Failed to start session");
    let summary = session.convert().expect("Conversion failed");
    drop(session);
    assert_eq!(prompter.remaining(), 0);

    // project file
    assert_eq!(summary.project_file, root.join("Demo.vcxproj"));
    assert_eq!(summary.injection.definitions_patched, 2);
    let vcxproj = fs::read_to_string(root.join("Demo.vcxproj")).unwrap();
    assert!(vcxproj.contains("_DEBUG;_CONSOLE;EXPORT;%(PreprocessorDefinitions)"));
    assert!(vcxproj.contains("NDEBUG;_CONSOLE;EXPORT;%(PreprocessorDefinitions)"));
    assert_eq!(vcxproj.matches("DynamicLibrary").count(), 2);

    // API header
    assert_eq!(summary.identity.api_macro, "DEMO_API");
    let api = fs::read_to_string(root.join("Demo_API.h")).unwrap();
    assert!(api.contains("#define DEMO_API __declspec(dllexport)"));

    // headers
    assert_eq!(
        fs::read_to_string(root.join("Demo.h")).unwrap(),
        "#pragma once\n#include \"Demo_API.h\"\nclass DEMO_API Widget\n{\n};\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("engine/Engine.h")).unwrap(),
        "#pragma once\n#include \"../Demo_API.h\"\nint Add(int a, int b);\nDEMO_API int Sub(int a, int b);\n"
    );
    assert_eq!(summary.annotated.len(), 2);
    assert_eq!(summary.skipped, vec![root.join("main.cpp")]);
    assert_eq!(
        fs::read_to_string(root.join("main.cpp")).unwrap(),
        "int main() { return 0; }\n"
    );

    // CMake
    assert_eq!(summary.cmake_files.len(), 5);
    let top = fs::read_to_string(root.join(CMAKE_LISTS)).unwrap();
    assert!(top.contains("project(Demo VERSION 2.1 LANGUAGES C CXX)"));
    assert!(top.contains("set(PROJECT_SUBDIRECTORIES deps engine)"));
    assert!(top.contains("set(PROJECT_INCLUDE_TARGETS glm sdl engine)"));
    assert!(top.contains("set(PROJECT_LIBRARY_TARGETS sdl)"));
    assert!(top.contains("set(PROJECT_DLL_TARGETS sdl)"));
    assert!(top.contains("${CMAKE_CURRENT_SOURCE_DIR}/Demo_API.h"));

    let engine = fs::read_to_string(root.join("engine").join(CMAKE_LISTS)).unwrap();
    assert!(engine.contains("set(engine_SOURCES Engine.cpp)"));
    assert!(engine.contains("target_compile_definitions(engine PRIVATE EXPORT)"));
    let sdl = fs::read_to_string(root.join("deps/sdl").join(CMAKE_LISTS)).unwrap();
    assert!(sdl.contains("set(sdl_DLLS SDL2.dll)"));

    assert_eq!(summary.build, BuildOutcome::Disabled);
    assert!(!root.join("build").exists());
    assert!(!summary.to_table().is_empty());
}

#[test]
fn test_prebuilt_libs_at_top_level_abort_the_run() {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = tmp.path().join("Demo");
    write(&root.join("Demo.vcxproj"), VCXPROJ);
    write(&root.join("vendor/x.h"), "");
    write(&root.join("vendor/x.lib"), "");

    // skip Demo.vcxproj, do not browse vendor
    let mut prompter = ScriptedPrompter::new(["n", "n"]);
    let mut session = Session::new(options(&root), &mut prompter).expect("Failed to start session");
    let err = session.convert().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::Layout { .. })
    ));
    assert!(!root.join(CMAKE_LISTS).exists());
}

#[test]
fn test_missing_project_file_is_asked_for() {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = tmp.path().join("Demo");
    let elsewhere = tmp.path().join("elsewhere/Demo.vcxproj");
    write(&root.join("Api.h"), "#pragma once\nstruct Api {};\n");
    write(&elsewhere, VCXPROJ);

    let mut prompter = ScriptedPrompter::new([
        "n".to_string(),
        "wrong.txt".to_string(),
        elsewhere.display().to_string(),
    ]);
    let mut session = Session::new(options(&root), &mut prompter).expect("Failed to start session");
    let summary = session.convert().expect("Conversion failed");
    assert_eq!(summary.project_file, elsewhere);
    assert!(
        fs::read_to_string(&elsewhere)
            .unwrap()
            .contains("EXPORT;%(PreprocessorDefinitions)")
    );
    assert_eq!(summary.cmake_files, vec![root.join(CMAKE_LISTS)]);
}
