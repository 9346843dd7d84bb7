//! # dllify - turn a Visual Studio project into a DLL project
//!
//! dllify converts an existing `.vcxproj` project into one that builds a
//! shared library, and writes a CMake build for it alongside.
//!
//! ## What a run does
//!
//! - **Project file**: adds `EXPORT` to every preprocessor definitions line and
//!   switches the configuration type to `DynamicLibrary`
//! - **API header**: writes `<Project>_API.h` with the import/export macro
//! - **Headers**: marks the selected classes or functions with that macro
//! - **CMake**: one `CMakeLists.txt` per library folder plus the root one, then
//!   configures and builds
//!
//! ## Quick Start
//!
//! ```bash
//! dllify "C:/src/My Project" C:/out
//! ```
//!
//! ## Module Organization
//!
//! - [`buffer`] - Byte buffer edits with offset re-biasing
//! - [`project_file`] - `.vcxproj` rewriting
//! - [`annotate`] - Header annotation
//! - [`cmake`] - Directory classification and CMake generation
//! - [`session`] - The run from start to finish

/// Header annotation with the export macro.
pub mod annotate;

/// API header naming and generation.
pub mod api_header;

/// Byte buffer with ordered, offset-safe edits.
pub mod buffer;

/// CMake generation and invocation.
pub mod cmake;

/// Configuration file parsing (`dllify.toml`).
pub mod config;

/// Conversion errors.
pub mod error;

/// `.vcxproj` discovery and rewriting.
pub mod project_file;

/// User prompts (console and scripted).
pub mod prompt;

/// Interactive file selection.
pub mod selection;

/// Conversion run orchestration.
pub mod session;

/// Preset templates and placeholder rendering.
pub mod template;

/// Terminal UI utilities (listings, tables).
pub mod ui;

/// Filesystem listing and filtering.
pub mod walk;
