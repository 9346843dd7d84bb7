//! CMake project generation.
//!
//! Each immediate subdirectory of the project root is classified by what it
//! holds and gets its own `CMakeLists.txt` from a preset. The target names are
//! collected in a [`LibraryRegistry`] and rendered into the root
//! `CMakeLists.txt`, which builds the shared library itself. Finally CMake is
//! run against the generated tree.
//!
//! ## Directory kinds
//!
//! - headers only: an `INTERFACE` target exposing the folder
//! - sources: a `STATIC` target over every `.cpp` in the folder
//! - headers + libs (+ dlls): prebuilt binaries, only inside a container
//! - container: a folder of library folders, each described by the user

mod classify;
mod generate;
mod invoke;

pub use classify::{DirectoryClassification, classify};
pub use generate::{CMAKE_LISTS, CMakeGenerator, LibraryRegistry, root_substitutions};
pub use invoke::{BuildInvocation, BuildOutcome};
