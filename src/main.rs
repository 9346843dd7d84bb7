//! # dllify CLI Entry Point
//!
//! Parses the command line, resolves the root and output paths and runs one
//! interactive conversion.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use std::path::PathBuf;

use dllify::prompt::ConsolePrompter;
use dllify::session::{self, Session, SessionOptions};

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
    fn SetConsoleCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "dllify")]
#[command(about = "Convert a Visual Studio project into a DLL project with a CMake build", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Project root, then an optional output directory (unquoted spaces are fine)
    #[arg(num_args = 0..)]
    paths: Vec<String>,
    /// Read presets from this directory instead of the built-in ones
    #[arg(long)]
    presets: Option<PathBuf>,
    /// Generate the CMake files but do not run CMake
    #[arg(long)]
    no_build: bool,
}

fn main() -> Result<()> {
    enable_windows_utf8_console();

    let cli = Cli::parse();
    if cli.paths.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let (root, output) = session::resolve_paths(&cli.paths, |p| p.exists())?;
    println!(
        "{} Converting {}",
        "🔧".cyan(),
        root.display().to_string().bold()
    );
    if let Some(out) = &output {
        println!("   Output: {}", out.display());
    }

    let mut prompter = ConsolePrompter;
    let mut session = Session::new(
        SessionOptions {
            root,
            output,
            presets_dir: cli.presets,
            no_build: cli.no_build,
        },
        &mut prompter,
    )?;
    let summary = session.convert()?;

    println!();
    summary.to_table().print();
    println!("\n{} Done.", "✓".green());
    Ok(())
}
