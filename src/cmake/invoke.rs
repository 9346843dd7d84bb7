use crate::config::BuildConfig;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CMAKE: &str = "cmake";

/// How the CMake run ended. Exit codes are reported, never acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Disabled,
    /// `cmake` is not on PATH
    Missing,
    Finished {
        configure: Option<i32>,
        build: Option<i32>,
    },
}

impl BuildOutcome {
    pub fn describe(&self) -> String {
        let code = |c: &Option<i32>| c.map_or("signal".to_string(), |c| c.to_string());
        match self {
            BuildOutcome::Disabled => "skipped".to_string(),
            BuildOutcome::Missing => "cmake not found".to_string(),
            BuildOutcome::Finished { configure, build } => {
                format!("configure exit {}, build exit {}", code(configure), code(build))
            }
        }
    }
}

/// One configure + build of the generated tree.
#[derive(Debug, Clone)]
pub struct BuildInvocation {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub config: String,
    pub generator: Option<String>,
    /// Where the DLL, import library and archives should land
    pub output_dir: Option<PathBuf>,
}

impl BuildInvocation {
    pub fn new(root: &Path, build: &BuildConfig, output_dir: Option<&Path>) -> Self {
        Self {
            source_dir: root.to_path_buf(),
            build_dir: root.join(&build.dir),
            config: build.config.clone(),
            generator: build.generator.clone(),
            output_dir: output_dir.map(Path::to_path_buf),
        }
    }

    pub fn configure_args(&self) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            self.source_dir.display().to_string(),
            "-B".to_string(),
            self.build_dir.display().to_string(),
        ];
        if let Some(generator) = &self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }
        if let Some(out) = &self.output_dir {
            for kind in ["RUNTIME", "LIBRARY", "ARCHIVE"] {
                args.push(format!("-DCMAKE_{}_OUTPUT_DIRECTORY={}", kind, out.display()));
            }
        }
        args
    }

    pub fn build_args(&self) -> Vec<String> {
        vec![
            "--build".to_string(),
            self.build_dir.display().to_string(),
            "--config".to_string(),
            self.config.clone(),
        ]
    }

    /// Configures and builds, printing CMake's stderr when a step fails.
    pub fn run(&self) -> Result<BuildOutcome> {
        if !cmake_exists() {
            println!(
                "{} cmake not found. Run it yourself: cmake {}",
                "!".yellow(),
                self.configure_args().join(" ")
            );
            return Ok(BuildOutcome::Missing);
        }

        fs::create_dir_all(&self.build_dir)
            .with_context(|| format!("Failed to create {}", self.build_dir.display()))?;

        let configure = run_cmake(&self.configure_args(), "Configuring with CMake...")?;
        report("Configure", &configure);
        let build = run_cmake(&self.build_args(), "Building...")?;
        report("Build", &build);

        Ok(BuildOutcome::Finished {
            configure: configure.status.code(),
            build: build.status.code(),
        })
    }
}

fn cmake_exists() -> bool {
    Command::new(CMAKE).arg("--version").output().is_ok()
}

fn run_cmake(args: &[String], message: &'static str) -> Result<Output> {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
            .tick_chars("◜◠◝◞◡◟"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message);

    let output = Command::new(CMAKE)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cmake {}", args.join(" ")));
    pb.finish_and_clear();
    output
}

fn report(step: &str, output: &Output) {
    if output.status.success() {
        println!("{} {} finished", "✓".green(), step);
    } else {
        println!("{} {} failed ({}):", "x".red(), step, output.status);
        println!("{}", String::from_utf8_lossy(&output.stderr));
    }
}
