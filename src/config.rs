use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "dllify.toml";

/// Optional per-project settings read from `dllify.toml` in the root.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct DllifyConfig {
    pub project: ProjectConfig,
    pub presets: PresetConfig,
    pub build: BuildConfig,
    pub filter: FilterConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ProjectConfig {
    pub version_major: u32,
    pub version_minor: u32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version_major: 1,
            version_minor: 0,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct PresetConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BuildConfig {
    pub enabled: bool,
    pub dir: String,
    pub config: String,
    pub generator: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "build".to_string(),
            config: "Release".to_string(),
            generator: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct FilterConfig {
    pub exclude: Vec<String>,
}

/// Loads `<root>/dllify.toml`, or defaults when the file does not exist.
pub fn load_config(root: &Path) -> Result<DllifyConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(DllifyConfig::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config: DllifyConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {} - check for syntax errors", path.display()))?;

    if let Some(dir) = &config.presets.dir
        && dir.is_relative()
    {
        config.presets.dir = Some(root.join(dir));
    }
    Ok(config)
}
