use anyhow::{Context, Result};
use shoji_ipc::WindowConfig;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "window.json";

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shoji").join(CONFIG_FILE))
}

/// Loads the window configuration from `path`, or from the user config
/// directory when no path is given. Built-in defaults apply when neither
/// exists.
pub fn load(path: Option<&Path>) -> Result<WindowConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_path().filter(|p| p.is_file()) {
            Some(path) => path,
            None => {
                tracing::debug!("No config file found, using defaults");
                return Ok(WindowConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = parse(&contents, base_dir)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// A relative `filename` is taken relative to the config file's directory.
pub fn parse(contents: &str, base_dir: &Path) -> Result<WindowConfig> {
    let mut config: WindowConfig = serde_json::from_str(contents)?;
    if !config.filename.is_empty() && Path::new(&config.filename).is_relative() {
        config.filename = base_dir.join(&config.filename).to_string_lossy().into_owned();
    }
    Ok(config)
}
