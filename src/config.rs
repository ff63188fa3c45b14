//! Configuration persistence for diffpane settings.
//!
//! Settings are stored in `~/.config/diffpane/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub syntax_theme: String,
    pub panel_title: String,
    /// Where the preview is written; a temp directory when unset
    pub output_dir: Option<PathBuf>,
    pub shell: String,
    pub diff_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syntax_theme: "base16-ocean.dark".to_string(),
            panel_title: "Diff Preview".to_string(),
            output_dir: None,
            shell: "sh".to_string(),
            diff_command: "git diff".to_string(),
        }
    }
}

impl Config {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("diffpane"))
    }
}

/// Returns the path to the config file: `~/.config/diffpane/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("diffpane").join("config.toml"))
}

/// Load configuration from disk. Returns default if file is missing or invalid.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => parse(&contents),
        Err(_) => Config::default(),
    }
}

fn parse(contents: &str) -> Config {
    toml::from_str(contents).unwrap_or_else(|e| {
        log::warn!("Ignoring invalid config: {}", e);
        Config::default()
    })
}
