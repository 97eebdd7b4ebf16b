use crate::error::{MdMergeError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub merge: MergeConfig,
    pub output: OutputConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    pub source_comments: bool,
    pub sort_zip_entries: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base name of the auto-derived output file when several inputs are merged.
    pub default_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    pub progress: bool,
    pub pause: PauseMode,
}

/// When to wait for Enter before the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PauseMode {
    /// Only when launched by a file manager (double-click / drag-and-drop)
    #[default]
    Auto,
    /// Whenever stdin is an interactive terminal
    Always,
    /// Never wait
    Never,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            source_comments: true,
            sort_zip_entries: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_name: "merged".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            progress: true,
            pause: PauseMode::Auto,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MdMergeError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MdMergeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| MdMergeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["mdmerge.toml", ".mdmerge.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!(path = default_path, "loading configuration");
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(source_comments) = cli_args.source_comments {
            self.merge.source_comments = source_comments;
        }

        if let Some(sort_zip_entries) = cli_args.sort_zip_entries {
            self.merge.sort_zip_entries = sort_zip_entries;
        }

        if let Some(progress) = cli_args.progress {
            self.ui.progress = progress;
        }

        if let Some(pause) = cli_args.pause {
            self.ui.pause = pause;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.output.default_name.trim();

        if name.is_empty() {
            return Err(MdMergeError::Config {
                message: "output.default_name must not be empty".to_string(),
            });
        }

        if name.contains('/') || name.contains('\\') {
            return Err(MdMergeError::Config {
                message: format!(
                    "output.default_name must be a file name, not a path: {}",
                    name
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub source_comments: Option<bool>,
    pub sort_zip_entries: Option<bool>,
    pub progress: Option<bool>,
    pub pause: Option<PauseMode>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_comments(mut self, enabled: Option<bool>) -> Self {
        self.source_comments = enabled;
        self
    }

    pub fn with_sort_zip_entries(mut self, enabled: Option<bool>) -> Self {
        self.sort_zip_entries = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: Option<bool>) -> Self {
        self.progress = enabled;
        self
    }

    pub fn with_pause(mut self, pause: Option<PauseMode>) -> Self {
        self.pause = pause;
        self
    }
}
