//! Configuration management for Stitch.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (.stitch/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: prompt directories are resolved
//! relative to the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default depth cap for nested inclusions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .stitch/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Prompt directories, absolute or relative to the workspace
    pub prompt_dirs: Vec<PathBuf>,

    /// Inclusion resolver settings
    pub resolver: ResolverConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Inclusion resolver settings.
///
/// Cycle detection guarantees termination on its own; the depth cap is a
/// resource guard for pathological inputs. At least one must be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum nesting depth, `None` for no cap
    #[serde(rename = "maxDepth")]
    pub max_depth: Option<usize>,

    /// Track the ancestor chain and stop on circular inclusions
    #[serde(rename = "detectCycles")]
    pub detect_cycles: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            detect_cycles: true,
        }
    }
}

impl ResolverConfig {
    /// Reject settings that would allow unbounded recursion.
    pub fn validate(&self) -> AppResult<()> {
        if !self.detect_cycles && self.max_depth.is_none() {
            return Err(AppError::Config(
                "Cycle detection can only be disabled when maxDepth is set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    prompts: Option<PromptsSection>,
    resolver: Option<ResolverSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsSection {
    directories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResolverSection {
    /// `0` disables the cap
    #[serde(rename = "maxDepth")]
    max_depth: Option<usize>,
    #[serde(rename = "detectCycles")]
    detect_cycles: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            prompt_dirs: Vec::new(),
            resolver: ResolverConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

/// Map a user-facing depth value to the resolver setting: `0` means no cap.
fn depth_cap(value: usize) -> Option<usize> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `STITCH_WORKSPACE`: Override workspace path
    /// - `STITCH_CONFIG`: Path to config file
    /// - `STITCH_PROMPT_DIRS`: Prompt directories (platform path list)
    /// - `STITCH_MAX_DEPTH`: Inclusion depth cap (`0` disables it)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use stitch_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// Explicit arguments win over `STITCH_WORKSPACE` / `STITCH_CONFIG`, so the
    /// config file is always read from the workspace that will be used.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("STITCH_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("STITCH_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".stitch/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(dirs) = std::env::var_os("STITCH_PROMPT_DIRS") {
            config.prompt_dirs = std::env::split_paths(&dirs).collect();
        }

        if let Ok(depth) = std::env::var("STITCH_MAX_DEPTH") {
            let value = depth.parse::<usize>().map_err(|e| {
                AppError::Config(format!("Invalid STITCH_MAX_DEPTH '{}': {}", depth, e))
            })?;
            config.resolver.max_depth = depth_cap(value);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(directories) = config_file.prompts.and_then(|p| p.directories) {
            result.prompt_dirs = directories.into_iter().map(PathBuf::from).collect();
        }

        if let Some(resolver) = config_file.resolver {
            if let Some(max_depth) = resolver.max_depth {
                result.resolver.max_depth = depth_cap(max_depth);
            }
            if let Some(detect_cycles) = resolver.detect_cycles {
                result.resolver.detect_cycles = detect_cycles;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    /// Prompt directories given on the command line replace the configured list.
    pub fn with_overrides(
        mut self,
        prompt_dirs: Vec<PathBuf>,
        max_depth: Option<usize>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if !prompt_dirs.is_empty() {
            self.prompt_dirs = prompt_dirs;
        }

        if let Some(max_depth) = max_depth {
            self.resolver.max_depth = depth_cap(max_depth);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .stitch directory.
    pub fn stitch_dir(&self) -> PathBuf {
        self.workspace.join(".stitch")
    }

    /// Prompt directories resolved against the workspace.
    ///
    /// Falls back to `<workspace>/prompts` when none are configured.
    pub fn prompt_directories(&self) -> Vec<PathBuf> {
        if self.prompt_dirs.is_empty() {
            return vec![self.workspace.join("prompts")];
        }

        self.prompt_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.workspace.join(dir)
                }
            })
            .collect()
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> AppResult<()> {
        self.resolver.validate()?;

        for dir in self.prompt_directories() {
            if !dir.is_dir() {
                return Err(AppError::Config(format!(
                    "Prompt directory does not exist: {:?}",
                    dir
                )));
            }
        }

        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).map(PathBuf::from)
}
