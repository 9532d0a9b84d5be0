//! Application-level configuration loading, including the palette rule table.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::color::RoleRules;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PALETTE_STUDIO_CONFIG_PATH";
/// Environment variable that overrides the configured pipeline base URL.
const PIPELINE_URL_ENV: &str = "PIPELINE_URL";
/// Environment variable that forces developer mode on or off.
const DEVELOPER_MODE_ENV: &str = "DEVELOPER_MODE";

/// Hard limit on user-added colors.
const DEFAULT_MAX_COLORS: usize = 8;
/// User color count beyond which additions require confirmation.
const DEFAULT_SOFT_WARNING: usize = 5;
/// Default base URL of the image-generation pipeline API.
const DEFAULT_PIPELINE_URL: &str = "http://localhost:8090";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    rules: RoleRules,
    max_colors: usize,
    soft_color_warning: usize,
    pipeline_url: String,
    developer_mode: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded palette configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Ok(url) = env::var(PIPELINE_URL_ENV)
            && !url.is_empty()
        {
            config.pipeline_url = url;
        }
        if let Ok(flag) = env::var(DEVELOPER_MODE_ENV) {
            config.developer_mode = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Per-role caps and base ratios.
    pub fn role_rules(&self) -> &RoleRules {
        &self.rules
    }

    /// Hard limit on user-added colors (auto neutrals get two extra slots).
    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// User color count beyond which additions require explicit confirmation.
    pub fn soft_color_warning(&self) -> usize {
        self.soft_color_warning
    }

    /// Base URL of the external pipeline API.
    pub fn pipeline_url(&self) -> &str {
        &self.pipeline_url
    }

    /// Whether developer-facing surfaces (interactive API docs) are exposed.
    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: RoleRules::default(),
            max_colors: DEFAULT_MAX_COLORS,
            soft_color_warning: DEFAULT_SOFT_WARNING,
            pipeline_url: DEFAULT_PIPELINE_URL.into(),
            developer_mode: false,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    role_caps: Option<RawRoleCaps>,
    max_colors: Option<usize>,
    soft_color_warning: Option<usize>,
    pipeline_url: Option<String>,
    developer_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
/// Per-role cardinality caps as written in the configuration file.
struct RawRoleCaps {
    primary: usize,
    secondary: usize,
    accent: usize,
    neutral_light: usize,
    neutral_dark: usize,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let rules = value
            .role_caps
            .map(|caps| {
                RoleRules::with_caps(
                    caps.primary,
                    caps.secondary,
                    caps.accent,
                    caps.neutral_light,
                    caps.neutral_dark,
                )
            })
            .unwrap_or(defaults.rules);

        Self {
            rules,
            max_colors: value.max_colors.unwrap_or(defaults.max_colors),
            soft_color_warning: value
                .soft_color_warning
                .unwrap_or(defaults.soft_color_warning),
            pipeline_url: value.pipeline_url.unwrap_or(defaults.pipeline_url),
            developer_mode: value.developer_mode.unwrap_or(defaults.developer_mode),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
