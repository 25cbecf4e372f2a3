//! Configuration management for acton-views
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/acton-views/{service}/config.toml` (user config, XDG)
//! 4. `/etc/acton-views/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! The loaded values are captured once by [`crate::engine::ViewEngine`] and
//! never change for the lifetime of that engine.
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [views]
//! views_dir = "./public"
//! includes_dir = "./public/includes"
//! not_found_view = "404/index"
//! index_basename = "index"
//! extension = "html"
//! discovery_order = "lexicographic"
//! hot_reload = false
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_views::config::ViewsConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ViewsConfig::load_for_service("my-app")?;
//! let views_dir = &config.views.views_dir;
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default logical path of the not-found view
pub const DEFAULT_NOT_FOUND_VIEW: &str = "404/index";

/// Default name of the includes directory under the views directory
pub const DEFAULT_INCLUDES_DIR: &str = "includes";

/// Default file name (without extension) served for directory requests
pub const DEFAULT_INDEX_BASENAME: &str = "index";

/// Default view file extension
pub const DEFAULT_EXTENSION: &str = "html";

/// Order in which discovered include fragments are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryOrder {
    /// Sort fragments by file name
    #[default]
    Lexicographic,
    /// Keep whatever order the view source reports
    Source,
}

/// View engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Base directory that view paths are resolved against
    pub views_dir: PathBuf,

    /// Directory of include fragments, relative to `views_dir` unless absolute
    /// (defaults to `{views_dir}/includes`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes_dir: Option<PathBuf>,

    /// View rendered when no index view matches, relative to `views_dir`
    pub not_found_view: String,

    /// File name (without extension) looked up for directory requests
    pub index_basename: String,

    /// Extension of view files on disk
    pub extension: String,

    /// Include rendering order
    pub discovery_order: DiscoveryOrder,

    /// Re-read views from disk on every render
    pub hot_reload: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            views_dir: PathBuf::from("./views"),
            includes_dir: None,
            not_found_view: DEFAULT_NOT_FOUND_VIEW.to_string(),
            index_basename: DEFAULT_INDEX_BASENAME.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            discovery_order: DiscoveryOrder::default(),
            hot_reload: cfg!(debug_assertions),
        }
    }
}

impl ViewSettings {
    /// Settings rooted at a views directory, everything else defaulted
    #[must_use]
    pub fn new(views_dir: impl Into<PathBuf>) -> Self {
        Self {
            views_dir: views_dir.into(),
            ..Self::default()
        }
    }

    /// Includes directory with the default applied
    ///
    /// A relative `includes_dir` is taken relative to `views_dir`.
    #[must_use]
    pub fn resolved_includes_dir(&self) -> PathBuf {
        let dir = self
            .includes_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_INCLUDES_DIR));
        self.views_dir.join(dir)
    }

    /// Template id of a logical view path
    ///
    /// Relative paths are joined onto `views_dir`, absolute paths are kept.
    /// A trailing `.{extension}` is dropped so ids never carry the extension.
    #[must_use]
    pub fn view_id(&self, logical: &str) -> PathBuf {
        let suffix = format!(".{}", self.extension);
        let trimmed = logical.strip_suffix(suffix.as_str()).unwrap_or(logical);
        self.views_dir.join(Path::new(trimmed))
    }
}

/// Complete acton-views configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewsConfig {
    /// View engine settings
    #[serde(default)]
    pub views: ViewSettings,
}

impl ViewsConfig {
    /// Load configuration for a specific service
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be parsed
    /// - Values fail type conversion
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // 5. Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 4. System config
        let system_config = PathBuf::from("/etc/acton-views")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 3. User config
        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        // 2. Local config
        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 1. Environment variables
        figment = figment.merge(Env::prefixed("ACTON_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or values fail
    /// type conversion. A missing file falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ACTON_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// ```rust
    /// use acton_views::config::ViewsConfig;
    ///
    /// let path = ViewsConfig::recommended_path("my-app");
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("acton-views")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}
