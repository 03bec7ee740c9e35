//! Configuration file support for chainnet-dev

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::resources::{
    ClusterSpec, ImageSource, ManifestSpec, NodeManifests, default_clusters, default_images,
    default_manifests,
};

const CONFIG_FILE_NAME: &str = ".chainnet-dev.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub behavior: Behavior,

    #[serde(default)]
    pub minikube: MinikubeSettings,

    #[serde(default)]
    pub nodes: NodeManifests,

    #[serde(default = "default_images")]
    pub images: Vec<ImageSource>,

    #[serde(default = "default_clusters")]
    pub clusters: Vec<ClusterSpec>,

    #[serde(default = "default_manifests")]
    pub manifests: Vec<ManifestSpec>,
}

/// HTTP status API settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    /// Overridden by the PORT environment variable
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,
}

/// Options passed to `minikube start`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MinikubeSettings {
    #[serde(default = "default_addons")]
    pub addons: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_addons() -> Vec<String> {
    vec!["dashboard".to_string(), "metrics-server".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            behavior: Behavior::default(),
            minikube: MinikubeSettings::default(),
            nodes: NodeManifests::default(),
            images: default_images(),
            clusters: default_clusters(),
            manifests: default_manifests(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            confirm_destructive: default_true(),
            show_progress: default_true(),
        }
    }
}

impl Default for MinikubeSettings {
    fn default() -> Self {
        Self {
            addons: default_addons(),
        }
    }
}

impl ServerSettings {
    /// Apply a PORT override, as read from the environment. A blank value
    /// counts as unset.
    pub fn with_port_override(mut self, port: Option<&str>) -> Result<Self> {
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        Ok(self)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Load settings once at startup.
    ///
    /// An explicit path must exist; otherwise the standard locations are
    /// searched and defaults are used when nothing is found. The PORT
    /// environment variable overrides `server.port`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            },
        };

        let port = std::env::var("PORT").ok();
        settings.server = settings.server.with_port_override(port.as_deref())?;

        Ok(settings)
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .chainnet-dev.toml in current directory
    /// 2. ~/.config/chainnet-dev/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("chainnet-dev").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Generate example config file content
    pub fn example_config() -> Result<String> {
        let header = "# chainnet-dev configuration file\n\
                      # Place this file at ~/.config/chainnet-dev/config.toml or .chainnet-dev.toml in your project\n\n";

        let body = toml::to_string_pretty(&Settings::default())
            .context("Failed to serialize example settings")?;

        Ok(format!("{}{}", header, body))
    }
}
