//! Configuration for the overlay window
//!
//! Loads configuration from TOML file at `~/.config/overlay-window/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::overlay::geometry::Geometry;
use crate::overlay::visual::ARGB_DEPTH;

/// Display used when neither the config nor `DISPLAY` names one
pub const DEFAULT_DISPLAY: &str = ":0";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display to connect to, overrides `DISPLAY`
    pub display: Option<String>,
    pub window: WindowConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("overlay-window");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }

    /// Pick the display target: command line, then config, then `DISPLAY`.
    pub fn display_target(&self, cli: Option<&str>, env: Option<String>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.display.clone())
            .or(env)
            .filter(|target| !target.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY.to_string())
    }
}

/// Overlay window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    /// Visual depth: 32 for ARGB, 24 for plain RGB
    pub depth: u8,
    /// WM_NAME of the window
    pub title: String,
    /// Background color (hex: 0xRRGGBB)
    pub background: u32,
    pub border_pixel: u32,
    /// Bypass the window manager entirely
    pub override_redirect: bool,
    /// Geometry applied with ConfigureWindow around the map request
    pub reposition: Option<Geometry>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 400,
            height: 200,
            border_width: 20,
            depth: ARGB_DEPTH,
            title: "yolo".to_string(),
            background: 0x2883ce,
            border_pixel: 0,
            override_redirect: false,
            // Some(Geometry::new(0, 0, 100, 100, 1)) parks the window in the
            // top-left corner before and after the map request
            reposition: None,
        }
    }
}

impl WindowConfig {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.width, self.height, self.border_width)
    }
}
