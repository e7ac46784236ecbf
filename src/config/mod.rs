use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_reveal_step_ms() -> u64 {
    80
}

fn default_frame_interval_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ball colors as hex strings, cycled by board position. Empty = built-in palette
    #[serde(default)]
    pub palette: Vec<String>,

    /// Delay between revealing consecutive balls
    #[serde(default = "default_reveal_step_ms")]
    pub reveal_step_ms: u64,

    /// Fortune model file (JSON labels + prototypes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// Directory of PPM snapshots used as the camera
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_dir: Option<PathBuf>,

    /// How often to classify a new frame while the fortune reader runs
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Show desktop notifications for CLI draws
    #[serde(default)]
    pub notifications: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            reveal_step_ms: default_reveal_step_ms(),
            model_path: None,
            frames_dir: None,
            frame_interval_ms: default_frame_interval_ms(),
            notifications: false,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("lotto");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep the user's broken file around rather than overwriting it
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn reveal_step(&self) -> Duration {
        Duration::from_millis(self.reveal_step_ms)
    }

    /// Never zero, so the fortune loop cannot spin
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
