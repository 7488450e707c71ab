use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds `ffprobe` and `ffplay`
pub const FFMPEG_PATH_ENV: &str = "PRESSPLAY_FFMPEG_PATH";

const PROBE_BINARY: &str = "ffprobe";
const PLAYER_BINARY: &str = "ffplay";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory containing the ffmpeg tools. `None` means look them up on PATH.
    pub ffmpeg_path: Option<PathBuf>,
    pub display: bool,
    pub parse_metadata: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            display: false,
            parse_metadata: true,
        }
    }
}

impl AppConfig {
    /// Load the user config, falling back to defaults when it is missing or broken.
    ///
    /// The `PRESSPLAY_FFMPEG_PATH` environment variable wins over the file.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            log::info!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {}: {}", config_path.display(), e))?;

        match serde_json::from_str::<Self>(&content) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                log::warn!("Config file {} has issues ({}), using defaults", config_path.display(), e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("press-play")
            .join("config.json")
    }

    fn apply_env(&mut self) {
        if let Some(path) = std::env::var_os(FFMPEG_PATH_ENV) {
            if !path.is_empty() {
                log::debug!("Using ffmpeg path from {}: {:?}", FFMPEG_PATH_ENV, path);
                self.ffmpeg_path = Some(PathBuf::from(path));
            }
        }
    }

    pub fn tools(&self) -> FfmpegTools {
        match &self.ffmpeg_path {
            Some(dir) => FfmpegTools::in_dir(dir),
            None => FfmpegTools::default(),
        }
    }
}

/// Resolved locations of the external probe and player binaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTools {
    pub probe: PathBuf,
    pub player: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            probe: PathBuf::from(PROBE_BINARY),
            player: PathBuf::from(PLAYER_BINARY),
        }
    }
}

impl FfmpegTools {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            probe: dir.join(PROBE_BINARY),
            player: dir.join(PLAYER_BINARY),
        }
    }
}
