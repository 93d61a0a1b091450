use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::density::MAX_ALERT_LEVEL;
use crate::detect::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::ingest::SyntheticConfig;
use crate::monitor::{MonitorSettings, DEFAULT_ALERT_MIN_LEVEL};

const DEFAULT_CAMERA_ID: u32 = 1;
const DEFAULT_FRAME_WIDTH: u32 = 1280;
const DEFAULT_FRAME_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 2;

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    camera_id: Option<u32>,
    confidence_threshold: Option<f64>,
    alert_min_level: Option<u8>,
    replay_path: Option<PathBuf>,
    frame: Option<FrameConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub camera_id: u32,
    pub confidence_threshold: f64,
    pub alert_min_level: u8,
    /// JSON-lines prediction script for the replay backend.
    pub replay_path: Option<PathBuf>,
    pub frame: FrameSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl MonitorConfig {
    /// Load from `SENTINEL_CONFIG` (if set), then apply `SENTINEL_*` overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENTINEL_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Self {
        let frame = file.frame.unwrap_or_default();
        Self {
            camera_id: file.camera_id.unwrap_or(DEFAULT_CAMERA_ID),
            confidence_threshold: file
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            alert_min_level: file.alert_min_level.unwrap_or(DEFAULT_ALERT_MIN_LEVEL),
            replay_path: file.replay_path,
            frame: FrameSettings {
                width: frame.width.unwrap_or(DEFAULT_FRAME_WIDTH),
                height: frame.height.unwrap_or(DEFAULT_FRAME_HEIGHT),
                target_fps: frame.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(id) = env_parsed("SENTINEL_CAMERA_ID")? {
            self.camera_id = id;
        }
        if let Some(threshold) = env_parsed("SENTINEL_CONFIDENCE_THRESHOLD")? {
            self.confidence_threshold = threshold;
        }
        if let Some(level) = env_parsed("SENTINEL_ALERT_MIN_LEVEL")? {
            self.alert_min_level = level;
        }
        if let Some(width) = env_parsed("SENTINEL_FRAME_WIDTH")? {
            self.frame.width = width;
        }
        if let Some(height) = env_parsed("SENTINEL_FRAME_HEIGHT")? {
            self.frame.height = height;
        }
        if let Some(fps) = env_parsed("SENTINEL_TARGET_FPS")? {
            self.frame.target_fps = fps;
        }
        if let Ok(path) = std::env::var("SENTINEL_REPLAY_PATH") {
            if !path.trim().is_empty() {
                self.replay_path = Some(PathBuf::from(path));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(anyhow!(
                "confidence_threshold must be within 0..=1, got {}",
                self.confidence_threshold
            ));
        }
        if !(1..=MAX_ALERT_LEVEL).contains(&self.alert_min_level) {
            return Err(anyhow!(
                "alert_min_level must be within 1..={}, got {}",
                MAX_ALERT_LEVEL,
                self.alert_min_level
            ));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(anyhow!("frame width and height must be greater than zero"));
        }
        if self.frame.target_fps == 0 {
            return Err(anyhow!("frame target_fps must be greater than zero"));
        }
        Ok(())
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            confidence_threshold: self.confidence_threshold,
            alert_min_level: self.alert_min_level,
        }
    }

    pub fn source_config(&self) -> SyntheticConfig {
        SyntheticConfig {
            width: self.frame.width,
            height: self.frame.height,
            target_fps: self.frame.target_fps,
        }
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let cfg: MonitorConfigFile = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} has an invalid value: {:?}", key, value)),
        _ => Ok(None),
    }
}
