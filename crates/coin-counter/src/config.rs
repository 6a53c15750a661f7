//! JSON configuration for a coin-counting run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::{BucketOffsets, Denominations, MeasureUnits};
use crate::detect::{BlurParams, HoughParams, OverlayStyle};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every tunable of the pipeline. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinCounterConfig {
    /// Input photo.
    pub image_path: Option<String>,
    /// Where to write the JSON report.
    pub output_path: Option<String>,
    /// Where to write the annotated photo.
    pub overlay_path: Option<String>,
    /// TTF/OTF font for overlay labels.
    pub font_path: Option<String>,
    /// Where to write the grayscale intermediate.
    pub gray_path: Option<String>,
    /// Where to write the blurred intermediate.
    pub blurred_path: Option<String>,
    pub blur: BlurParams,
    pub hough: HoughParams,
    /// Snap detected centers and radii to whole pixels before measuring.
    pub round_to_pixels: bool,
    pub units: MeasureUnits,
    pub buckets: BucketOffsets,
    pub denominations: Denominations,
    pub overlay: OverlayStyle,
}

impl Default for CoinCounterConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            output_path: None,
            overlay_path: None,
            font_path: None,
            gray_path: None,
            blurred_path: None,
            blur: BlurParams::default(),
            hough: HoughParams::default(),
            round_to_pixels: true,
            units: MeasureUnits::Pixels,
            buckets: BucketOffsets::default(),
            denominations: Denominations::default(),
            overlay: OverlayStyle::default(),
        }
    }
}

impl CoinCounterConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn image_path(&self) -> Option<PathBuf> {
        self.image_path.as_ref().map(PathBuf::from)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(PathBuf::from)
    }

    pub fn overlay_path(&self) -> Option<PathBuf> {
        self.overlay_path.as_ref().map(PathBuf::from)
    }

    pub fn font_path(&self) -> Option<PathBuf> {
        self.font_path.as_ref().map(PathBuf::from)
    }

    pub fn gray_path(&self) -> Option<PathBuf> {
        self.gray_path.as_ref().map(PathBuf::from)
    }

    pub fn blurred_path(&self) -> Option<PathBuf> {
        self.blurred_path.as_ref().map(PathBuf::from)
    }
}
