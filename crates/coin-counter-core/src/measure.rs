//! Geometric measurement of detected coins.

use std::f64::consts::PI;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{CoinError, DetectedCircle};

/// Empirical pixels-per-millimetre constant for the reference photo setup.
pub const DEFAULT_PX_PER_MM: f64 = 10.0;

fn default_unit() -> String {
    "mm".to_string()
}

/// Units in which areas and perimeters are reported.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum MeasureUnits {
    /// Raw pixel units, scale factor 1.
    #[default]
    Pixels,
    /// Real-world units derived from a fixed pixels-per-unit constant.
    Calibrated {
        px_per_unit: f64,
        #[serde(default = "default_unit")]
        unit: String,
    },
}

impl MeasureUnits {
    pub fn calibrated_mm(px_per_mm: f64) -> Self {
        Self::Calibrated {
            px_per_unit: px_per_mm,
            unit: default_unit(),
        }
    }

    /// Multiplier applied to pixel radii.
    pub fn scale_factor(&self) -> f64 {
        match self {
            Self::Pixels => 1.0,
            Self::Calibrated { px_per_unit, .. } => 1.0 / px_per_unit,
        }
    }

    pub fn validate(&self) -> Result<(), CoinError> {
        match self {
            Self::Pixels => Ok(()),
            Self::Calibrated { px_per_unit, .. } => {
                if px_per_unit.is_finite() && *px_per_unit > 0.0 {
                    Ok(())
                } else {
                    Err(CoinError::InvalidCalibration {
                        px_per_unit: *px_per_unit,
                    })
                }
            }
        }
    }

    pub fn length_label(&self) -> String {
        match self {
            Self::Pixels => "pixels".to_string(),
            Self::Calibrated { unit, .. } => unit.clone(),
        }
    }

    pub fn area_label(&self) -> String {
        match self {
            Self::Pixels => "pixels".to_string(),
            Self::Calibrated { unit, .. } => format!("{unit}²"),
        }
    }
}

/// Measurements of one detected coin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// 1-based position in detection order.
    pub id: u32,
    pub center: Point2<f32>,
    /// Radius in pixels as reported by the detector.
    pub raw_radius: f64,
    /// `raw_radius` times the unit scale factor.
    pub effective_radius: f64,
    pub area: f64,
    pub perimeter: f64,
}

impl CoinRecord {
    pub fn from_circle(id: u32, circle: &DetectedCircle, scale: f64) -> Self {
        let raw_radius = circle.radius as f64;
        let effective_radius = raw_radius * scale;
        Self {
            id,
            center: circle.center,
            raw_radius,
            effective_radius,
            area: PI * effective_radius * effective_radius,
            perimeter: 2.0 * PI * effective_radius,
        }
    }
}

/// Build one record per circle, ids assigned in detection order starting at 1.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(circles), fields(n = circles.len()))
)]
pub fn measure(
    circles: &[DetectedCircle],
    units: &MeasureUnits,
) -> Result<Vec<CoinRecord>, CoinError> {
    units.validate()?;
    let scale = units.scale_factor();
    Ok(circles
        .iter()
        .enumerate()
        .map(|(i, c)| CoinRecord::from_circle(i as u32 + 1, c, scale))
        .collect())
}
