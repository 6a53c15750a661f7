use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::CoinError;

/// One circle reported by a circle detector, in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedCircle {
    pub center: Point2<f32>,
    pub radius: f32,
}

impl DetectedCircle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Point2::new(x, y),
            radius,
        }
    }

    /// Same circle snapped to whole pixels.
    pub fn rounded(&self) -> Self {
        Self {
            center: Point2::new(self.center.x.round(), self.center.y.round()),
            radius: self.radius.round(),
        }
    }
}

/// Reject detector output that downstream arithmetic cannot handle.
///
/// Every radius must be finite and strictly positive. Centers are not checked
/// against the image bounds.
pub fn validate_detections(circles: &[DetectedCircle]) -> Result<(), CoinError> {
    for (index, c) in circles.iter().enumerate() {
        if !c.radius.is_finite() || c.radius <= 0.0 {
            return Err(CoinError::MalformedDetectorOutput {
                index,
                radius: c.radius,
            });
        }
        if !c.center.x.is_finite() || !c.center.y.is_finite() {
            return Err(CoinError::MalformedDetectorOutput {
                index,
                radius: c.radius,
            });
        }
    }
    Ok(())
}

pub fn round_detections(circles: &[DetectedCircle]) -> Vec<DetectedCircle> {
    circles.iter().map(DetectedCircle::rounded).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_positive_radii() {
        let circles = [
            DetectedCircle::new(10.0, 10.0, 4.0),
            DetectedCircle::new(40.0, 12.5, 0.5),
        ];
        assert!(validate_detections(&circles).is_ok());
        assert!(validate_detections(&[]).is_ok());
    }

    #[test]
    fn validate_rejects_negative_zero_and_nan_radius() {
        for bad in [-3.0f32, 0.0, f32::NAN, f32::INFINITY] {
            let circles = [
                DetectedCircle::new(10.0, 10.0, 4.0),
                DetectedCircle::new(20.0, 20.0, bad),
            ];
            match validate_detections(&circles) {
                Err(CoinError::MalformedDetectorOutput { index, .. }) => assert_eq!(index, 1),
                other => panic!("expected malformed output error, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_rejects_non_finite_center() {
        let circles = [DetectedCircle::new(f32::NAN, 3.0, 5.0)];
        assert!(matches!(
            validate_detections(&circles),
            Err(CoinError::MalformedDetectorOutput { index: 0, .. })
        ));
    }

    #[test]
    fn rounding_snaps_to_whole_pixels() {
        let out = round_detections(&[DetectedCircle::new(10.4, 20.6, 59.5)]);
        assert_eq!(out[0], DetectedCircle::new(10.0, 21.0, 60.0));
    }
}
