//! Overlay of detected coins on the original photo.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use coin_counter_core::DetectedCircle;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_text_mut};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum VisualizeError {
    #[error("failed to read font {path}: {source}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font {path} could not be parsed")]
    InvalidFont { path: PathBuf },
    #[error("failed to write overlay {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub outline_color: [u8; 3],
    pub outline_thickness: u32,
    pub center_color: [u8; 3],
    pub center_radius: u32,
    pub label_color: [u8; 3],
    /// Label position relative to the circle center, in pixels.
    pub label_offset: [i32; 2],
    pub label_scale: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            outline_color: [0, 255, 0],
            outline_thickness: 5,
            center_color: [255, 0, 0],
            center_radius: 2,
            label_color: [255, 0, 0],
            label_offset: [-70, 30],
            label_scale: 32.0,
        }
    }
}

pub fn load_font(path: &Path) -> Result<FontVec, VisualizeError> {
    let data = fs::read(path).map_err(|source| VisualizeError::FontIo {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(data).map_err(|_| VisualizeError::InvalidFont {
        path: path.to_path_buf(),
    })
}

/// Draw outline, center marker and `Coin N` label for every circle.
///
/// Labels need a font; without one only the geometry is drawn. Shapes that
/// fall partly or fully outside the image are clipped.
pub fn draw_overlay(
    image: &RgbImage,
    circles: &[DetectedCircle],
    style: &OverlayStyle,
    font: Option<&FontVec>,
) -> RgbImage {
    let mut canvas = image.clone();
    let outline = Rgb(style.outline_color);
    let center_color = Rgb(style.center_color);
    let label_color = Rgb(style.label_color);
    let scale = PxScale::from(style.label_scale);

    for (i, c) in circles.iter().enumerate() {
        let cx = c.center.x.round() as i32;
        let cy = c.center.y.round() as i32;
        let r = c.radius.round() as i32;

        let t = style.outline_thickness.max(1) as i32;
        for k in 0..t {
            let rk = r - t / 2 + k;
            if rk > 0 {
                draw_hollow_circle_mut(&mut canvas, (cx, cy), rk, outline);
            }
        }
        draw_filled_circle_mut(
            &mut canvas,
            (cx, cy),
            style.center_radius as i32,
            center_color,
        );

        if let Some(font) = font {
            let label = format!("Coin {}", i + 1);
            draw_text_mut(
                &mut canvas,
                label_color,
                cx + style.label_offset[0],
                cy + style.label_offset[1],
                scale,
                font,
                &label,
            );
        }
    }
    canvas
}

pub fn save_overlay(image: &RgbImage, path: &Path) -> Result<(), VisualizeError> {
    image.save(path).map_err(|source| VisualizeError::Save {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a grayscale intermediate, such as the blurred detector input.
pub fn save_gray(image: &GrayImage, path: &Path) -> Result<(), VisualizeError> {
    image.save(path).map_err(|source| VisualizeError::Save {
        path: path.to_path_buf(),
        source,
    })
}
