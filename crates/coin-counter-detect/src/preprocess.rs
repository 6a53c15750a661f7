//! Image loading, grayscale conversion and fixed-kernel Gaussian smoothing.

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageReader, Luma, RgbImage};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_subpixels;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum PreprocessError {
    #[error("invalid image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid image: empty buffer ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("invalid blur kernel size {size} (must be odd and >= 1)")]
    InvalidKernel { size: u32 },
}

impl PreprocessError {
    /// True for errors caused by the input picture rather than by configuration.
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::EmptyImage { .. })
    }
}

/// Square Gaussian smoothing applied before circle detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurParams {
    /// Kernel side in pixels; odd.
    pub kernel_size: u32,
    /// Standard deviation. `None` (or a non-positive value) derives it from the
    /// kernel size.
    pub sigma: Option<f32>,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_size: 21,
            sigma: None,
        }
    }
}

impl BlurParams {
    pub fn effective_sigma(&self) -> f32 {
        match self.sigma {
            Some(s) if s > 0.0 => s,
            _ => sigma_for_kernel(self.kernel_size),
        }
    }
}

/// Sigma conventionally paired with a given kernel size.
pub fn sigma_for_kernel(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Read an image file into an RGB buffer.
pub fn load_image(path: &Path) -> Result<RgbImage, PreprocessError> {
    let load_err = |source| PreprocessError::Load {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| load_err(image::ImageError::IoError(e)))?;
    let rgb = reader.decode().map_err(load_err)?.to_rgb8();
    ensure_non_empty(rgb.width(), rgb.height())?;
    Ok(rgb)
}

fn ensure_non_empty(width: u32, height: u32) -> Result<(), PreprocessError> {
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }
    Ok(())
}

/// Single-channel luma image with the same dimensions.
pub fn to_grayscale(img: &RgbImage) -> Result<GrayImage, PreprocessError> {
    ensure_non_empty(img.width(), img.height())?;
    Ok(image::imageops::grayscale(img))
}

/// Normalized 1-D Gaussian kernel of odd length `size`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Result<Vec<f32>, PreprocessError> {
    if size == 0 || size % 2 == 0 {
        return Err(PreprocessError::InvalidKernel { size });
    }
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_for_kernel(size)
    };
    let half = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    Ok(k)
}

/// Separable Gaussian blur with replicated borders.
///
/// Filtering runs on an `f32` copy so the result is rounded once, not
/// truncated after each pass.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(img),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn gaussian_blur(img: &GrayImage, params: &BlurParams) -> Result<GrayImage, PreprocessError> {
    ensure_non_empty(img.width(), img.height())?;
    let kernel = gaussian_kernel(params.kernel_size, params.effective_sigma())?;
    let luma: Image<Luma<f32>> = map_subpixels(img, |v: u8| v as f32);
    let smoothed = separable_filter_equal(&luma, &kernel);
    Ok(map_subpixels(&smoothed, |v: f32| v.round().clamp(0.0, 255.0) as u8))
}

/// Grayscale conversion followed by the configured blur.
pub fn preprocess(img: &RgbImage, params: &BlurParams) -> Result<GrayImage, PreprocessError> {
    let gray = to_grayscale(img)?;
    gaussian_blur(&gray, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(21, 0.0).unwrap();
        assert_eq!(k.len(), 21);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        for i in 0..10 {
            assert_relative_eq!(k[i], k[20 - i], epsilon = 1e-7);
        }
        assert!(k[10] > k[9]);
    }

    #[test]
    fn even_or_zero_kernel_is_rejected() {
        for size in [0, 4, 20] {
            assert!(matches!(
                gaussian_kernel(size, 1.0),
                Err(PreprocessError::InvalidKernel { .. })
            ));
        }
    }

    #[test]
    fn derived_sigma_for_21_tap_kernel() {
        assert_relative_eq!(sigma_for_kernel(21), 3.5, epsilon = 1e-6);
        let p = BlurParams {
            kernel_size: 21,
            sigma: Some(4.0),
        };
        assert_relative_eq!(p.effective_sigma(), 4.0);
    }

    #[test]
    fn blur_keeps_dimensions_and_constant_images() {
        let img = GrayImage::from_pixel(37, 19, Luma([123]));
        let out = gaussian_blur(&img, &BlurParams::default()).unwrap();
        assert_eq!(out.dimensions(), (37, 19));
        assert!(out.pixels().all(|p| p.0[0] == 123));
    }

    #[test]
    fn blur_is_deterministic_and_smooths_impulse() {
        let mut img = GrayImage::new(31, 31);
        img.put_pixel(15, 15, Luma([255]));
        let params = BlurParams {
            kernel_size: 5,
            sigma: Some(1.0),
        };
        let a = gaussian_blur(&img, &params).unwrap();
        let b = gaussian_blur(&img, &params).unwrap();
        assert_eq!(a, b);
        let center = a.get_pixel(15, 15).0[0];
        assert!(center > 0 && center < 255);
        assert!(a.get_pixel(14, 15).0[0] > 0);
        assert_eq!(a.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn border_pixels_replicate_edges() {
        // Left half dark, right half bright: the outermost columns keep their value.
        let img = GrayImage::from_fn(40, 10, |x, _| {
            if x < 20 {
                Luma([10])
            } else {
                Luma([200])
            }
        });
        let out = gaussian_blur(&img, &BlurParams::default()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[0], 10);
        assert_eq!(out.get_pixel(39, 9).0[0], 200);
    }

    #[test]
    fn empty_image_is_invalid() {
        let empty = RgbImage::new(0, 5);
        let err = to_grayscale(&empty).unwrap_err();
        assert!(err.is_invalid_image());
        let err = gaussian_blur(&GrayImage::new(4, 0), &BlurParams::default()).unwrap_err();
        assert!(err.is_invalid_image());
    }

    #[test]
    fn grayscale_keeps_dimensions() {
        let img = RgbImage::from_pixel(8, 3, Rgb([255, 255, 255]));
        let gray = to_grayscale(&img).unwrap();
        assert_eq!(gray.dimensions(), (8, 3));
        assert_eq!(gray.get_pixel(7, 2).0[0], 255);
    }

    #[test]
    fn missing_file_is_invalid_image() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.is_invalid_image());
    }
}
