//! Image side of the coin counter.
//!
//! - `preprocess`: load, grayscale, fixed-kernel Gaussian blur.
//! - `hough`: the [`CircleDetector`] seam and a gradient Hough implementation.
//! - `visualize`: outlines, centers and labels drawn over the original photo.

pub mod hough;
pub mod preprocess;
pub mod visualize;

pub use hough::{
    CircleDetector, DetectError, FixedCircles, HoughCircleDetector, HoughParams, ScoredCircle,
};
pub use preprocess::{
    gaussian_blur, gaussian_kernel, load_image, preprocess, sigma_for_kernel, to_grayscale,
    BlurParams, PreprocessError,
};
pub use visualize::{
    draw_overlay, load_font, save_gray, save_overlay, OverlayStyle, VisualizeError,
};
