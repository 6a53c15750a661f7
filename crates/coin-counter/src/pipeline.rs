//! End-to-end coin counting: image in, report (and optional overlay) out.

use std::fs;
use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::config::{CoinCounterConfig, ConfigError};
use crate::core::{
    classify, measure, round_detections, validate_detections, Classification, CoinError,
    CoinRecord, CoinReport, DetectedCircle,
};
use crate::detect::{
    draw_overlay, gaussian_blur, load_font, load_image, preprocess, save_gray, save_overlay,
    to_grayscale, CircleDetector, DetectError, HoughCircleDetector, PreprocessError,
    VisualizeError,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("no input image configured")]
    MissingImage,
    #[error(transparent)]
    InvalidImage(PreprocessError),
    #[error(transparent)]
    Preprocess(PreprocessError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Coin(#[from] CoinError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<PreprocessError> for PipelineError {
    fn from(err: PreprocessError) -> Self {
        if err.is_invalid_image() {
            Self::InvalidImage(err)
        } else {
            Self::Preprocess(err)
        }
    }
}

/// Everything one run produces.
#[derive(Clone, Debug)]
pub struct CoinCountResult {
    /// Detections as used for measuring (rounded when configured).
    pub circles: Vec<DetectedCircle>,
    pub records: Vec<CoinRecord>,
    pub classification: Classification,
    pub report: CoinReport,
}

/// Measure, classify and value a list of detections.
///
/// Fails with [`CoinError::MalformedDetectorOutput`] on radii that are
/// non-finite or not positive once rounding has been applied. An empty list is
/// valid and yields an empty report.
pub fn count_detections(
    detections: &[DetectedCircle],
    cfg: &CoinCounterConfig,
) -> Result<CoinCountResult, CoinError> {
    cfg.denominations.validate()?;

    let circles = if cfg.round_to_pixels {
        round_detections(detections)
    } else {
        detections.to_vec()
    };
    validate_detections(&circles)?;

    let records = measure(&circles, &cfg.units)?;
    let classification = classify(&records, &cfg.buckets);
    let report = CoinReport::build(&records, &classification, &cfg.denominations, &cfg.units)?;

    log::info!("counted {} coins, total {}", report.count, report.total);

    Ok(CoinCountResult {
        circles,
        records,
        classification,
        report,
    })
}

/// Preprocess `image`, run `detector` on it and count the coins found.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, detector, cfg),
        fields(width = image.width(), height = image.height())
    )
)]
pub fn count_coins<D: CircleDetector>(
    image: &RgbImage,
    detector: &D,
    cfg: &CoinCounterConfig,
) -> Result<CoinCountResult, PipelineError> {
    let blurred = preprocess(image, &cfg.blur)?;
    count_preprocessed(&blurred, detector, cfg)
}

/// Run `detector` on an already blurred grayscale image and count the coins.
pub fn count_preprocessed<D: CircleDetector>(
    blurred: &GrayImage,
    detector: &D,
    cfg: &CoinCounterConfig,
) -> Result<CoinCountResult, PipelineError> {
    let detections = detector.detect(blurred)?;
    if detections.is_empty() {
        log::warn!("no circles detected");
    } else {
        log::info!("detected {} circles", detections.len());
    }
    Ok(count_detections(&detections, cfg)?)
}

/// Full run driven by `cfg`: load the image, detect with the Hough detector,
/// count, then write the optional JSON report and overlay.
///
/// The grayscale and blurred intermediates are saved when `gray_path` and
/// `blurred_path` are set. Image output problems are logged and never fail
/// the run.
pub fn run(cfg: &CoinCounterConfig) -> Result<CoinCountResult, PipelineError> {
    let path = cfg.image_path().ok_or(PipelineError::MissingImage)?;
    let image = load_image(&path)?;
    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    let detector = HoughCircleDetector::new(cfg.hough.clone())?;
    let gray = to_grayscale(&image)?;
    let blurred = gaussian_blur(&gray, &cfg.blur)?;
    if let Some(out) = cfg.gray_path() {
        save_debug_image(&gray, &out, "grayscale");
    }
    if let Some(out) = cfg.blurred_path() {
        save_debug_image(&blurred, &out, "blurred");
    }

    let result = count_preprocessed(&blurred, &detector, cfg)?;

    if let Some(out) = cfg.output_path() {
        write_report_json(&result.report, &out)?;
        log::info!("report written to {}", out.display());
    }

    if let Some(out) = cfg.overlay_path() {
        match render_overlay(&image, &result.circles, cfg, &out) {
            Ok(()) => log::info!("overlay written to {}", out.display()),
            Err(err) => log::warn!("overlay skipped: {err}"),
        }
    }

    Ok(result)
}

fn save_debug_image(image: &GrayImage, path: &Path, stage: &str) {
    match save_gray(image, path) {
        Ok(()) => log::info!("{stage} image written to {}", path.display()),
        Err(err) => log::warn!("{stage} image skipped: {err}"),
    }
}

pub fn write_report_json(report: &CoinReport, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

/// Draw the overlay for `circles` and save it to `path`.
///
/// A font that fails to load only drops the labels.
pub fn render_overlay(
    image: &RgbImage,
    circles: &[DetectedCircle],
    cfg: &CoinCounterConfig,
    path: &Path,
) -> Result<(), VisualizeError> {
    let font = match cfg.font_path() {
        Some(p) => match load_font(&p) {
            Ok(f) => Some(f),
            Err(err) => {
                log::warn!("drawing without labels: {err}");
                None
            }
        },
        None => {
            log::debug!("no font configured, drawing without labels");
            None
        }
    };
    let canvas = draw_overlay(image, circles, &cfg.overlay, font.as_ref());
    save_overlay(&canvas, path)
}
