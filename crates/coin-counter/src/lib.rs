//! Count the coins in a photo and sum their value.
//!
//! This crate provides:
//! - re-exports of the image-free domain crate (`coin-counter-core`) and the
//!   image side (`coin-counter-detect`)
//! - a JSON configuration covering every constant of a run
//! - end-to-end helpers that go from an image file to a printed report
//!
//! ## Quickstart
//!
//! ```no_run
//! use coin_counter::{config::CoinCounterConfig, pipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CoinCounterConfig {
//!     image_path: Some("moedas.png".to_string()),
//!     ..CoinCounterConfig::default()
//! };
//! let result = pipeline::run(&cfg)?;
//! print!("{}", result.report.to_text());
//! # Ok(())
//! # }
//! ```
//!
//! Any [`detect::CircleDetector`] can stand in for the built-in Hough
//! detector through [`pipeline::count_coins`].
//!
//! ## API map
//! - `coin_counter::core`: circles, measurements, classification, value, report.
//! - `coin_counter::detect`: image loading, blur, Hough detection, overlay.
//! - `coin_counter::config`: `CoinCounterConfig` and its JSON helpers.
//! - `coin_counter::pipeline`: `run`, `count_coins`, `count_detections`.

pub use coin_counter_core as core;
pub use coin_counter_detect as detect;

pub mod config;
pub mod pipeline;

pub use coin_counter_core::{
    Classification, CoinRecord, CoinReport, DetectedCircle, Denomination, MeasureUnits, Value,
};
pub use coin_counter_detect::{CircleDetector, HoughCircleDetector, HoughParams};
pub use config::CoinCounterConfig;
pub use pipeline::{
    count_coins, count_detections, count_preprocessed, run, CoinCountResult, PipelineError,
};
