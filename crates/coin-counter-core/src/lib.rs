//! Core types and arithmetic for coin counting.
//!
//! This crate is intentionally small and image-free. It starts from a list of
//! detected circles and produces per-coin measurements, denomination buckets,
//! a total value and a printable report. It does *not* depend on any concrete
//! circle detector or image type.

mod circle;
mod classify;
mod error;
mod logger;
mod measure;
mod report;
mod value;

pub use circle::{round_detections, validate_detections, DetectedCircle};
pub use classify::{
    bucket_for, classify, find_extremes, BucketOffsets, BucketThresholds, Classification,
    Denomination, Extremes,
};
pub use error::CoinError;
pub use measure::{measure, CoinRecord, MeasureUnits, DEFAULT_PX_PER_MM};
pub use report::{BucketSummary, CoinReport, CoinRow, ExtremeCoin};
pub use value::{total_value, Denominations, Value};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};
