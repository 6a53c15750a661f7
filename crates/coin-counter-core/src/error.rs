/// Errors produced while turning detector output into coin records.
#[derive(thiserror::Error, Debug)]
pub enum CoinError {
    #[error("malformed detector output: circle #{index} has radius {radius}")]
    MalformedDetectorOutput { index: usize, radius: f32 },
    #[error("invalid calibration: {px_per_unit} pixels per unit")]
    InvalidCalibration { px_per_unit: f64 },
    #[error("currency divisor must be positive")]
    ZeroDivisor,
}
