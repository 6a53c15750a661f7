//! Gradient Hough circle detection.
//!
//! Every Canny edge pixel votes along both directions of its Sobel gradient,
//! at each radius in `[min_radius, max_radius]`. Accumulator peaks become
//! center candidates; each candidate that keeps `min_dist` from the circles
//! accepted so far gets the radius best supported by the surrounding edge
//! pixels. Circles are returned strongest center first.

use coin_counter_core::DetectedCircle;
use image::GrayImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid detector parameters: {0}")]
    InvalidParams(String),
}

/// Anything that turns a preprocessed grayscale image into circles.
pub trait CircleDetector {
    fn detect(&self, gray: &GrayImage) -> Result<Vec<DetectedCircle>, DetectError>;
}

impl<T: CircleDetector + ?Sized> CircleDetector for &T {
    fn detect(&self, gray: &GrayImage) -> Result<Vec<DetectedCircle>, DetectError> {
        (**self).detect(gray)
    }
}

/// Detector that ignores the image and replays a fixed list of circles.
#[derive(Clone, Debug, Default)]
pub struct FixedCircles(pub Vec<DetectedCircle>);

impl CircleDetector for FixedCircles {
    fn detect(&self, _gray: &GrayImage) -> Result<Vec<DetectedCircle>, DetectError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Inverse ratio of accumulator resolution to image resolution, `>= 1`.
    pub dp: f32,
    /// Minimum distance between centers of accepted circles.
    pub min_dist: f32,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f32,
    /// Minimum center votes, and minimum edge support of the chosen radius.
    pub accumulator_threshold: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Keep at most this many circles.
    #[serde(default)]
    pub max_circles: Option<usize>,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_dist: 120.0,
            canny_high: 50.0,
            accumulator_threshold: 30,
            min_radius: 60,
            max_radius: 150,
            max_circles: None,
        }
    }
}

impl HoughParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        // Accumulator is never finer than the image grid.
        if !(self.dp.is_finite() && self.dp >= 1.0) {
            return Err(DetectError::InvalidParams(format!(
                "dp must be at least 1, got {}",
                self.dp
            )));
        }
        if !(self.canny_high.is_finite() && self.canny_high > 0.0) {
            return Err(DetectError::InvalidParams(format!(
                "canny_high must be positive, got {}",
                self.canny_high
            )));
        }
        if !(self.min_dist.is_finite() && self.min_dist > 0.0) {
            return Err(DetectError::InvalidParams(format!(
                "min_dist must be positive, got {}",
                self.min_dist
            )));
        }
        if self.min_radius > self.max_radius {
            return Err(DetectError::InvalidParams(format!(
                "min_radius {} exceeds max_radius {}",
                self.min_radius, self.max_radius
            )));
        }
        if self.max_radius == 0 {
            return Err(DetectError::InvalidParams(
                "max_radius must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepted circle together with the evidence behind it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScoredCircle {
    pub circle: DetectedCircle,
    /// Accumulator votes at the center.
    pub votes: u32,
    /// Edge pixels within one pixel of the chosen radius.
    pub support: u32,
}

#[derive(Clone, Copy, Debug)]
struct EdgePoint {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

#[derive(Clone, Copy, Debug)]
struct CenterCandidate {
    center: Point2<f32>,
    votes: u32,
}

pub struct HoughCircleDetector {
    params: HoughParams,
}

impl HoughCircleDetector {
    pub fn new(params: HoughParams) -> Result<Self, DetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HoughParams {
        &self.params
    }

    /// Full detection returning vote and support counts per circle.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, gray),
            fields(width = gray.width(), height = gray.height())
        )
    )]
    pub fn detect_scored(&self, gray: &GrayImage) -> Vec<ScoredCircle> {
        let (w, h) = gray.dimensions();
        if w < 3 || h < 3 {
            return Vec::new();
        }
        let p = &self.params;

        let edges = collect_edge_points(gray, p.canny_high);
        log::debug!("hough: {} edge pixels", edges.len());
        if edges.is_empty() {
            return Vec::new();
        }

        let centers = find_centers(&edges, w, h, p);
        log::debug!("hough: {} center candidates", centers.len());

        select_circles(&centers, &edges, p)
    }
}

impl CircleDetector for HoughCircleDetector {
    fn detect(&self, gray: &GrayImage) -> Result<Vec<DetectedCircle>, DetectError> {
        Ok(self
            .detect_scored(gray)
            .into_iter()
            .map(|s| s.circle)
            .collect())
    }
}

fn collect_edge_points(gray: &GrayImage, canny_high: f32) -> Vec<EdgePoint> {
    let edges = imageproc::edges::canny(gray, 0.5 * canny_high, canny_high);
    let gx = imageproc::gradients::horizontal_sobel(gray);
    let gy = imageproc::gradients::vertical_sobel(gray);

    let mut out = Vec::new();
    for (x, y, px) in edges.enumerate_pixels() {
        if px.0[0] == 0 {
            continue;
        }
        let gxv = gx.get_pixel(x, y).0[0] as f32;
        let gyv = gy.get_pixel(x, y).0[0] as f32;
        let mag = (gxv * gxv + gyv * gyv).sqrt();
        if mag < 1e-6 {
            continue;
        }
        out.push(EdgePoint {
            x: x as f32,
            y: y as f32,
            dx: gxv / mag,
            dy: gyv / mag,
        });
    }
    out
}

fn find_centers(edges: &[EdgePoint], w: u32, h: u32, p: &HoughParams) -> Vec<CenterCandidate> {
    let idp = 1.0 / p.dp;
    let aw = (w as f32 * idp).ceil() as usize + 2;
    let ah = (h as f32 * idp).ceil() as usize + 2;
    let mut accum = vec![0u32; aw * ah];

    for e in edges {
        for r in p.min_radius..=p.max_radius {
            let r = r as f32;
            for sign in [1.0f32, -1.0] {
                let cx = ((e.x + sign * e.dx * r) * idp).round();
                let cy = ((e.y + sign * e.dy * r) * idp).round();
                if cx < 0.0 || cy < 0.0 || cx >= aw as f32 || cy >= ah as f32 {
                    continue;
                }
                accum[cy as usize * aw + cx as usize] += 1;
            }
        }
    }

    // Peaks: strictly above left/up, not below right/down, so plateaus keep one cell.
    let mut out = Vec::new();
    for y in 1..ah - 1 {
        for x in 1..aw - 1 {
            let i = y * aw + x;
            let v = accum[i];
            if v > p.accumulator_threshold
                && v > accum[i - 1]
                && v >= accum[i + 1]
                && v > accum[i - aw]
                && v >= accum[i + aw]
            {
                out.push(CenterCandidate {
                    center: Point2::new(x as f32 * p.dp, y as f32 * p.dp),
                    votes: v,
                });
            }
        }
    }

    out.sort_by(|a, b| b.votes.cmp(&a.votes));
    out
}

fn select_circles(
    centers: &[CenterCandidate],
    edges: &[EdgePoint],
    p: &HoughParams,
) -> Vec<ScoredCircle> {
    let min_dist_sq = p.min_dist * p.min_dist;
    let min_r = p.min_radius as f32;
    let max_r = p.max_radius as f32;
    let mut out: Vec<ScoredCircle> = Vec::new();
    let mut dists = Vec::new();

    for cand in centers {
        if p.max_circles.is_some_and(|m| out.len() >= m) {
            break;
        }
        let too_close = out
            .iter()
            .any(|s| (s.circle.center - cand.center).norm_squared() < min_dist_sq);
        if too_close {
            continue;
        }

        dists.clear();
        for e in edges {
            let d = ((e.x - cand.center.x).powi(2) + (e.y - cand.center.y).powi(2)).sqrt();
            if d >= min_r && d <= max_r {
                dists.push(d);
            }
        }

        let Some((radius, support)) = best_radius(&dists, p.min_radius, p.max_radius) else {
            continue;
        };
        if support <= p.accumulator_threshold {
            continue;
        }
        out.push(ScoredCircle {
            circle: DetectedCircle {
                center: cand.center,
                radius,
            },
            votes: cand.votes,
            support,
        });
    }
    out
}

/// Radius with the densest edge support, using a three-pixel window.
///
/// Support is normalized by radius so that large circles do not win merely
/// by collecting stray edges. Returns the mean distance inside the winning
/// window and the raw number of edge pixels in it.
fn best_radius(dists: &[f32], min_radius: u32, max_radius: u32) -> Option<(f32, u32)> {
    if dists.is_empty() {
        return None;
    }
    let n_bins = (max_radius - min_radius + 1) as usize;
    let mut counts = vec![0u32; n_bins];
    let mut sums = vec![0.0f32; n_bins];
    for &d in dists {
        let b = ((d - min_radius as f32).round() as usize).min(n_bins - 1);
        counts[b] += 1;
        sums[b] += d;
    }

    let mut best: Option<(usize, f32)> = None;
    for b in 0..n_bins {
        let lo = b.saturating_sub(1);
        let hi = (b + 1).min(n_bins - 1);
        let support: u32 = counts[lo..=hi].iter().sum();
        if support == 0 {
            continue;
        }
        let r = (min_radius as usize + b).max(1) as f32;
        let score = support as f32 / r;
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((b, score));
        }
    }

    let (b, _) = best?;
    let lo = b.saturating_sub(1);
    let hi = (b + 1).min(n_bins - 1);
    let support: u32 = counts[lo..=hi].iter().sum();
    let sum: f32 = sums[lo..=hi].iter().sum();
    Some((sum / support as f32, support))
}
