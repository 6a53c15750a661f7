#![allow(dead_code)]

use std::path::{Path, PathBuf};

use coin_counter::CoinCounterConfig;
use image::{Rgb, RgbImage};

/// Three bright discs of radius 30, 45 and 60 on a dark background.
pub const DISCS: [(f32, f32, f32); 3] = [
    (80.0, 100.0, 30.0),
    (220.0, 100.0, 45.0),
    (380.0, 100.0, 60.0),
];

pub fn coins_image() -> RgbImage {
    RgbImage::from_fn(460, 200, |x, y| {
        let inside = DISCS.iter().any(|&(cx, cy, r)| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            dx * dx + dy * dy <= r * r
        });
        if inside {
            Rgb([230, 220, 200])
        } else {
            Rgb([40, 40, 40])
        }
    })
}

pub fn write_coins_png(dir: &Path) -> PathBuf {
    let path = dir.join("coins.png");
    coins_image().save(&path).expect("write test image");
    path
}

/// Detector settings scaled down to the synthetic image.
pub fn small_image_config(image: &Path) -> CoinCounterConfig {
    let mut cfg = CoinCounterConfig {
        image_path: Some(image.to_string_lossy().into_owned()),
        ..CoinCounterConfig::default()
    };
    cfg.blur.kernel_size = 9;
    cfg.hough.min_dist = 80.0;
    cfg.hough.accumulator_threshold = 20;
    cfg.hough.min_radius = 20;
    cfg.hough.max_radius = 75;
    cfg
}
