//! Color segmentation of camera frames.
//!
//! Thresholds RGB frames in HSV space to find the colored markers the
//! robots carry. Output is a binary mask per configured color band plus the
//! masked-out sub-image; anything fancier (contours, boxes) is downstream
//! of this crate.
//!
//! Hue uses the OpenCV 8-bit convention, 0-179, so existing hand-tuned
//! thresholds carry over unchanged.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::config::{ColorBand, HsvRange, VisionConfig};

/// Convert one RGB pixel to OpenCV-convention HSV (`h` 0-179, `s`/`v`
/// 0-255).
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let r = pixel[0] as f32 / 255.0;
    let g = pixel[1] as f32 / 255.0;
    let b = pixel[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = (hue_deg / 2.0).round().min(179.0) as u8;
    let s = if max == 0.0 {
        0
    } else {
        (delta / max * 255.0).round() as u8
    };
    let v = (max * 255.0).round() as u8;

    [h, s, v]
}

fn in_range(hsv: [u8; 3], range: &HsvRange) -> bool {
    (0..3).all(|i| range.lower[i] <= hsv[i] && hsv[i] <= range.upper[i])
}

/// A band's segmentation result: binary mask plus the masked sub-image.
pub struct Segment {
    pub name: String,
    pub mask: GrayImage,
    pub cutout: RgbImage,
}

/// Segments frames into per-color masks according to a set of HSV bands.
pub struct ColorSegmenter {
    bands: Vec<ColorBand>,
}

impl ColorSegmenter {
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            bands: config.bands.clone(),
        }
    }

    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    /// Binary mask for one band: 255 where the pixel falls inside any of
    /// the band's HSV ranges.
    pub fn mask(&self, image: &RgbImage, band: &ColorBand) -> GrayImage {
        let mut mask = GrayImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            let hsv = rgb_to_hsv(*pixel);
            let hit = band.ranges.iter().any(|r| in_range(hsv, r));
            mask.put_pixel(x, y, Luma([if hit { 255 } else { 0 }]));
        }
        mask
    }

    /// The original image with everything outside the mask blacked out.
    pub fn cutout(&self, image: &RgbImage, mask: &GrayImage) -> RgbImage {
        let mut out = RgbImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            if mask.get_pixel(x, y)[0] != 0 {
                out.put_pixel(x, y, *pixel);
            }
        }
        out
    }

    /// Segment every configured band.
    pub fn segment_all(&self, image: &RgbImage) -> Vec<Segment> {
        self.bands
            .iter()
            .map(|band| {
                let mask = self.mask(image, band);
                let cutout = self.cutout(image, &mask);
                Segment {
                    name: band.name.clone(),
                    mask,
                    cutout,
                }
            })
            .collect()
    }

    /// Union of all band masks.
    pub fn combined_mask(&self, image: &RgbImage) -> GrayImage {
        let mut combined = GrayImage::new(image.width(), image.height());
        for band in &self.bands {
            let mask = self.mask(image, band);
            for (c, m) in combined.pixels_mut().zip(mask.pixels()) {
                if m[0] != 0 {
                    *c = Luma([255]);
                }
            }
        }
        combined
    }
}
