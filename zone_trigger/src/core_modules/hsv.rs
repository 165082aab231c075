// THEORY:
// The `hsv` module is the lowest layer of the segmentation stack. It converts RGB
// pixels into the compact 8-bit hue/saturation/value space used by the color
// thresholds: hue in half-degrees (0..=180), saturation and value in 0..=255.
// Thresholding in HSV keeps the chromatic angle apart from brightness, so a red
// cursor stays "red" under lighting changes that would move every RGB channel.
//
// Key architectural principles:
// 1.  **Threshold Compatibility**: The conversion reproduces the usual 8-bit
//     camera-pipeline convention (round-half-up, hue wrapped into 0..180), so
//     ranges tuned against other tools carry over unchanged.
// 2.  **Whole-Frame Conversion**: `HsvImage` converts a frame once per tick; each
//     color class then thresholds the same converted buffer into its own mask.

use crate::config::{HUE_MAX, HsvRange};
use image::{GrayImage, ImageBuffer, Luma, Rgb};

/// A single pixel in 8-bit HSV space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (ri, gi, bi) = (r as i32, g as i32, b as i32);
        let v = ri.max(gi).max(bi);
        let min = ri.min(gi).min(bi);
        let diff = v - min;

        let s = if v == 0 {
            0
        } else {
            round_half_up(diff as f32 * 255.0 / v as f32) as i32
        };

        let h = if diff == 0 {
            0
        } else {
            // 30 half-degrees per sextant unit (60 degrees / 2).
            let raw = if v == ri {
                30.0 * (gi - bi) as f32 / diff as f32
            } else if v == gi {
                60.0 + 30.0 * (bi - ri) as f32 / diff as f32
            } else {
                120.0 + 30.0 * (ri - gi) as f32 / diff as f32
            };
            let h = round_half_up(raw) as i32;
            if h < 0 { h + HUE_MAX as i32 } else { h }
        };

        Self {
            h: h.clamp(0, HUE_MAX as i32) as u8,
            s: s.clamp(0, 255) as u8,
            v: v as u8,
        }
    }

    /// Inclusive per-channel containment test.
    pub fn in_range(&self, range: &HsvRange) -> bool {
        let value = [self.h, self.s, self.v];
        value
            .iter()
            .zip(range.lower.iter().zip(range.upper.iter()))
            .all(|(c, (lo, hi))| c >= lo && c <= hi)
    }
}

fn round_half_up(x: f32) -> f32 {
    (x + 0.5).floor()
}

/// A whole frame converted to HSV.
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<Hsv>,
}

impl HsvImage {
    pub fn from_rgb<C>(rgb: &ImageBuffer<Rgb<u8>, C>) -> Self
    where
        C: std::ops::Deref<Target = [u8]>,
    {
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|Rgb([r, g, b])| Hsv::from_rgb(*r, *g, *b))
            .collect();
        Self { width, height, pixels }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Hsv {
        self.pixels[(y * self.width + x) as usize]
    }

    /// A binary mask (0 or 255) of pixels falling inside any of `ranges`.
    pub fn threshold_any(&self, ranges: &[HsvRange]) -> GrayImage {
        let mut mask = GrayImage::new(self.width, self.height);
        for (pixel, out) in self.pixels.iter().zip(mask.pixels_mut()) {
            if ranges.iter().any(|range| pixel.in_range(range)) {
                *out = Luma([255]);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn primary_colors() {
        assert_eq!(Hsv::from_rgb(255, 0, 0), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(Hsv::from_rgb(0, 255, 0), Hsv { h: 60, s: 255, v: 255 });
        assert_eq!(Hsv::from_rgb(0, 0, 255), Hsv { h: 120, s: 255, v: 255 });
    }

    #[test]
    fn grays_have_no_hue_or_saturation() {
        assert_eq!(Hsv::from_rgb(0, 0, 0), Hsv { h: 0, s: 0, v: 0 });
        assert_eq!(Hsv::from_rgb(165, 165, 165), Hsv { h: 0, s: 0, v: 165 });
        assert_eq!(Hsv::from_rgb(255, 255, 255), Hsv { h: 0, s: 0, v: 255 });
    }

    #[test]
    fn magenta_red_wraps_to_high_hue() {
        // Slightly blue-ish red lands at the top of the hue circle.
        let hsv = Hsv::from_rgb(255, 0, 40);
        assert!(hsv.h >= 170, "hue {} should wrap near 180", hsv.h);
        assert_eq!(hsv.s, 255);
    }

    #[test]
    fn range_test_is_inclusive() {
        let range = HsvRange::new([0, 0, 155], [180, 15, 175]);
        assert!(Hsv { h: 0, s: 15, v: 155 }.in_range(&range));
        assert!(Hsv { h: 180, s: 0, v: 175 }.in_range(&range));
        assert!(!Hsv { h: 0, s: 16, v: 160 }.in_range(&range));
        assert!(!Hsv { h: 0, s: 0, v: 176 }.in_range(&range));
    }

    #[test]
    fn threshold_any_unions_ranges() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([255, 0, 40]));
        rgb.put_pixel(2, 0, Rgb([0, 255, 0]));
        let hsv = HsvImage::from_rgb(&rgb);

        let ranges = [
            HsvRange::new([0, 120, 120], [10, 255, 255]),
            HsvRange::new([160, 120, 120], [180, 255, 255]),
        ];
        let mask = hsv.threshold_any(&ranges);
        assert_eq!(mask.get_pixel(0, 0).0[0], 255);
        assert_eq!(mask.get_pixel(1, 0).0[0], 255);
        assert_eq!(mask.get_pixel(2, 0).0[0], 0);
    }
}
