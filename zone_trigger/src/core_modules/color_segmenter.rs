// THEORY:
// The `ColorSegmenter` is the per-frame perception layer. Given one frame it
// answers two questions: where are the cursor-colored blobs, and where are the
// zone-colored blobs? It is a stateless utility; every call looks at exactly
// one frame and forgets it afterwards.
//
// Algorithm steps:
// 1.  Convert the frame to HSV once.
// 2.  Threshold the cursor class (a union of hue bands, since red straddles the
//     hue wrap-around) and the zone class (a single near-white band) into two
//     binary masks.
// 3.  Denoise each mask with one open pass and one dilate pass.
// 4.  Extract the outer blobs of each mask and their bounding boxes.
// 5.  Drop boxes below the per-class minimum width/height.
// 6.  Reduce cursor boxes to their centers; keep zone boxes as rectangles.
//
// No ordering is promised among the returned points or rectangles.

use crate::config::{HsvRange, PipelineConfig};
use crate::core_modules::contour::BoundingBox;
use crate::core_modules::contour::contour_finder::find_external_boxes;
use crate::core_modules::frame::Frame;
use crate::core_modules::geometry::{DetectedPoint, DetectedRect};
use crate::core_modules::hsv::HsvImage;
use crate::core_modules::mask::denoise;
use crate::error::Result;

/// Everything the segmenter found in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detections {
    pub cursor_points: Vec<DetectedPoint>,
    pub zone_rects: Vec<DetectedRect>,
}

/// One marker class: the colors that select it and the smallest box it may occupy.
#[derive(Debug, Clone)]
struct ColorClass {
    ranges: Vec<HsvRange>,
    min_width: u32,
    min_height: u32,
}

impl ColorClass {
    fn boxes(&self, hsv: &HsvImage) -> impl Iterator<Item = DetectedRect> + '_ {
        let mask = denoise(&hsv.threshold_any(&self.ranges));
        find_external_boxes(&mask)
            .into_iter()
            .filter(|b| b.width >= self.min_width && b.height >= self.min_height)
            .map(to_rect)
    }
}

fn to_rect(b: BoundingBox) -> DetectedRect {
    DetectedRect::new(b.x as i32, b.y as i32, b.width as i32, b.height as i32)
}

pub struct ColorSegmenter {
    cursor: ColorClass,
    zone: ColorClass,
}

impl ColorSegmenter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            cursor: ColorClass {
                ranges: config.cursor_ranges.clone(),
                min_width: config.min_cursor_width,
                min_height: config.min_cursor_height,
            },
            zone: ColorClass {
                ranges: vec![config.zone_range],
                min_width: config.min_zone_width,
                min_height: config.min_zone_height,
            },
        }
    }

    /// Segments one frame. Fails only when the frame is not packed RGB.
    pub fn segment(&self, frame: &Frame) -> Result<Detections> {
        let rgb = frame.as_rgb()?;
        let hsv = HsvImage::from_rgb(&rgb);

        let cursor_points = self.cursor.boxes(&hsv).map(|rect| rect.center()).collect();
        let zone_rects = self.zone.boxes(&hsv).collect();

        Ok(Detections {
            cursor_points,
            zone_rects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriggerError;
    use image::{Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const ZONE_GRAY: Rgb<u8> = Rgb([165, 165, 165]);

    fn paint(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        for yy in y..y + h {
            for xx in x..x + w {
                image.put_pixel(xx, yy, color);
            }
        }
    }

    fn segment(image: RgbImage) -> Detections {
        let segmenter = ColorSegmenter::new(&PipelineConfig::default());
        segmenter.segment(&Frame::from_rgb_image(image)).unwrap()
    }

    #[test]
    fn finds_cursor_and_zone() {
        let mut image = RgbImage::new(640, 360);
        paint(&mut image, 100, 100, 20, 20, ZONE_GRAY);
        paint(&mut image, 300, 200, 6, 6, RED);

        let detections = segment(image);
        // Both blobs come back one pixel larger on every side after the dilate pass.
        assert_eq!(detections.zone_rects, vec![DetectedRect::new(99, 99, 22, 22)]);
        assert_eq!(detections.cursor_points, vec![DetectedPoint::new(303, 203)]);
    }

    #[test]
    fn dark_magenta_red_counts_as_cursor() {
        let mut image = RgbImage::new(64, 64);
        paint(&mut image, 20, 20, 8, 8, Rgb([200, 0, 30]));
        let detections = segment(image);
        assert_eq!(detections.cursor_points.len(), 1);
        assert!(detections.zone_rects.is_empty());
    }

    #[test]
    fn speckle_noise_is_ignored() {
        let mut image = RgbImage::new(64, 64);
        for i in 0..10 {
            image.put_pixel(3 + i * 6, 10, RED);
            image.put_pixel(3 + i * 6, 40, ZONE_GRAY);
        }
        let detections = segment(image);
        assert_eq!(detections, Detections::default());
    }

    #[test]
    fn small_zones_are_discarded() {
        let mut image = RgbImage::new(64, 64);
        // 4x4 becomes 6x6 after dilation, still below the 8x8 zone minimum.
        paint(&mut image, 10, 10, 4, 4, ZONE_GRAY);
        // The same size is plenty for a cursor.
        paint(&mut image, 40, 40, 4, 4, RED);

        let detections = segment(image);
        assert!(detections.zone_rects.is_empty());
        assert_eq!(detections.cursor_points, vec![DetectedPoint::new(42, 42)]);
    }

    #[test]
    fn bright_white_is_not_a_zone() {
        let mut image = RgbImage::new(64, 64);
        paint(&mut image, 10, 10, 20, 20, Rgb([250, 250, 250]));
        assert!(segment(image).zone_rects.is_empty());
    }

    #[test]
    fn multiple_zones_are_all_reported() {
        let mut image = RgbImage::new(200, 100);
        paint(&mut image, 10, 10, 20, 20, ZONE_GRAY);
        paint(&mut image, 100, 50, 30, 12, ZONE_GRAY);

        let mut zones = segment(image).zone_rects;
        zones.sort_by_key(|r| r.x);
        assert_eq!(
            zones,
            vec![DetectedRect::new(9, 9, 22, 22), DetectedRect::new(99, 49, 32, 14)]
        );
    }

    #[test]
    fn wrong_channel_layout_fails_fast() {
        let segmenter = ColorSegmenter::new(&PipelineConfig::default());
        let frame = Frame::from_raw(8, 8, 4, vec![0; 8 * 8 * 4]);
        let err = segmenter.segment(&frame).unwrap_err();
        assert!(matches!(err, TriggerError::UnexpectedLayout { .. }));
    }
}
