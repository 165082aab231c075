// THEORY:
// The `contour` module is the spatial grouping step of the segmentation layer.
// It turns a cleaned binary mask into a list of axis-aligned bounding boxes, one
// per *outer* blob.
//
// Key architectural principles & algorithm steps:
// 1.  **Outside Flood**: Background pixels reachable from the image border
//     (4-connected) are marked as "outside". Background that cannot be reached
//     this way is a hole enclosed by some blob.
// 2.  **Region Growing**: Foreground pixels are grouped into 8-connected blobs
//     with an iterative flood fill. While a blob grows, its bounding box is
//     accumulated and we note whether it touches the border or an outside pixel.
// 3.  **External Only**: A blob that touches neither the border nor the outside
//     background sits inside another blob's hole. Only the outermost outline of
//     each shape is reported, so such nested blobs are skipped.
// 4.  **Stateless Utility**: `find_external_boxes` has no memory of previous
//     frames and makes no promise about the order of the boxes it returns.

use crate::core_modules::mask::is_set;
use image::GrayImage;

/// Inclusive pixel extent of one blob: `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub mod contour_finder {
    use super::*;

    const NEIGHBORS_4: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    const NEIGHBORS_8: [(i32, i32); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    /// Bounding boxes of every external 8-connected blob in `mask`.
    pub fn find_external_boxes(mask: &GrayImage) -> Vec<BoundingBox> {
        let (width, height) = mask.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        // --- 1. Outside Flood ---
        let outside = flood_outside(mask);

        // --- 2. Region Growing ---
        let mut visited = vec![false; (width * height) as usize];
        let mut boxes = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let index = (y * width + x) as usize;
                if visited[index] || !is_set(mask, x, y) {
                    continue;
                }
                let (bbox, external) = grow_blob(mask, &outside, &mut visited, x, y);

                // --- 3. External Only ---
                if external {
                    boxes.push(bbox);
                }
            }
        }

        boxes
    }

    fn neighbor(x: u32, y: u32, (dx, dy): (i32, i32), width: u32, height: u32) -> Option<(u32, u32)> {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx >= 0 && ny >= 0 && nx < width as i32 && ny < height as i32 {
            Some((nx as u32, ny as u32))
        } else {
            None
        }
    }

    /// Marks background pixels 4-connected to the image border.
    fn flood_outside(mask: &GrayImage) -> Vec<bool> {
        let (width, height) = mask.dimensions();
        let mut outside = vec![false; (width * height) as usize];
        let mut queue: Vec<(u32, u32)> = Vec::new();

        let seed = |x: u32, y: u32, outside: &mut [bool], queue: &mut Vec<(u32, u32)>| {
            let index = (y * width + x) as usize;
            if !outside[index] && !is_set(mask, x, y) {
                outside[index] = true;
                queue.push((x, y));
            }
        };
        for x in 0..width {
            seed(x, 0, &mut outside, &mut queue);
            seed(x, height - 1, &mut outside, &mut queue);
        }
        for y in 0..height {
            seed(0, y, &mut outside, &mut queue);
            seed(width - 1, y, &mut outside, &mut queue);
        }

        while let Some((x, y)) = queue.pop() {
            for offset in NEIGHBORS_4 {
                if let Some((nx, ny)) = neighbor(x, y, offset, width, height) {
                    let index = (ny * width + nx) as usize;
                    if !outside[index] && !is_set(mask, nx, ny) {
                        outside[index] = true;
                        queue.push((nx, ny));
                    }
                }
            }
        }
        outside
    }

    /// Grows one blob from `(x, y)`, returning its box and whether it is external.
    fn grow_blob(
        mask: &GrayImage,
        outside: &[bool],
        visited: &mut [bool],
        x: u32,
        y: u32,
    ) -> (BoundingBox, bool) {
        let (width, height) = mask.dimensions();
        let mut queue = vec![(x, y)];
        visited[(y * width + x) as usize] = true;

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
        let mut external = false;

        while let Some((cx, cy)) = queue.pop() {
            min_x = min_x.min(cx);
            min_y = min_y.min(cy);
            max_x = max_x.max(cx);
            max_y = max_y.max(cy);

            if cx == 0 || cy == 0 || cx == width - 1 || cy == height - 1 {
                external = true;
            }
            if !external {
                external = NEIGHBORS_4.iter().any(|&offset| {
                    neighbor(cx, cy, offset, width, height)
                        .is_some_and(|(nx, ny)| outside[(ny * width + nx) as usize])
                });
            }

            for offset in NEIGHBORS_8 {
                if let Some((nx, ny)) = neighbor(cx, cy, offset, width, height) {
                    let index = (ny * width + nx) as usize;
                    if !visited[index] && is_set(mask, nx, ny) {
                        visited[index] = true;
                        queue.push((nx, ny));
                    }
                }
            }
        }

        let bbox = BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        };
        (bbox, external)
    }
}
