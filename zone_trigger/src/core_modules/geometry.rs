// THEORY:
// The `geometry` module defines the two "dumb" data containers that flow out of
// the segmentation layer, `DetectedPoint` and `DetectedRect`, together with the
// pure comparison functions that the higher layers build on. Nothing in this
// file holds state or touches a frame; every function takes only its operands
// (and a tolerance or radius) and returns a plain answer.
//
// Two relations matter downstream:
// 1.  **Similarity**: two rectangles are "the same zone" across frames when each
//     of their four fields differs by at most a fixed tolerance. The relation is
//     symmetric but deliberately not transitive; a chain of near matches does
//     not make its endpoints similar.
// 2.  **Circle/Rectangle Overlap**: a cursor is a circle around its center. It
//     touches a zone when the closest point of the rectangle to the center lies
//     within the radius. The closest point is found by clamping the center into
//     the rectangle on each axis independently.

/// The center of a cursor-colored blob in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectedPoint {
    pub x: i32,
    pub y: i32,
}

/// The axis-aligned bounding box of a zone-colored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectedRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DetectedPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl DetectedRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The center of the box, rounding toward the top-left like integer halving.
    pub fn center(&self) -> DetectedPoint {
        DetectedPoint::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// The point of this rectangle closest to `p`. The far edges are inclusive.
    pub fn nearest_point(&self, p: DetectedPoint) -> DetectedPoint {
        DetectedPoint::new(
            p.x.clamp(self.x, self.x + self.width),
            p.y.clamp(self.y, self.y + self.height),
        )
    }

    pub fn contains(&self, p: DetectedPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// True when every field of `a` and `b` differs by no more than `tolerance`.
pub fn similar(a: &DetectedRect, b: &DetectedRect, tolerance: i32) -> bool {
    (a.x - b.x).abs() <= tolerance
        && (a.y - b.y).abs() <= tolerance
        && (a.width - b.width).abs() <= tolerance
        && (a.height - b.height).abs() <= tolerance
}

pub fn squared_distance(a: DetectedPoint, b: DetectedPoint) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

/// True when the circle at `center` with `radius` touches or overlaps `rect`.
pub fn circle_intersects_rect(center: DetectedPoint, radius: i32, rect: &DetectedRect) -> bool {
    let nearest = rect.nearest_point(center);
    let r = radius as i64;
    squared_distance(center, nearest) <= r * r
}
