// THEORY:
// The `IntersectionEngine` is the decision point between perception and action.
// Each cursor center is treated as a circle of a fixed radius; a "hit" is any
// cursor circle touching any stable zone. Which pair matched is irrelevant
// downstream, so the search stops at the first match.

use crate::core_modules::geometry::{DetectedPoint, DetectedRect, circle_intersects_rect};

pub struct IntersectionEngine {
    radius: i32,
}

impl IntersectionEngine {
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// True as soon as one cursor circle touches one zone.
    pub fn hit(&self, cursors: &[DetectedPoint], zones: &[DetectedRect]) -> bool {
        zones.iter().any(|zone| {
            cursors
                .iter()
                .any(|&center| circle_intersects_rect(center, self.radius, zone))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cursor_or_no_zone_is_no_hit() {
        let engine = IntersectionEngine::new(8);
        let zone = DetectedRect::new(100, 100, 20, 20);
        assert!(!engine.hit(&[], &[zone]));
        assert!(!engine.hit(&[DetectedPoint::new(110, 110)], &[]));
    }

    #[test]
    fn any_pair_is_enough() {
        let engine = IntersectionEngine::new(8);
        let zones = [DetectedRect::new(0, 0, 10, 10), DetectedRect::new(200, 200, 20, 20)];
        let cursors = [DetectedPoint::new(100, 100), DetectedPoint::new(225, 210)];
        assert!(engine.hit(&cursors, &zones));
    }

    #[test]
    fn cursor_just_outside_radius_misses() {
        let engine = IntersectionEngine::new(8);
        let zones = [DetectedRect::new(100, 100, 20, 20)];
        assert!(engine.hit(&[DetectedPoint::new(128, 110)], &zones));
        assert!(!engine.hit(&[DetectedPoint::new(129, 110)], &zones));
        assert!(!engine.hit(&[DetectedPoint::new(91, 91)], &zones));
    }
}
