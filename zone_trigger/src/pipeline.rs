// THEORY:
// The `pipeline` module is the top-level per-frame API of the engine. It chains
// the perception stack into a single call: one frame goes in, and a
// `FrameAnalysis` comes out saying what was seen, which zones are trusted, and
// whether a cursor is touching one of them.
//
// Stages:
// 1.  Segmentation: cursor centers and zone rectangles from color masks.
// 2.  Temporal stabilization: the zone rectangles join the history window and
//     the K-of-N vote picks the zones allowed to trigger.
// 3.  Intersection: cursor circles against the trigger zones.
//
// The pipeline knows nothing about time, toggles, or cooldowns. Deciding what
// to do with a hit belongs to the orchestrator and the action trigger.

use crate::config::PipelineConfig;
use crate::core_modules::color_segmenter::{ColorSegmenter, Detections};
use crate::core_modules::frame::Frame;
use crate::core_modules::intersection::IntersectionEngine;
use crate::core_modules::stabilizer::{StabilityVerdict, TemporalStabilizer};
use crate::error::Result;

// Re-export key data structures for the public API.
pub use crate::core_modules::geometry::{DetectedPoint, DetectedRect};

/// The result of running one frame through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameAnalysis {
    pub detections: Detections,
    pub stability: StabilityVerdict,
    /// Whether any cursor circle touches any trigger zone.
    pub hit: bool,
}

pub struct ZonePipeline {
    segmenter: ColorSegmenter,
    stabilizer: TemporalStabilizer,
    intersection: IntersectionEngine,
}

impl ZonePipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            segmenter: ColorSegmenter::new(config),
            stabilizer: TemporalStabilizer::new(
                config.history_length,
                config.stable_min_count,
                config.zone_match_tolerance,
                config.trigger_slot,
            ),
            intersection: IntersectionEngine::new(config.cursor_radius),
        }
    }

    /// Runs every stage on `frame`. A frame with an unexpected layout is
    /// rejected before it can touch the zone history.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameAnalysis> {
        // Stage 1: Segmentation
        let detections = self.segmenter.segment(frame)?;

        // Stage 2: Temporal Stabilization
        let stability = self.stabilizer.observe(detections.zone_rects.clone());

        // Stage 3: Intersection
        let hit = self.intersection.hit(&detections.cursor_points, &stability.trigger_zones);

        Ok(FrameAnalysis {
            detections,
            stability,
            hit,
        })
    }

    pub fn cursor_radius(&self) -> i32 {
        self.intersection.radius()
    }

    pub fn stabilizer(&self) -> &TemporalStabilizer {
        &self.stabilizer
    }
}
