// Frame plumbing
pub mod frame;
pub mod frame_slot;
pub mod frame_source;

// Perception
pub mod hsv;
pub mod mask;
pub mod contour;
pub mod geometry;
pub mod color_segmenter;
pub mod stabilizer;
pub mod intersection;

// Decision and timing
pub mod action_trigger;
pub mod pacer;

pub mod interfaces;
