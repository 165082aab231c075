// THEORY:
// A `Frame` is an immutable snapshot of one captured image plus its position in
// capture order. Once built it is never mutated: the pipeline reads it, and any
// annotation for display is drawn on a private copy held by the presentation
// layer. Frames travel between threads behind an `Arc`, so "owning a copy" is
// just holding a reference count.
//
// The pixel data is stored as a flat, packed buffer (row-major, one byte per
// channel), the same shape the capture layer produces. The expected layout is
// three channels in RGB order; anything else is reported as a layout error at
// the point the segmenter tries to view the frame as an RGB image.

use crate::error::{Result, TriggerError};
use image::{ImageBuffer, Rgb, RgbImage};

/// The number of interleaved channels the segmenter understands (R, G, B).
pub const RGB_CHANNELS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    seq: u64,
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a raw capture buffer. The layout is checked lazily by `as_rgb`.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        Self {
            seq: 0,
            width,
            height,
            channels,
            data,
        }
    }

    pub fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, RGB_CHANNELS, image.into_raw())
    }

    /// Position in capture order, stamped when the frame is published.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.seq = seq;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the buffer as an RGB image, failing fast on any layout mismatch.
    pub fn as_rgb(&self) -> Result<ImageBuffer<Rgb<u8>, &[u8]>> {
        let expected = self.width as usize * self.height as usize * RGB_CHANNELS as usize;
        if self.channels != RGB_CHANNELS || self.data.len() != expected {
            return Err(self.layout_error());
        }
        ImageBuffer::from_raw(self.width, self.height, self.data.as_slice()).ok_or_else(|| self.layout_error())
    }

    fn layout_error(&self) -> TriggerError {
        TriggerError::UnexpectedLayout {
            width: self.width,
            height: self.height,
            channels: self.channels,
            len: self.data.len(),
        }
    }
}
