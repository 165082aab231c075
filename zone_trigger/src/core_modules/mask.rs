// THEORY:
// The `mask` module cleans up the binary masks produced by color thresholding.
// Raw masks are speckled: compression artifacts and sensor noise light up single
// pixels, and real blobs are often split by a one-pixel crack. Two classic
// morphological passes with a 3x3 square structuring element fix both:
//
// 1.  **Open** (erode, then dilate): erosion deletes every foreground pixel that
//     has a background neighbor, wiping out isolated specks; the following
//     dilation restores the surviving blobs to their original extent.
// 2.  **Dilate**: one more growth step that slightly enlarges every blob and
//     reconnects fragments separated by thin gaps.
//
// Pixels outside the image never count as background during erosion nor as
// foreground during dilation, so a blob touching the frame edge is treated the
// same as one in the middle of the frame.

use image::{GrayImage, Luma};

pub const FOREGROUND: u8 = 255;

#[inline]
pub fn is_set(mask: &GrayImage, x: u32, y: u32) -> bool {
    mask.get_pixel(x, y).0[0] != 0
}

/// Applies a 3x3 square neighborhood operation. `all` selects erosion (every
/// in-bounds neighbor set) over dilation (any in-bounds neighbor set).
fn neighborhood_pass(mask: &GrayImage, all: bool) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(width - 1);

            let mut neighbors = (y0..=y1).flat_map(|ny| (x0..=x1).map(move |nx| (nx, ny)));
            let set = if all {
                neighbors.all(|(nx, ny)| is_set(mask, nx, ny))
            } else {
                neighbors.any(|(nx, ny)| is_set(mask, nx, ny))
            };
            if set {
                out.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }
    out
}

pub fn erode(mask: &GrayImage) -> GrayImage {
    neighborhood_pass(mask, true)
}

pub fn dilate(mask: &GrayImage) -> GrayImage {
    neighborhood_pass(mask, false)
}

pub fn open(mask: &GrayImage) -> GrayImage {
    dilate(&erode(mask))
}

/// One open pass followed by one dilate pass.
pub fn denoise(mask: &GrayImage) -> GrayImage {
    dilate(&open(mask))
}
