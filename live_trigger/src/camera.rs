// An opencv `VideoCapture` behind the engine's `FrameGrabber` seam. Frames come
// off the device as BGR and are handed to the engine as packed RGB.

use anyhow::{Context, Result, bail};
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info};
use zone_trigger::core_modules::frame::{Frame, RGB_CHANNELS};
use zone_trigger::core_modules::frame_source::FrameGrabber;

pub struct CameraGrabber {
    capture: VideoCapture,
    bgr: Mat,
    rgb: Mat,
}

impl CameraGrabber {
    /// Opens camera `index` and asks for the given resolution. The device may
    /// pick something else; the engine works with whatever arrives.
    pub fn open(index: i32, width: u32, height: u32) -> Result<Self> {
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("failed to create capture for camera {index}"))?;
        if !capture.is_opened()? {
            bail!("camera {index} could not be opened");
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(width))?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        info!(
            camera = index,
            requested = %format!("{width}x{height}"),
            actual = %format!("{actual_width}x{actual_height}"),
            "camera opened"
        );

        Ok(Self {
            capture,
            bgr: Mat::default(),
            rgb: Mat::default(),
        })
    }

    fn read_rgb(&mut self) -> opencv::Result<Option<Frame>> {
        if !self.capture.read(&mut self.bgr)? || self.bgr.empty() {
            return Ok(None);
        }
        imgproc::cvt_color(&self.bgr, &mut self.rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let data = self.rgb.data_bytes()?.to_vec();
        Ok(Some(Frame::from_raw(
            self.rgb.cols() as u32,
            self.rgb.rows() as u32,
            RGB_CHANNELS,
            data,
        )))
    }
}

impl FrameGrabber for CameraGrabber {
    fn grab(&mut self) -> Option<Frame> {
        match self.read_rgb() {
            Ok(frame) => frame,
            Err(err) => {
                debug!(%err, "camera read failed");
                None
            }
        }
    }
}
