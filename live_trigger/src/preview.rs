// The preview window: a private copy of each processed frame with the
// detections drawn on top. Drawing never touches the frame the engine holds.
//
// Colors: cursor circles red, raw zone boxes white, newest stable zones green.

use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Point, Rect, Scalar},
    highgui, imgproc,
    prelude::*,
};
use tracing::warn;
use zone_trigger::core_modules::action_trigger::{ActionState, TriggerOutcome};
use zone_trigger::core_modules::frame::Frame;
use zone_trigger::core_modules::interfaces::TickObserver;
use zone_trigger::pipeline::{DetectedRect, FrameAnalysis};

const WINDOW: &str = "zone trigger";

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn to_cv(rect: &DetectedRect) -> Rect {
    Rect::new(rect.x, rect.y, rect.width, rect.height)
}

pub struct PreviewWindow {
    cursor_radius: i32,
    rgb: Mat,
    canvas: Mat,
}

impl PreviewWindow {
    pub fn open(cursor_radius: i32) -> Result<Self> {
        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE).context("failed to open preview window")?;
        Ok(Self {
            cursor_radius,
            rgb: Mat::default(),
            canvas: Mat::default(),
        })
    }

    fn render(
        &mut self,
        frame: &Frame,
        analysis: &FrameAnalysis,
        state: &ActionState,
        outcome: TriggerOutcome,
    ) -> opencv::Result<()> {
        // --- 1. Copy the frame into a BGR canvas ---
        self.rgb = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            core::CV_8UC3,
            Scalar::all(0.0),
        )?;
        self.rgb.data_bytes_mut()?.copy_from_slice(frame.data());
        imgproc::cvt_color(&self.rgb, &mut self.canvas, imgproc::COLOR_RGB2BGR, 0)?;

        // --- 2. Detections ---
        for zone in &analysis.detections.zone_rects {
            imgproc::rectangle(&mut self.canvas, to_cv(zone), white(), 1, imgproc::LINE_8, 0)?;
        }
        for zone in &analysis.stability.newest_stable {
            imgproc::rectangle(&mut self.canvas, to_cv(zone), green(), 2, imgproc::LINE_8, 0)?;
        }
        for cursor in &analysis.detections.cursor_points {
            let center = Point::new(cursor.x, cursor.y);
            imgproc::circle(&mut self.canvas, center, self.cursor_radius, red(), 2, imgproc::LINE_8, 0)?;
        }

        // --- 3. Status ---
        if outcome == TriggerOutcome::Fired {
            imgproc::put_text(
                &mut self.canvas,
                "PRESS",
                Point::new(10, 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                1.0,
                red(),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }
        let indicator = if state.enabled { "+" } else { "-" };
        imgproc::put_text(
            &mut self.canvas,
            indicator,
            Point::new(self.canvas.cols() - 24, 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            1.0,
            if state.enabled { green() } else { white() },
            2,
            imgproc::LINE_8,
            false,
        )?;

        highgui::imshow(WINDOW, &self.canvas)?;
        highgui::wait_key(1)?;
        Ok(())
    }
}

impl TickObserver for PreviewWindow {
    fn on_tick(&mut self, frame: &Frame, analysis: &FrameAnalysis, state: &ActionState, outcome: TriggerOutcome) {
        if let Err(err) = self.render(frame, analysis, state, outcome) {
            warn!(%err, "preview render failed");
        }
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(WINDOW);
    }
}
