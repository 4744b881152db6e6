//! Animation timeline: how far the curve is drawn and where the camera sits
//! at any moment of the video.

/// Pause before drawing starts.
pub const LEAD_IN_S: f64 = 0.5;
/// Time spent drawing the full curve.
pub const DRAW_DURATION_S: f64 = 6.0;
/// Pause at the peak.
pub const PEAK_HOLD_S: f64 = 0.2;
/// Pause after the curve is complete.
pub const TAIL_HOLD_S: f64 = 0.8;
/// Camera zoom while the peak is on screen.
pub const PEAK_ZOOM: f64 = 1.5;

/// View transform applied to the whole scene:
/// `screen = center + (x, y) + scale * canvas`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Camera {
    pub const IDENTITY: Camera = Camera { x: 0.0, y: 0.0, scale: 1.0 };

    fn lerp(self, to: Camera, t: f64) -> Camera {
        Camera {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Drawn fraction of the curve's arc length.
    pub progress: f64,
    pub camera: Camera,
}

pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    peak_fraction: f64,
    rise_s: f64,
    fall_s: f64,
    peak_camera: Camera,
}

impl Timeline {
    /// Builds the timeline from the exported peak metadata. Drawing up to
    /// the peak takes `peak_time_percentage` of the draw duration while the
    /// camera zooms towards it; the rest of the curve is drawn while the
    /// camera returns.
    pub fn new(peak_time_percentage: f64, peak_value: f64) -> Self {
        let peak_fraction = if peak_time_percentage.is_finite() {
            peak_time_percentage.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let rise_s = peak_fraction * DRAW_DURATION_S;
        let fall_s = DRAW_DURATION_S - rise_s;

        let peak_x = -300.0 + (peak_fraction * 10.0) * 60.0;
        let peak_y = -300.0 + (peak_value / 2.0) * 600.0;

        Timeline {
            peak_fraction,
            rise_s,
            fall_s,
            peak_camera: Camera { x: peak_x / 2.0, y: peak_y / 2.0, scale: PEAK_ZOOM },
        }
    }

    pub fn total_duration(&self) -> f64 {
        // rise_s + fall_s == DRAW_DURATION_S
        LEAD_IN_S + DRAW_DURATION_S + PEAK_HOLD_S + TAIL_HOLD_S
    }

    /// Number of frames needed to cover the timeline at `fps`, including t = 0.
    pub fn frame_count(&self, fps: u32) -> usize {
        (self.total_duration() * fps as f64).ceil() as usize + 1
    }

    pub fn state_at(&self, time_s: f64) -> FrameState {
        let mut t = time_s;
        if t < LEAD_IN_S {
            return FrameState { progress: 0.0, camera: Camera::IDENTITY };
        }
        t -= LEAD_IN_S;

        if t < self.rise_s {
            let f = t / self.rise_s;
            return FrameState {
                progress: self.peak_fraction * f,
                camera: Camera::IDENTITY.lerp(self.peak_camera, ease_in_out_quad(f)),
            };
        }
        t -= self.rise_s;

        if t < PEAK_HOLD_S {
            return FrameState { progress: self.peak_fraction, camera: self.peak_camera };
        }
        t -= PEAK_HOLD_S;

        if t < self.fall_s {
            let f = t / self.fall_s;
            return FrameState {
                progress: self.peak_fraction + (1.0 - self.peak_fraction) * f,
                camera: self.peak_camera.lerp(Camera::IDENTITY, ease_in_out_quad(f)),
            };
        }

        FrameState { progress: 1.0, camera: Camera::IDENTITY }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < EPS);
        assert!(ease_in_out_quad(0.25) < 0.25);
        assert!(ease_in_out_quad(0.75) > 0.75);
    }

    #[test]
    fn phases_for_reference_response() {
        let tl = Timeline::new(0.18138, 1.163);
        assert!((tl.total_duration() - 7.5).abs() < EPS);

        let start = tl.state_at(0.2);
        assert_eq!(start.progress, 0.0);
        assert_eq!(start.camera, Camera::IDENTITY);

        let rise = 0.18138 * DRAW_DURATION_S;
        let at_peak = tl.state_at(LEAD_IN_S + rise + PEAK_HOLD_S / 2.0);
        assert!((at_peak.progress - 0.18138).abs() < EPS);
        assert_eq!(at_peak.camera.scale, PEAK_ZOOM);
        assert!((at_peak.camera.x - (-300.0 + 1.8138 * 60.0) / 2.0).abs() < 1e-9);
        assert!((at_peak.camera.y - (-300.0 + 1.163 / 2.0 * 600.0) / 2.0).abs() < 1e-9);

        let mid_rise = tl.state_at(LEAD_IN_S + rise / 2.0);
        assert!((mid_rise.progress - 0.18138 / 2.0).abs() < EPS);
        assert!((mid_rise.camera.scale - 1.25).abs() < EPS);

        let end = tl.state_at(tl.total_duration());
        assert_eq!(end.progress, 1.0);
        assert_eq!(end.camera, Camera::IDENTITY);
    }

    #[test]
    fn progress_is_monotone() {
        let tl = Timeline::new(0.3, 1.4);
        let mut last = 0.0;
        for i in 0..tl.frame_count(60) {
            let p = tl.state_at(i as f64 / 60.0).progress;
            assert!(p >= last - EPS);
            last = p;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn no_overshoot_skips_rise_phase() {
        let tl = Timeline::new(0.0, 1.0);
        let s = tl.state_at(LEAD_IN_S);
        assert_eq!(s.progress, 0.0);
        assert_eq!(s.camera.scale, PEAK_ZOOM);
        assert!((tl.total_duration() - 7.5).abs() < EPS);
    }

    #[test]
    fn frame_count_covers_duration() {
        let tl = Timeline::new(0.18138, 1.163);
        assert_eq!(tl.frame_count(60), 451);
        assert_eq!(tl.frame_count(1), 9);
    }
}
