//! Scene geometry for the response plot.
//!
//! Coordinates follow the animation canvas: a 1000x600 logical area with the
//! origin at its center and y growing downwards.

use anyhow::Result;

pub const SCENE_WIDTH: f64 = 1000.0;
pub const SCENE_HEIGHT: f64 = 600.0;
pub const PADDING: f64 = 60.0;

// Axis limits in data units
pub const X_MIN: f64 = 0.0;
pub const X_MAX: f64 = 10.0;
pub const Y_MIN: f64 = 0.0;
pub const Y_MAX: f64 = 2.0;

const X_OFFSET: f64 = -SCENE_WIDTH / 2.0;
const Y_OFFSET: f64 = -SCENE_HEIGHT / 2.0;

/// Converts a data point (time, amplitude) to canvas coordinates.
pub fn data_to_canvas(x: f64, y: f64) -> (f64, f64) {
    let cx = X_OFFSET + PADDING + (x - X_MIN) * (SCENE_WIDTH - 2.0 * PADDING) / (X_MAX - X_MIN);
    let cy = Y_OFFSET + SCENE_HEIGHT - PADDING - (y - Y_MIN) * (SCENE_HEIGHT - 2.0 * PADDING) / (Y_MAX - Y_MIN);
    (cx, cy)
}

/// Inverse of [`data_to_canvas`].
pub fn canvas_to_data(cx: f64, cy: f64) -> (f64, f64) {
    let x = X_MIN + (cx - X_OFFSET - PADDING) * (X_MAX - X_MIN) / (SCENE_WIDTH - 2.0 * PADDING);
    let y = Y_MIN + (SCENE_HEIGHT - PADDING - (cy - Y_OFFSET)) * (Y_MAX - Y_MIN) / (SCENE_HEIGHT - 2.0 * PADDING);
    (x, y)
}

/// The response curve in canvas coordinates, parameterized by arc length.
#[derive(Debug, Clone)]
pub struct CurvePath {
    points: Vec<(f64, f64)>,
    /// cumulative[i] = polyline length from points[0] to points[i]
    cumulative: Vec<f64>,
}

impl CurvePath {
    pub fn from_data(data_points: &[[f64; 2]]) -> Result<Self> {
        if data_points.is_empty() {
            anyhow::bail!("Response contains no points to draw.");
        }
        if let Some(bad) = data_points.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
            anyhow::bail!("Response contains a non-finite point: [{}, {}].", bad[0], bad[1]);
        }

        let points: Vec<(f64, f64)> = data_points.iter().map(|p| data_to_canvas(p[0], p[1])).collect();
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in points.windows(2) {
            total += (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1);
            cumulative.push(total);
        }
        Ok(Self { points, cumulative })
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Locates `fraction` of the arc length: (segment end index, point on the curve).
    fn locate(&self, fraction: f64) -> (usize, (f64, f64)) {
        let total = self.total_length();
        if total <= 0.0 || !(fraction > 0.0) {
            return (0, self.points[0]);
        }
        let target = fraction.min(1.0) * total;
        let idx = self.cumulative.partition_point(|&c| c < target).min(self.points.len() - 1);
        if idx == 0 {
            return (0, self.points[0]);
        }
        let seg_len = self.cumulative[idx] - self.cumulative[idx - 1];
        let (a, b) = (self.points[idx - 1], self.points[idx]);
        if seg_len <= 0.0 {
            return (idx, b);
        }
        let t = (target - self.cumulative[idx - 1]) / seg_len;
        (idx, (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t))
    }

    /// Point at `fraction` (0..=1) of the total arc length.
    pub fn point_at(&self, fraction: f64) -> (f64, f64) {
        self.locate(fraction).1
    }

    /// Polyline from the start of the curve to `fraction` of its arc length.
    pub fn prefix(&self, fraction: f64) -> Vec<(f64, f64)> {
        let (idx, end) = self.locate(fraction);
        let mut out: Vec<(f64, f64)> = self.points[..idx].to_vec();
        out.push(end);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn axis_corners_map_inside_padding() {
        assert!(close(data_to_canvas(X_MIN, Y_MIN), (-440.0, 240.0)));
        assert!(close(data_to_canvas(X_MAX, Y_MAX), (440.0, -240.0)));
    }

    #[test]
    fn canvas_mapping_round_trips() {
        let (cx, cy) = data_to_canvas(1.8138, 1.163);
        let (x, y) = canvas_to_data(cx, cy);
        assert!((x - 1.8138).abs() < 1e-12 && (y - 1.163).abs() < 1e-12);
    }

    #[test]
    fn arc_length_parameterization() {
        // Two equal-length segments along the time axis
        let path = CurvePath::from_data(&[[0.0, 0.0], [5.0, 0.0], [10.0, 0.0]]).unwrap();
        assert!((path.total_length() - 880.0).abs() < 1e-9);
        assert!(close(path.point_at(0.0), data_to_canvas(0.0, 0.0)));
        assert!(close(path.point_at(0.25), data_to_canvas(2.5, 0.0)));
        assert!(close(path.point_at(1.0), data_to_canvas(10.0, 0.0)));
        assert!(close(path.point_at(7.0), data_to_canvas(10.0, 0.0)));

        let prefix = path.prefix(0.75);
        assert_eq!(prefix.len(), 3);
        assert!(close(prefix[2], data_to_canvas(7.5, 0.0)));
        assert_eq!(path.prefix(0.0).len(), 1);
    }

    #[test]
    fn single_point_curve() {
        let path = CurvePath::from_data(&[[1.0, 1.0]]).unwrap();
        assert_eq!(path.total_length(), 0.0);
        assert!(close(path.point_at(0.5), data_to_canvas(1.0, 1.0)));
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(CurvePath::from_data(&[]).is_err());
        assert!(CurvePath::from_data(&[[0.0, f64::NAN]]).is_err());
    }
}
