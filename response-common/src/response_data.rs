use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// File the engine writes and the visualizer reads by default.
pub const RESPONSE_FILE: &str = "response_points.json";

/// The exported step response, read by the animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// `[time_s, amplitude]` pairs in increasing time order.
    pub points: Vec<[f64; 2]>,
    /// Peak time as a fraction of the sampled window.
    pub peak_time_percentage: f64,
    /// Closed-form peak amplitude (1.0 when the system does not overshoot).
    pub peak_value: f64,
}

impl ResponseData {
    /// Writes compact JSON to `path`, replacing any existing file.
    /// Returns the number of bytes written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path_ref = path.as_ref();
        let json_string = serde_json::to_string(self)
            .context("Failed to serialize response data to JSON")?;
        let mut file = File::create(path_ref)
            .with_context(|| format!("Failed to create output file '{}'", path_ref.display()))?;
        file.write_all(json_string.as_bytes())
            .with_context(|| format!("Failed to write response data to '{}'", path_ref.display()))?;
        Ok(json_string.len())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .with_context(|| format!("Failed to open response file '{}'", path_ref.display()))?;
        let data: ResponseData = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse response JSON from '{}'", path_ref.display()))?;
        Ok(data)
    }

    /// Time of the last sample, or 0 when there are no points.
    pub fn end_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_the_animation_schema() {
        let data = ResponseData {
            points: vec![[0.0, 0.0], [0.5, 0.25]],
            peak_time_percentage: 0.25,
            peak_value: 1.5,
        };
        let value: serde_json::Value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["points"][1][0], 0.5);
        assert_eq!(value["points"][1][1], 0.25);
        assert_eq!(value["peak_time_percentage"], 0.25);
        assert_eq!(value["peak_value"], 1.5);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response_points.json");
        std::fs::write(&path, "x".repeat(10_000)).unwrap();

        let data = ResponseData { points: vec![[0.0, 0.0]], peak_time_percentage: 0.0, peak_value: 1.0 };
        let written = data.save(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);
        assert_eq!(ResponseData::load(&path).unwrap(), data);
        assert_eq!(data.end_time(), 0.0);
    }

    #[test]
    fn load_reports_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"points\": 3}").unwrap();
        assert!(ResponseData::load(&path).is_err());
        assert!(ResponseData::load(dir.path().join("missing.json")).is_err());
    }
}
