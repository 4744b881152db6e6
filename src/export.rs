use crate::peak::PeakMetrics;
use crate::simulation::ResponseSample;
use response_common::ResponseData;
use std::io::{self, Write};

/// Packs samples and metrics into the record the animation consumes.
pub fn build_response_data(samples: &[ResponseSample], metrics: &PeakMetrics) -> ResponseData {
    ResponseData {
        points: samples.iter().map(|s| [s.time, s.amplitude]).collect(),
        peak_time_percentage: metrics.peak_time_percentage,
        peak_value: metrics.peak_value,
    }
}

/// Writes the human-readable peak summary (leading blank line, then two lines).
pub fn report_peak<W: Write>(metrics: &PeakMetrics, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "\nPeak occurs at {:.2}s ({:.1}% of animation)",
        metrics.peak_time,
        metrics.peak_time_percentage * 100.0
    )?;
    writeln!(out, "Peak value: {:.3}", metrics.peak_value)?;
    out.flush()
}
