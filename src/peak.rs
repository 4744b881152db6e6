use crate::simulation::ResponseSample;
use crate::system::SecondOrderSystem;
use response_common::DURATION_S;
use std::f64::consts::PI;

/// Closed-form peak-response metrics of a second-order step response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMetrics {
    /// Time of the first overshoot in seconds; 0 when there is no overshoot.
    pub peak_time: f64,
    /// Amplitude at the first overshoot; 1 when there is no overshoot.
    pub peak_value: f64,
    /// `peak_time` as a fraction of the fixed 10 s window.
    pub peak_time_percentage: f64,
}

impl PeakMetrics {
    /// Evaluates the textbook peak formulas. Only underdamped systems
    /// (zeta < 1) overshoot; anything else gets peak_time = 0, peak_value = 1.
    pub fn closed_form(system: &SecondOrderSystem) -> Self {
        let wn = system.natural_frequency();
        let zeta = system.damping_ratio();

        let (peak_time, peak_value) = if zeta < 1.0 {
            let root = (1.0 - zeta * zeta).sqrt();
            (PI / (wn * root), 1.0 + (-PI * zeta / root).exp())
        } else {
            (0.0, 1.0)
        };

        PeakMetrics {
            peak_time,
            peak_value,
            peak_time_percentage: peak_time / DURATION_S,
        }
    }

    /// Overshoot above the final value, in percent.
    pub fn percent_overshoot(&self) -> f64 {
        (self.peak_value - 1.0) * 100.0
    }
}

/// Largest sample of a computed response (first one on ties).
/// Diagnostic only: the exported metrics come from [`PeakMetrics::closed_form`].
pub fn sampled_peak(samples: &[ResponseSample]) -> Option<ResponseSample> {
    samples.iter().copied().fold(None, |best, s| match best {
        Some(b) if b.amplitude >= s.amplitude => Some(b),
        _ => Some(s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::step_response;
    use response_common::ResponseConfig;

    fn system(wn: f64, zeta: f64) -> SecondOrderSystem {
        SecondOrderSystem::new(wn, zeta).unwrap()
    }

    #[test]
    fn reference_underdamped_values() {
        let m = PeakMetrics::closed_form(&system(2.0, 0.5));
        assert!((m.peak_time - 1.8138).abs() < 1e-3, "{}", m.peak_time);
        assert!((m.peak_value - 1.1630).abs() < 1e-3, "{}", m.peak_value);
        assert!((m.peak_time_percentage - 0.18138).abs() < 1e-4);
        assert!((m.percent_overshoot() - 16.30).abs() < 0.01);
    }

    #[test]
    fn no_overshoot_at_or_above_critical_damping() {
        for zeta in [1.0, 1.5, 10.0] {
            let m = PeakMetrics::closed_form(&system(2.0, zeta));
            assert_eq!(m.peak_time, 0.0);
            assert_eq!(m.peak_value, 1.0);
            assert_eq!(m.peak_time_percentage, 0.0);
        }
    }

    #[test]
    fn undamped_peaks_at_two() {
        let m = PeakMetrics::closed_form(&system(2.0, 0.0));
        assert_eq!(m.peak_value, 2.0);
        assert!((m.peak_time - PI / 2.0).abs() < 1e-15);
    }

    #[test]
    fn deterministic() {
        let a = PeakMetrics::closed_form(&system(2.0, 0.5));
        let b = PeakMetrics::closed_form(&system(2.0, 0.5));
        assert_eq!(a.peak_time.to_bits(), b.peak_time.to_bits());
        assert_eq!(a.peak_value.to_bits(), b.peak_value.to_bits());
    }

    #[test]
    fn closed_form_agrees_with_sampled_peak() {
        let sys = system(2.0, 0.5);
        let params = ResponseConfig::default().get_sim_params();
        let samples = step_response(&sys, &params).unwrap();
        let m = PeakMetrics::closed_form(&sys);

        let peak = sampled_peak(&samples).unwrap();
        assert!((peak.time - m.peak_time).abs() <= params.dt);
        assert!((peak.amplitude - m.peak_value).abs() < 1e-5);
    }

    #[test]
    fn sampled_peak_of_empty_is_none() {
        assert!(sampled_peak(&[]).is_none());
    }
}
