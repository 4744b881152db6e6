/// End of the sampled window in seconds. The animation's time axis spans the same range.
pub const DURATION_S: f64 = 10.0;
/// Grid points over `[0, DURATION_S]`, endpoints included.
pub const NUM_SAMPLES: usize = 5000;

/// Run parameters derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    // System
    pub natural_frequency: f64, // omega_n (rad/s)
    pub damping_ratio: f64,     // zeta

    // Time grid
    pub duration_s: f64,    // Grid end time, also the window for peak_time_percentage
    pub num_samples: usize, // Grid points, endpoints included
    pub dt: f64,            // Spacing between consecutive grid points
}
