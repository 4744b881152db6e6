use crate::state_space::DiscreteStateSpace;
use crate::system::SecondOrderSystem;
use anyhow::Result;
use log::{debug, trace};
use nalgebra::Vector2;
use response_common::SimParams;

/// Unit step input level.
const STEP_INPUT: f64 = 1.0;

/// One sampled point of the step response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSample {
    pub time: f64,
    pub amplitude: f64,
}

/// `num` evenly spaced values over `[start, stop]`, both endpoints included.
/// The last value is exactly `stop`.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut grid: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            grid[num - 1] = stop;
            grid
        }
    }
}

/// Simulates the unit-step response of a second-order system on a uniform grid.
pub struct ResponseSimulation {
    /// Discretized model, one grid step per update.
    system: DiscreteStateSpace,
    /// Sample times, increasing.
    time_grid: Vec<f64>,
    /// Current state vector, starting from rest.
    state: Vector2<f64>,
    /// Index of the next grid point to record.
    current_sample: usize,
    recorded_samples: Vec<ResponseSample>,
}

impl ResponseSimulation {
    pub fn new(system: &SecondOrderSystem, params: &SimParams) -> Result<Self> {
        if params.num_samples < 2 {
            anyhow::bail!("At least two samples are required, got {}.", params.num_samples);
        }
        let time_grid = linspace(0.0, params.duration_s, params.num_samples);

        let discrete = system.state_space().discretize_zoh(params.dt)?;
        debug!("Discretized with dt = {:.6e} s: Ad = {:?}, Bd = {:?}", discrete.dt, discrete.ad, discrete.bd);

        Ok(Self {
            system: discrete,
            time_grid,
            state: Vector2::zeros(),
            current_sample: 0,
            recorded_samples: Vec::with_capacity(params.num_samples),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.current_sample >= self.time_grid.len()
    }

    /// Records the output at the current grid point, then advances the state
    /// across one grid interval.
    pub fn step(&mut self) -> Result<()> {
        if self.is_finished() {
            anyhow::bail!("Simulation already covered all {} samples.", self.time_grid.len());
        }

        let time = self.time_grid[self.current_sample];
        let amplitude = self.system.output(&self.state, STEP_INPUT);
        if !amplitude.is_finite() {
            anyhow::bail!("Non-finite response at t = {} s.", time);
        }
        self.recorded_samples.push(ResponseSample { time, amplitude });
        trace!("Sample [{}/{}] t = {:.4} y = {:.6}", self.current_sample + 1, self.time_grid.len(), time, amplitude);

        self.state = self.system.advance(&self.state, STEP_INPUT);
        self.current_sample += 1;
        Ok(())
    }

    /// Steps until every grid point has been recorded.
    pub fn run(&mut self) -> Result<()> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(())
    }

    pub fn into_samples(self) -> Vec<ResponseSample> {
        self.recorded_samples
    }
}

/// Full step response on the configured grid.
#[cfg(test)]
pub fn step_response(system: &SecondOrderSystem, params: &SimParams) -> Result<Vec<ResponseSample>> {
    let mut sim = ResponseSimulation::new(system, params)?;
    sim.run()?;
    Ok(sim.into_samples())
}
