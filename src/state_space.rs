use anyhow::Result;
use nalgebra::{Matrix2, Matrix3, RowVector2, Vector2};

/// Continuous-time single-input single-output state-space model:
/// x' = A x + B u, y = C x + D u.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpace {
    pub a: Matrix2<f64>,
    pub b: Vector2<f64>,
    pub c: RowVector2<f64>,
    pub d: f64,
}

/// Zero-order-hold discretization of a [`StateSpace`] at a fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteStateSpace {
    pub ad: Matrix2<f64>,
    pub bd: Vector2<f64>,
    pub c: RowVector2<f64>,
    pub d: f64,
    pub dt: f64,
}

impl StateSpace {
    /// Discretizes with a zero-order hold on the input.
    ///
    /// Uses the block identity
    /// `exp([[A, B], [0, 0]] * dt) = [[Ad, Bd], [0, I]]`,
    /// which is exact for piecewise-constant inputs such as a unit step.
    pub fn discretize_zoh(&self, dt: f64) -> Result<DiscreteStateSpace> {
        if !dt.is_finite() || dt <= 0.0 {
            anyhow::bail!("Discretization step must be positive and finite, got {}.", dt);
        }

        let mut augmented = Matrix3::<f64>::zeros();
        augmented.fixed_view_mut::<2, 2>(0, 0).copy_from(&(self.a * dt));
        augmented.fixed_view_mut::<2, 1>(0, 2).copy_from(&(self.b * dt));
        let expm = augmented.exp();

        let ad: Matrix2<f64> = expm.fixed_view::<2, 2>(0, 0).into_owned();
        let bd: Vector2<f64> = expm.fixed_view::<2, 1>(0, 2).into_owned();
        if ad.iter().chain(bd.iter()).any(|v| !v.is_finite()) {
            anyhow::bail!("Matrix exponential produced non-finite values (dt = {}).", dt);
        }

        Ok(DiscreteStateSpace { ad, bd, c: self.c, d: self.d, dt })
    }
}

impl DiscreteStateSpace {
    /// State after one step with input `u` held constant over the interval.
    #[inline]
    pub fn advance(&self, x: &Vector2<f64>, u: f64) -> Vector2<f64> {
        self.ad * x + self.bd * u
    }

    #[inline]
    pub fn output(&self, x: &Vector2<f64>, u: f64) -> f64 {
        (self.c * x)[0] + self.d * u
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrator_discretizes_exactly() {
        // x' = u: Ad = 1, Bd = dt (embedded in a decoupled 2-state model)
        let ss = StateSpace {
            a: Matrix2::zeros(),
            b: Vector2::new(1.0, 0.0),
            c: RowVector2::new(1.0, 0.0),
            d: 0.0,
        };
        let dss = ss.discretize_zoh(0.25).unwrap();
        assert!((dss.ad - Matrix2::identity()).norm() < 1e-14);
        assert!((dss.bd[0] - 0.25).abs() < 1e-14);
        assert!(dss.bd[1].abs() < 1e-14);
    }

    #[test]
    fn first_order_decay_matches_exponential() {
        // x1' = -2 x1 + u; second state unused
        let ss = StateSpace {
            a: Matrix2::new(-2.0, 0.0, 0.0, 0.0),
            b: Vector2::new(1.0, 0.0),
            c: RowVector2::new(1.0, 0.0),
            d: 0.0,
        };
        let dt = 0.1;
        let dss = ss.discretize_zoh(dt).unwrap();
        let expected_ad = (-2.0f64 * dt).exp();
        let expected_bd = (1.0 - expected_ad) / 2.0;
        assert!((dss.ad[(0, 0)] - expected_ad).abs() < 1e-12);
        assert!((dss.bd[0] - expected_bd).abs() < 1e-12);

        let x = dss.advance(&Vector2::zeros(), 1.0);
        assert!((dss.output(&x, 1.0) - expected_bd).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_step() {
        let ss = StateSpace {
            a: Matrix2::zeros(),
            b: Vector2::zeros(),
            c: RowVector2::zeros(),
            d: 0.0,
        };
        assert!(ss.discretize_zoh(0.0).is_err());
        assert!(ss.discretize_zoh(f64::INFINITY).is_err());
    }
}
