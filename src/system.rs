use crate::state_space::StateSpace;
use anyhow::Result;
use nalgebra::{Matrix2, RowVector2, Vector2};
use std::fmt;

/// Damping regime of a second-order system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DampingClass {
    Undamped,
    Underdamped,
    CriticallyDamped,
    Overdamped,
}

/// Continuous-time transfer function as polynomial coefficients in `s`,
/// highest power first.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub num: Vec<f64>,
    pub den: Vec<f64>,
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / ({})", format_poly(&self.num), format_poly(&self.den))
    }
}

fn format_poly(coeffs: &[f64]) -> String {
    let order = coeffs.len().saturating_sub(1);
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| match order - i {
            0 => format!("{}", c),
            1 => format!("{}s", c),
            p => format!("{}s^{}", c, p),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// H(s) = wn^2 / (s^2 + 2*zeta*wn*s + wn^2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderSystem {
    natural_frequency: f64,
    damping_ratio: f64,
}

impl SecondOrderSystem {
    pub fn new(natural_frequency: f64, damping_ratio: f64) -> Result<Self> {
        if !natural_frequency.is_finite() || natural_frequency <= 0.0 {
            anyhow::bail!("Natural frequency must be positive and finite, got {}.", natural_frequency);
        }
        if !damping_ratio.is_finite() || damping_ratio < 0.0 {
            anyhow::bail!("Damping ratio must be non-negative and finite, got {}.", damping_ratio);
        }
        Ok(Self { natural_frequency, damping_ratio })
    }

    pub fn natural_frequency(&self) -> f64 {
        self.natural_frequency
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn damping_class(&self) -> DampingClass {
        let zeta = self.damping_ratio;
        if zeta == 0.0 {
            DampingClass::Undamped
        } else if zeta < 1.0 {
            DampingClass::Underdamped
        } else if zeta == 1.0 {
            DampingClass::CriticallyDamped
        } else {
            DampingClass::Overdamped
        }
    }

    pub fn transfer_function(&self) -> TransferFunction {
        let wn = self.natural_frequency;
        let zeta = self.damping_ratio;
        TransferFunction {
            num: vec![wn * wn],
            den: vec![1.0, 2.0 * zeta * wn, wn * wn],
        }
    }

    /// Controllable canonical realization of the transfer function.
    pub fn state_space(&self) -> StateSpace {
        let wn = self.natural_frequency;
        let zeta = self.damping_ratio;
        let wn_sq = wn * wn;
        StateSpace {
            a: Matrix2::new(
                -2.0 * zeta * wn, -wn_sq,
                1.0, 0.0,
            ),
            b: Vector2::new(1.0, 0.0),
            c: RowVector2::new(0.0, wn_sq),
            d: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_function_coefficients() {
        let tf = SecondOrderSystem::new(2.0, 0.5).unwrap().transfer_function();
        assert_eq!(tf.num, vec![4.0]);
        assert_eq!(tf.den, vec![1.0, 2.0, 4.0]);
        assert_eq!(tf.to_string(), "4 / (1s^2 + 2s + 4)");
    }

    #[test]
    fn state_space_matches_canonical_form() {
        let ss = SecondOrderSystem::new(2.0, 0.5).unwrap().state_space();
        assert_eq!(ss.a, Matrix2::new(-2.0, -4.0, 1.0, 0.0));
        assert_eq!(ss.b, Vector2::new(1.0, 0.0));
        assert_eq!(ss.c, RowVector2::new(0.0, 4.0));
        assert_eq!(ss.d, 0.0);
        // Unit DC gain: -C A^-1 B
        let dc = -(ss.c * ss.a.try_inverse().unwrap() * ss.b)[0];
        assert!((dc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn classifies_damping() {
        let class = |z| SecondOrderSystem::new(1.0, z).unwrap().damping_class();
        assert_eq!(class(0.0), DampingClass::Undamped);
        assert_eq!(class(0.7), DampingClass::Underdamped);
        assert_eq!(class(1.0), DampingClass::CriticallyDamped);
        assert_eq!(class(3.0), DampingClass::Overdamped);
    }

    #[test]
    fn rejects_nonphysical_parameters() {
        assert!(SecondOrderSystem::new(0.0, 0.5).is_err());
        assert!(SecondOrderSystem::new(-1.0, 0.5).is_err());
        assert!(SecondOrderSystem::new(2.0, -0.5).is_err());
        assert!(SecondOrderSystem::new(f64::NAN, 0.5).is_err());
    }
}
