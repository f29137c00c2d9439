use serde::{
    Deserialize,
    Serialize
};

use crate::math::matherror::MathError;

/// Closed interval `[min, max]` a curve model was built over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    min: f64,
    max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Domain {
        Domain { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Intersects the requested bounds with this domain. `None` means
    /// "use the domain bound".
    pub fn clamp_bounds(&self, lower: Option<f64>, upper: Option<f64>) -> (f64, f64) {
        let lower = lower.map_or(self.min, |v| v.max(self.min));
        let upper = upper.map_or(self.max, |v| v.min(self.max));
        (lower, upper)
    }
}

/// A twice-differentiable function y(x) describing a track.
///
/// Implementors provide evaluation and the first two derivatives; the
/// geometric quantities are derived here once for every model.
///
/// `Send + Sync` lets one model be shared by reference across concurrent runs.
pub trait Curve: Send + Sync {
    fn value(&self, x: f64) -> f64;

    fn derivative(&self, x: f64) -> f64;

    fn second_derivative(&self, x: f64) -> f64;

    fn domain(&self) -> Domain;

    /// Slope angle in radians, `atan(-y'(x))`. A track falling as x grows
    /// has a positive angle.
    fn slope_angle(&self, x: f64) -> f64 {
        (-self.derivative(x)).atan()
    }

    fn slope_angle_degrees(&self, x: f64) -> f64 {
        self.slope_angle(x).to_degrees()
    }

    /// Radius of the osculating circle, `(1 + y'²)^(3/2) / y''`. Carries the
    /// sign of the second derivative.
    fn radius_of_curvature(&self, x: f64) -> Result<f64, MathError> {
        let d2 = self.second_derivative(x);
        if d2 == 0.0 {
            return Err(MathError::CurvatureUndefined { x });
        }
        let d1 = self.derivative(x);
        Ok((1.0 + d1 * d1).powf(1.5) / d2)
    }
}

/// Models whose derivative is again a model of the same kind.
pub trait Differentiable: Curve + Sized {
    fn differentiate(&self) -> Self;

    fn differentiate_twice(&self) -> Self {
        self.differentiate().differentiate()
    }
}

/// Horner evaluation of a descending-degree coefficient slice at `t`.
pub(crate) fn horner(coefs: &[f64], t: f64) -> f64 {
    let mut iter = coefs.iter();
    let mut result = match iter.next() {
        Some(&c) => c,
        None => return 0.0,
    };
    for &c in iter {
        result = f64::mul_add(result, t, c);
    }
    result
}

/// Coefficient-wise derivative of a descending-degree polynomial. The
/// constant term drops out; a constant yields `[0.0]`.
pub(crate) fn derivative_coefs(coefs: &[f64]) -> Vec<f64> {
    if coefs.len() <= 1 {
        return vec![0.0];
    }
    let order = coefs.len() - 1;
    coefs[..order]
        .iter()
        .enumerate()
        .map(|(i, &c)| c * (order - i) as f64)
        .collect()
}
