use std::fmt;

use tracing::debug;

use crate::math::curve::curve::{
    Curve,
    Differentiable,
    Domain
};
use crate::math::curve::interpolationscheme::InterpolationScheme;
use crate::math::curve::nonparametriccurve::lagrangepolynomial::LagrangePolynomial;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;
use crate::math::curve::nonparametriccurve::polynomial::Polynomial;
use crate::math::matherror::{
    validate_coordinates,
    MathError
};
use crate::math::nodeselection::{
    chebyshev_indices,
    reduce_by_indices
};

/// Node count used when fitting a global polynomial.
pub const DEFAULT_POLYNOMIAL_NODES: usize = 10;

/// Track model built from samples. Never mutated after construction;
/// derivatives are new models.
#[derive(Debug, Clone)]
pub enum CurveModel {
    Spline(PiecewisePolynomial),
    Polynomial(Polynomial),
}

impl CurveModel {
    /// Builds the model selected by `scheme`. `polynomial_nodes` only
    /// matters for [`InterpolationScheme::Polynomial`].
    pub fn interpolate(
        x: &[f64],
        y: &[f64],
        scheme: InterpolationScheme,
        polynomial_nodes: usize,
    ) -> Result<CurveModel, MathError> {
        match scheme {
            InterpolationScheme::Spline => {
                spline_interpolation(x, y).map(CurveModel::Spline)
            }
            InterpolationScheme::Polynomial => {
                polynomial_interpolation(x, y, polynomial_nodes).map(CurveModel::Polynomial)
            }
        }
    }

    pub fn scheme(&self) -> InterpolationScheme {
        match self {
            CurveModel::Spline(_)     => InterpolationScheme::Spline,
            CurveModel::Polynomial(_) => InterpolationScheme::Polynomial,
        }
    }
}

/// Natural cubic spline through every sample.
pub fn spline_interpolation(x: &[f64], y: &[f64]) -> Result<PiecewisePolynomial, MathError> {
    let spline = PiecewisePolynomial::natural_cubic_from_xy(x, y)?;
    debug!(pieces = spline.pieces(), "built natural cubic spline");
    Ok(spline)
}

/// Reduces the samples to `nodes` Chebyshev-selected points and fits the
/// interpolating polynomial through them. The domain is the full sample
/// range, not the reduced one.
pub fn polynomial_interpolation(x: &[f64], y: &[f64], nodes: usize) -> Result<Polynomial, MathError> {
    validate_coordinates(x, y)?;
    if nodes < 2 {
        return Err(MathError::invalid_input(format!(
            "polynomial interpolation needs at least two nodes, got {}",
            nodes
        )));
    }

    let indices = chebyshev_indices(x, nodes);
    let x_reduced = reduce_by_indices(x, &indices)?;
    let y_reduced = reduce_by_indices(y, &indices)?;
    debug!(samples = x.len(), nodes = x_reduced.len(), "reduced samples to Chebyshev nodes");

    let domain = Domain::new(x[0], x[x.len() - 1]);
    LagrangePolynomial::new(&x_reduced, &y_reduced)?.to_polynomial(domain)
}

impl Curve for CurveModel {
    fn value(&self, x: f64) -> f64 {
        match self {
            CurveModel::Spline(s)     => s.value(x),
            CurveModel::Polynomial(p) => p.value(x),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            CurveModel::Spline(s)     => s.derivative(x),
            CurveModel::Polynomial(p) => p.derivative(x),
        }
    }

    fn second_derivative(&self, x: f64) -> f64 {
        match self {
            CurveModel::Spline(s)     => s.second_derivative(x),
            CurveModel::Polynomial(p) => p.second_derivative(x),
        }
    }

    fn domain(&self) -> Domain {
        match self {
            CurveModel::Spline(s)     => s.domain(),
            CurveModel::Polynomial(p) => p.domain(),
        }
    }
}

impl Differentiable for CurveModel {
    fn differentiate(&self) -> CurveModel {
        match self {
            CurveModel::Spline(s)     => CurveModel::Spline(s.differentiate()),
            CurveModel::Polynomial(p) => CurveModel::Polynomial(p.differentiate()),
        }
    }
}

impl fmt::Display for CurveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveModel::Spline(s)     => write!(f, "{}", s),
            CurveModel::Polynomial(p) => write!(f, "{}", p),
        }
    }
}
