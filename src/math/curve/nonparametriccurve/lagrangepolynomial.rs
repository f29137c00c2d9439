use crate::math::curve::curve::Domain;
use crate::math::curve::nonparametriccurve::polynomial::Polynomial;
use crate::math::matherror::{
    validate_coordinates,
    MathError
};

// ─────────────────────────────────────────────────────────────────────────────
// LagrangePolynomial - Newton Form
// ─────────────────────────────────────────────────────────────────────────────
//
//   L(x) = Σ f[x_0..x_i] · Π_{j<i} (x - x_j)
//
// The track model needs explicit power-basis coefficients, so the Newton form
// is expanded into the monomial basis. Global interpolation oscillates (Runge)
// for many equispaced nodes, so the caller reduces the samples to a few
// Chebyshev nodes first.

#[derive(Debug, Clone)]
pub struct LagrangePolynomial {
    x_data: Vec<f64>,
    y_data: Vec<f64>,
}

impl LagrangePolynomial {
    /// Unique degree-(n-1) polynomial through `n` nodes with strictly
    /// increasing x.
    pub fn new(x: &[f64], y: &[f64]) -> Result<LagrangePolynomial, MathError> {
        validate_coordinates(x, y)?;
        Ok(LagrangePolynomial {
            x_data: x.to_vec(),
            y_data: y.to_vec(),
        })
    }

    /// Newton divided differences, then expansion into the power basis.
    /// Returns ascending coefficients `[c_0, ..., c_{n-1}]`.
    fn ascending_coefficients(&self) -> Vec<f64> {
        let x_data = &self.x_data;
        let n = x_data.len();

        let mut f = self.y_data.clone();
        for j in 1..n {
            for i in (j..n).rev() {
                f[i] = (f[i] - f[i - 1]) / (x_data[i] - x_data[i - j]);
            }
        }
        // f[i] = f[x_0, ..., x_i]

        // Horner-like expansion from the highest Newton term down:
        //   p ← p·(x - x_i) + f[x_0..x_i]
        let mut monomial = vec![0.0; n];
        monomial[0] = f[n - 1];

        for i in (0..n - 1).rev() {
            for k in (1..n).rev() {
                monomial[k] = monomial[k - 1] - x_data[i] * monomial[k];
            }
            monomial[0] = f[i] - x_data[i] * monomial[0];
        }

        monomial
    }

    /// Power-basis coefficients in descending-degree order.
    pub fn coefficients(&self) -> Vec<f64> {
        let mut coefs = self.ascending_coefficients();
        coefs.reverse();
        coefs
    }

    /// Materializes the interpolant as a coefficient polynomial over `domain`.
    pub fn to_polynomial(&self, domain: Domain) -> Result<Polynomial, MathError> {
        Polynomial::new(self.coefficients(), domain)
    }
}
