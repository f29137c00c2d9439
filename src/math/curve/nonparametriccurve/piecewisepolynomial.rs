use std::fmt;

use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::curve::{
    derivative_coefs,
    horner,
    Curve,
    Differentiable,
    Domain
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::curve::nonparametriccurve::polynomial::format_coefficients;
use crate::math::matherror::MathError;

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────
//
// One spline piece stored in Horner order relative to its left breakpoint:
//   S_i(x) = coefs[0]·(x-x_i)^k + ... + coefs[k]
// The first and second derivative coefficients are kept next to it so the
// integrator never has to allocate while stepping.

#[derive(Debug, Clone)]
struct Subpolynomial {
    coefs: Vec<f64>,
    deriv_coefs: Vec<f64>,
    second_deriv_coefs: Vec<f64>,
    lhs_x: f64,
}

impl Subpolynomial {
    fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        let deriv_coefs = derivative_coefs(&coefs);
        let second_deriv_coefs = derivative_coefs(&deriv_coefs);
        Subpolynomial { coefs, deriv_coefs, second_deriv_coefs, lhs_x }
    }

    fn value(&self, x: f64) -> f64 {
        horner(&self.coefs, x - self.lhs_x)
    }

    fn derivative(&self, x: f64) -> f64 {
        horner(&self.deriv_coefs, x - self.lhs_x)
    }

    fn second_derivative(&self, x: f64) -> f64 {
        horner(&self.second_deriv_coefs, x - self.lhs_x)
    }

    fn differentiate(&self) -> Subpolynomial {
        Subpolynomial::new(self.deriv_coefs.clone(), self.lhs_x)
    }
}

// ─────────────────────────────────────────────
// Natural cubic spline
// ─────────────────────────────────────────────
//
// Solve the (n+1)×(n+1) system for the second derivatives (moments) m[0..=n].
// Interior rows come from C² continuity:
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1]
//     = 6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
// Natural boundary: m[0] = m[n] = 0.

fn build_interior_system(points: &[Point2D], h: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
    let n = h.len();
    let mut mat = DMatrix::<f64>::zeros(n + 1, n + 1);
    let mut rhs = DVector::<f64>::zeros(n + 1);

    for i in 1..n {
        mat[(i, i - 1)] = h[i - 1];
        mat[(i, i)]     = 2.0 * (h[i - 1] + h[i]);
        mat[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * (
            (points[i + 1].y() - points[i].y()) / h[i]
          - (points[i].y()     - points[i - 1].y()) / h[i - 1]
        );
    }
    (mat, rhs)
}

/// Per-interval coefficients from the moments, stored as [d, c, b, a]:
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
fn cubic_coefs_from_moments(points: &[Point2D], h: &[f64], m: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = (points[i + 1].y() - points[i].y()) / h[i]
                  - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let a = points[i].y();
            vec![d, c, b, a]
        })
        .collect()
}

fn generate_natural_cubic_coef_list(points: &[Point2D]) -> Result<Vec<Vec<f64>>, MathError> {
    let n = points.len() - 1;
    let h: Vec<f64> = (0..n).map(|i| points[i + 1].x() - points[i].x()).collect();

    let (mut mat, rhs) = build_interior_system(points, &h);
    mat[(0, 0)] = 1.0;
    mat[(n, n)] = 1.0;

    let m = mat
        .lu()
        .solve(&rhs)
        .ok_or_else(|| MathError::invalid_input("natural cubic spline system is singular"))?;
    Ok(cubic_coefs_from_moments(points, &h, m.as_slice()))
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PiecewisePolynomial {
    max_x: f64,
    subpolynomial_list: Vec<Subpolynomial>,
}

impl PiecewisePolynomial {
    /// Natural cubic spline through `points`, which must have strictly
    /// increasing x.
    pub fn natural_cubic(points: Vec<Point2D>) -> Result<PiecewisePolynomial, MathError> {
        if points.len() < 2 {
            return Err(MathError::invalid_input(
                "a spline needs at least two points",
            ));
        }
        if points.windows(2).any(|w| !(w[0].x() < w[1].x())) {
            return Err(MathError::invalid_input(
                "values in array of x coordinates must be strictly increasing",
            ));
        }

        let coef_list = generate_natural_cubic_coef_list(&points)?;
        let subpolynomial_list = coef_list
            .into_iter()
            .zip(points.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x()))
            .collect();

        Ok(PiecewisePolynomial {
            subpolynomial_list,
            max_x: points[points.len() - 1].x(),
        })
    }

    pub fn natural_cubic_from_xy(x: &[f64], y: &[f64]) -> Result<PiecewisePolynomial, MathError> {
        PiecewisePolynomial::natural_cubic(Point2D::zip_validated(x, y)?)
    }

    /// Breakpoints x_0 < x_1 < ... < x_n.
    pub fn breakpoints(&self) -> Vec<f64> {
        let mut knots: Vec<f64> = self.subpolynomial_list.iter().map(|s| s.lhs_x).collect();
        knots.push(self.max_x);
        knots
    }

    /// Coefficients of each piece in descending powers of (x - x_i).
    pub fn piece_coefficients(&self) -> Vec<&[f64]> {
        self.subpolynomial_list.iter().map(|s| s.coefs.as_slice()).collect()
    }

    pub fn pieces(&self) -> usize {
        self.subpolynomial_list.len()
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x)
                .saturating_sub(1)
        }
    }
}

// ─────────────────────────────────────────────
// Trait implementations
// ─────────────────────────────────────────────

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }

    fn second_derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].second_derivative(x)
    }

    fn domain(&self) -> Domain {
        Domain::new(self.min_x(), self.max_x)
    }
}

impl Differentiable for PiecewisePolynomial {
    fn differentiate(&self) -> PiecewisePolynomial {
        PiecewisePolynomial {
            max_x: self.max_x,
            subpolynomial_list: self
                .subpolynomial_list
                .iter()
                .map(Subpolynomial::differentiate)
                .collect(),
        }
    }
}

/// One line per piece: `[x_i, x_{i+1}]  <polynomial in (x - x_i)>`.
impl fmt::Display for PiecewisePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let knots = self.breakpoints();
        for (i, piece) in self.subpolynomial_list.iter().enumerate() {
            writeln!(
                f,
                "[{}, {}]  {}",
                knots[i],
                knots[i + 1],
                format_coefficients(&piece.coefs, true, true)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn sample_track() -> (Vec<f64>, Vec<f64>) {
        let x = vec![0.0, 0.4, 1.1, 1.5, 2.3, 3.0, 3.2];
        let y = vec![1.0, 0.7, 0.2, 0.15, 0.4, 0.1, -0.3];
        (x, y)
    }

    #[test]
    fn test_spline_passes_through_samples() {
        let (x, y) = sample_track();
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&x, &y).unwrap();
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            assert!((spline.value(xi) - yi).abs() < TOL, "x = {}", xi);
        }
    }

    #[test]
    fn test_spline_is_c2_at_interior_knots() {
        let (x, y) = sample_track();
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&x, &y).unwrap();
        for i in 1..x.len() - 1 {
            let left = &spline.subpolynomial_list[i - 1];
            let right = &spline.subpolynomial_list[i];
            assert!((left.value(x[i]) - right.value(x[i])).abs() < TOL);
            assert!((left.derivative(x[i]) - right.derivative(x[i])).abs() < 1e-8);
            assert!((left.second_derivative(x[i]) - right.second_derivative(x[i])).abs() < 1e-8);
        }
    }

    #[test]
    fn test_natural_boundary_conditions() {
        let (x, y) = sample_track();
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&x, &y).unwrap();
        assert!(spline.second_derivative(x[0]).abs() < TOL);
        assert!(spline.second_derivative(*x.last().unwrap()).abs() < 1e-8);
    }

    #[test]
    fn test_three_point_spline_moments() {
        // m1 = 6*((0-1) - (1-0)) / (2*(1+1)) = -3
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!((spline.second_derivative(1.0) + 3.0).abs() < TOL);
        assert!((spline.derivative(0.0) - 1.5).abs() < TOL);
        assert!(spline.derivative(1.0).abs() < TOL);
    }

    #[test]
    fn test_two_points_degenerate_to_line() {
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 2.0], &[1.0, 0.0]).unwrap();
        assert!((spline.value(1.0) - 0.5).abs() < TOL);
        assert!((spline.derivative(0.3) + 0.5).abs() < TOL);
        assert_eq!(spline.second_derivative(0.3), 0.0);
    }

    #[test]
    fn test_differentiate_matches_cached_derivatives() {
        let (x, y) = sample_track();
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&x, &y).unwrap();
        let d1 = spline.differentiate();
        let d2 = spline.differentiate_twice();
        for &xi in &[0.1, 0.75, 1.3, 2.0, 3.1] {
            assert!((d1.value(xi) - spline.derivative(xi)).abs() < TOL);
            assert!((d2.value(xi) - spline.second_derivative(xi)).abs() < TOL);
        }
        assert_eq!(d1.domain(), spline.domain());
        assert_eq!(d1.piece_coefficients()[0].len(), 3);
    }

    #[test]
    fn test_segment_lookup_uses_containing_piece() {
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(spline.find_segment(0.0), 0);
        assert_eq!(spline.find_segment(0.5), 0);
        assert_eq!(spline.find_segment(1.0), 1);
        assert_eq!(spline.find_segment(2.5), 2);
        assert_eq!(spline.find_segment(3.0), 2);
        assert_eq!(spline.find_segment(f64::NAN), 0);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 1.0], &[0.0]).is_err());
        assert!(PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 0.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(PiecewisePolynomial::natural_cubic(vec![Point2D::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_domain_and_points() {
        let (x, y) = sample_track();
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&x, &y).unwrap();
        assert_eq!(spline.domain(), Domain::new(0.0, 3.2));
        assert_eq!(spline.breakpoints(), x);
        assert_eq!(spline.points().len(), x.len());
        assert_eq!(spline.pieces(), x.len() - 1);
    }

    #[test]
    fn test_display_lists_every_piece() {
        let spline = PiecewisePolynomial::natural_cubic_from_xy(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        let text = spline.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("[0, 1]"));
    }
}
