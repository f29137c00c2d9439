use serde::Serialize;

use crate::math::matherror::{
    validate_coordinates,
    MathError
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2D {
    x: f64,
    y: f64
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn slope(lhs_pt: &Point2D, rhs_pt: &Point2D) -> f64 {
        (rhs_pt.y - lhs_pt.y) / (rhs_pt.x - lhs_pt.x)
    }

    /// Zips coordinate arrays into points after checking the interpolation
    /// preconditions (equal length, at least two points, strictly increasing x).
    pub fn zip_validated(x: &[f64], y: &[f64]) -> Result<Vec<Point2D>, MathError> {
        validate_coordinates(x, y)?;
        Ok(x.iter()
            .zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect())
    }
}

/// Curves defined by a finite set of knots.
pub trait NonparametricCurve {
    fn points(&self) -> Vec<Point2D>;

    fn min_x(&self) -> f64;

    fn max_x(&self) -> f64;
}
