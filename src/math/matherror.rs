use thiserror::Error;

/// Errors raised while building or querying curve models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("radius of curvature undefined at x = {x} (second derivative is zero)")]
    CurvatureUndefined { x: f64 },
}

impl MathError {
    pub fn invalid_input(message: impl Into<String>) -> MathError {
        MathError::InvalidInput(message.into())
    }
}

/// Checks the preconditions shared by every interpolation mode: equal
/// lengths, at least two points, strictly increasing x.
pub fn validate_coordinates(x: &[f64], y: &[f64]) -> Result<(), MathError> {
    if x.len() != y.len() {
        return Err(MathError::invalid_input(format!(
            "arrays of x and y coordinates must be of equal length ({} != {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(MathError::invalid_input(
            "at least two points are required for interpolation",
        ));
    }
    // `!(a < b)` also rejects NaN
    if let Some(i) = x.windows(2).position(|w| !(w[0] < w[1])) {
        return Err(MathError::invalid_input(format!(
            "x coordinates must be strictly increasing (x[{}] = {}, x[{}] = {})",
            i,
            x[i],
            i + 1,
            x[i + 1]
        )));
    }
    Ok(())
}
