use thiserror::Error;

use crate::math::matherror::MathError;
use crate::simulation::integrationscheme::IntegrationScheme;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("integration scheme not supported: {0}")]
    UnsupportedScheme(IntegrationScheme),
    #[error("radius of curvature undefined at x = {x} (second derivative is zero)")]
    CurvatureUndefined { x: f64 },
    #[error("state became non-finite at iteration {iteration}")]
    NonFiniteState { iteration: u64 },
    #[error("run was cancelled")]
    Cancelled,
    #[error("a run is already active for this trace")]
    AlreadyRunning,
    #[error("background worker stopped without delivering a result")]
    WorkerDisconnected,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub fn invalid_input(message: impl Into<String>) -> SimulationError {
        SimulationError::InvalidInput(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> SimulationError {
        SimulationError::InvalidParameter(message.into())
    }
}

impl From<MathError> for SimulationError {
    fn from(error: MathError) -> Self {
        match error {
            MathError::InvalidInput(message)  => SimulationError::InvalidInput(message),
            MathError::CurvatureUndefined { x } => SimulationError::CurvatureUndefined { x },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_errors_keep_their_kind() {
        let err: SimulationError = MathError::invalid_input("bad").into();
        assert!(matches!(err, SimulationError::InvalidInput(ref m) if m == "bad"));
        let err: SimulationError = MathError::CurvatureUndefined { x: 1.5 }.into();
        assert!(matches!(err, SimulationError::CurvatureUndefined { x } if x == 1.5));
    }

    #[test]
    fn test_messages() {
        let err = SimulationError::UnsupportedScheme(IntegrationScheme::RungeKutta);
        assert_eq!(err.to_string(), "integration scheme not supported: Runge-Kutta method");
        assert_eq!(
            SimulationError::invalid_parameter("mass must be positive").to_string(),
            "invalid parameter: mass must be positive"
        );
    }
}
