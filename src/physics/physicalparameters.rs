use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::curve::Domain;
use crate::physics::inertia::InertiaShape;
use crate::simulation::integrationscheme::IntegrationScheme;
use crate::simulation::simulationerror::SimulationError;

pub const STANDARD_GRAVITY: f64 = 9.81;

/// Physical set-up of one trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParameters {
    /// Mass of the rolling body (kg), must be positive.
    pub mass: f64,
    pub inertia: InertiaShape,
    /// Velocity along the track at the start (m/s).
    pub initial_velocity: f64,
    /// Lower x bound; `None` starts at the beginning of the track.
    pub min_x: Option<f64>,
    /// Upper x bound; `None` runs to the end of the track.
    pub max_x: Option<f64>,
    /// Fixed step size (s), must be positive.
    pub step: f64,
    pub integration: IntegrationScheme,
    pub gravity: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: InertiaShape::PointMass,
            initial_velocity: 0.0,
            min_x: None,
            max_x: None,
            step: 0.001,
            integration: IntegrationScheme::Euler,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl PhysicalParameters {
    pub fn inertia_factor(&self) -> f64 {
        self.inertia.coefficient()
    }

    /// Rejects values no run could start from. Bounds are checked separately
    /// against the curve domain in [`PhysicalParameters::bounds`].
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.mass > 0.0) || !self.mass.is_finite() {
            return Err(SimulationError::invalid_parameter(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }
        let c = self.inertia_factor();
        if !(c >= 0.0) || !c.is_finite() {
            return Err(SimulationError::invalid_parameter(format!(
                "inertia factor cannot be negative, got {}",
                c
            )));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(SimulationError::invalid_parameter(format!(
                "step size must be positive, got {}",
                self.step
            )));
        }
        if !self.gravity.is_finite() || !self.initial_velocity.is_finite() {
            return Err(SimulationError::invalid_parameter(
                "gravity and initial velocity must be finite",
            ));
        }
        if self.min_x.is_some_and(f64::is_nan) || self.max_x.is_some_and(f64::is_nan) {
            return Err(SimulationError::invalid_parameter("x bounds cannot be NaN"));
        }
        Ok(())
    }

    /// Requested x bounds clamped to `domain`; the interval must not be empty.
    pub fn bounds(&self, domain: Domain) -> Result<(f64, f64), SimulationError> {
        let (lower, upper) = domain.clamp_bounds(self.min_x, self.max_x);
        if !(lower < upper) {
            return Err(SimulationError::invalid_parameter(format!(
                "x bounds [{}, {}] do not overlap the track domain [{}, {}]",
                lower,
                upper,
                domain.min(),
                domain.max()
            )));
        }
        Ok((lower, upper))
    }

    /// Tangential acceleration of a body rolling without slipping:
    ///   a = g·sin α / (1 + I₀/mr²) = g·sin α / (1 + c)
    pub fn acceleration(&self, slope_angle: f64) -> f64 {
        self.gravity * slope_angle.sin() / (1.0 + self.inertia_factor())
    }

    /// Translational plus rotational kinetic energy, ½mv²(1 + c).
    pub fn kinetic_energy(&self, v: f64) -> f64 {
        0.5 * self.mass * v * v * (1.0 + self.inertia_factor())
    }

    pub fn potential_energy(&self, y: f64) -> f64 {
        self.mass * self.gravity * y
    }

    /// Normal force from the track: m·g·cos α + m·v²/R.
    pub fn normal_force(&self, slope_angle: f64, v: f64, radius_of_curvature: f64) -> f64 {
        self.mass * self.gravity * slope_angle.cos() + self.mass * v * v / radius_of_curvature
    }

    /// Static friction needed to keep the body rolling: m·(g·sin α - a).
    pub fn friction_force(&self, slope_angle: f64, acceleration: f64) -> f64 {
        self.mass * (self.gravity * slope_angle.sin() - acceleration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = PhysicalParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.step, 0.001);
        assert_eq!(params.integration, IntegrationScheme::Euler);
    }

    #[test]
    fn test_validation_failures() {
        let bad_mass = PhysicalParameters { mass: 0.0, ..Default::default() };
        assert!(matches!(bad_mass.validate(), Err(SimulationError::InvalidParameter(_))));

        let bad_inertia = PhysicalParameters { inertia: InertiaShape::Custom(-0.1), ..Default::default() };
        assert!(matches!(bad_inertia.validate(), Err(SimulationError::InvalidParameter(_))));

        let bad_step = PhysicalParameters { step: -1e-3, ..Default::default() };
        assert!(matches!(bad_step.validate(), Err(SimulationError::InvalidParameter(_))));

        let nan_mass = PhysicalParameters { mass: f64::NAN, ..Default::default() };
        assert!(nan_mass.validate().is_err());
    }

    #[test]
    fn test_bounds_clamped_to_domain() {
        let domain = Domain::new(0.0, 2.0);
        let params = PhysicalParameters { min_x: Some(-1.0), max_x: Some(1.5), ..Default::default() };
        assert_eq!(params.bounds(domain).unwrap(), (0.0, 1.5));

        let empty = PhysicalParameters { min_x: Some(1.5), max_x: Some(1.0), ..Default::default() };
        assert!(matches!(empty.bounds(domain), Err(SimulationError::InvalidParameter(_))));

        let outside = PhysicalParameters { min_x: Some(3.0), ..Default::default() };
        assert!(outside.bounds(domain).is_err());
    }

    #[test]
    fn test_rolling_sphere_dynamics() {
        let params = PhysicalParameters { mass: 2.0, inertia: InertiaShape::SphereSolid, ..Default::default() };
        let angle = std::f64::consts::FRAC_PI_6;
        let a = params.acceleration(angle);
        assert!((a - STANDARD_GRAVITY * 0.5 / 1.4).abs() < 1e-12);
        assert!((params.kinetic_energy(3.0) - 0.5 * 2.0 * 9.0 * 1.4).abs() < 1e-12);
        // friction supplies the torque for the rotational part
        let friction = params.friction_force(angle, a);
        assert!((friction - 2.0 * STANDARD_GRAVITY * 0.5 * (0.4 / 1.4)).abs() < 1e-12);
        assert_eq!(PhysicalParameters::default().friction_force(angle, PhysicalParameters::default().acceleration(angle)), 0.0);
    }
}
