use std::sync::atomic::{
    AtomicBool,
    Ordering
};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{
    Deserialize,
    Serialize
};
use tracing::{
    debug,
    info,
    warn
};

use crate::math::curve::curve::Curve;
use crate::math::curve::curvemodel::CurveModel;
use crate::math::nodeselection::uniform_indices;
use crate::physics::physicalparameters::PhysicalParameters;
use crate::simulation::simulationerror::SimulationError;
use crate::simulation::traceresult::{
    energy_drift_percent,
    SeriesRecorder,
    Termination,
    TraceResult,
    TraceSample,
    TraceStatistics
};

// ─────────────────────────────────────────────
// Run control
// ─────────────────────────────────────────────

/// Shared stop flag, checked once per step in both passes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The calibration pass finished and counted this many steps.
    Calibrated { iterations: u64 },
    /// `recorded` of at most `capacity` samples have been stored.
    Recorded { recorded: usize, capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorState {
    Idle,
    Calibrating,
    Integrating,
    Done,
    Failed,
}

pub const DEFAULT_SIZE_LIMIT: usize = 10_000;
pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000_000;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// What a run records and how long it may take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorOptions {
    /// Maximum number of samples kept per series.
    pub size_limit: usize,
    /// Records normal and friction force; needs non-zero curvature.
    pub track_forces: bool,
    /// Records slope angle and radius of curvature; needs non-zero curvature.
    pub track_geometry: bool,
    pub max_iterations: u64,
    /// Recorded samples between two progress reports.
    pub progress_interval: usize,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            track_forces: false,
            track_geometry: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl IntegratorOptions {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.size_limit < 2 {
            return Err(SimulationError::invalid_parameter(format!(
                "size limit must be at least 2, got {}",
                self.size_limit
            )));
        }
        if self.progress_interval == 0 {
            return Err(SimulationError::invalid_parameter(
                "progress interval must be positive",
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Step recurrence
// ─────────────────────────────────────────────

/// State at the start of one Euler step.
#[derive(Debug, Clone, Copy)]
struct StepState {
    iteration: u64,
    x: f64,
    v: f64,
    a: f64,
    slope_angle: f64,
}

struct PassOutcome {
    iterations: u64,
    termination: Termination,
    initial_energy: f64,
    last_energy: f64,
}

/// Fixed-step Euler integration of a body rolling without slipping along a
/// track model.
///
/// A run goes `Idle → Calibrating → Integrating → Done`, or ends in `Failed`.
/// The calibration pass only counts steps so the integrating pass can pick
/// at most `size_limit` evenly spread steps to record.
pub struct MotionIntegrator {
    name: String,
    curve: Arc<CurveModel>,
    parameters: PhysicalParameters,
    options: IntegratorOptions,
    state: IntegratorState,
}

impl MotionIntegrator {
    pub fn new(curve: Arc<CurveModel>, parameters: PhysicalParameters, options: IntegratorOptions) -> MotionIntegrator {
        MotionIntegrator {
            name: "New trace".to_owned(),
            curve,
            parameters,
            options,
            state: IntegratorState::Idle,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> MotionIntegrator {
        self.name = name.into();
        self
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn curve(&self) -> &CurveModel {
        &self.curve
    }

    pub fn run(&mut self) -> Result<TraceResult, SimulationError> {
        self.run_with(&CancellationToken::new(), &mut |_| {})
    }

    pub fn run_with(
        &mut self,
        cancel: &CancellationToken,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<TraceResult, SimulationError> {
        let result = self.execute(cancel, on_progress);
        self.state = match result {
            Ok(_) => IntegratorState::Done,
            Err(_) => IntegratorState::Failed,
        };
        result
    }

    fn execute(
        &mut self,
        cancel: &CancellationToken,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<TraceResult, SimulationError> {
        let scheme = self.parameters.integration;
        if !scheme.is_supported() {
            warn!(trace = %self.name, scheme = %scheme, "integration scheme is not implemented");
            return Err(SimulationError::UnsupportedScheme(scheme));
        }
        self.parameters.validate()?;
        self.options.validate()?;
        let (lower, upper) = self.parameters.bounds(self.curve.domain())?;

        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            trace = %self.name,
            interpolation = %self.curve.scheme(),
            step = self.parameters.step,
            lower,
            upper,
            "starting trace"
        );

        self.state = IntegratorState::Calibrating;
        let calibration = self.step_through(lower, upper, cancel, |_| Ok(()))?;
        let iterations = calibration.iterations;
        debug!(trace = %self.name, iterations, termination = %calibration.termination, "calibration finished");
        on_progress(Progress::Calibrated { iterations });

        self.state = IntegratorState::Integrating;
        let targets = recording_targets(iterations, self.options.size_limit)?;
        let capacity = targets.len();
        let mut recorder = SeriesRecorder::new(capacity, self.options.track_forces, self.options.track_geometry);
        let mut cursor = 0;
        let progress_interval = self.options.progress_interval;
        let outcome = self.step_through(lower, upper, cancel, |step| {
            if targets.get(cursor) != Some(&step.iteration) {
                return Ok(());
            }
            cursor += 1;
            recorder.record(&self.sample(step)?);
            if recorder.recorded() % progress_interval == 0 {
                on_progress(Progress::Recorded { recorded: recorder.recorded(), capacity });
            }
            Ok(())
        })?;

        match outcome.termination {
            Termination::ReachedEnd => {}
            Termination::RolledBack => {
                warn!(trace = %self.name, iterations = outcome.iterations, "body rolled back past the lower bound");
            }
            Termination::IterationLimit => {
                warn!(trace = %self.name, limit = self.options.max_iterations, "stopped at the iteration limit");
            }
            Termination::Stalled => {
                warn!(trace = %self.name, "body is at rest on a flat section");
            }
        }

        let drift = energy_drift_percent(outcome.initial_energy, outcome.last_energy);
        let step = self.parameters.step;
        let statistics = TraceStatistics {
            interpolation: self.curve.scheme(),
            integration: scheme,
            iterations: outcome.iterations,
            recorded_samples: recorder.recorded(),
            step_size: step,
            sample_stride: sample_stride(outcome.iterations, self.options.size_limit),
            total_time: outcome.iterations as f64 * step,
            computation_time: clock.elapsed(),
            energy_drift_percent: drift,
            termination: outcome.termination,
            started_at,
        };
        info!(
            trace = %self.name,
            iterations = statistics.iterations,
            recorded = statistics.recorded_samples,
            drift_percent = drift,
            termination = %statistics.termination,
            "trace finished"
        );
        Ok(TraceResult::new(self.name.clone(), recorder.into_series(), statistics))
    }

    /// Runs the recurrence from `lower` until a termination condition holds,
    /// handing the state at the start of every step to `visit`.
    fn step_through<F>(
        &self,
        lower: f64,
        upper: f64,
        cancel: &CancellationToken,
        mut visit: F,
    ) -> Result<PassOutcome, SimulationError>
    where
        F: FnMut(&StepState) -> Result<(), SimulationError>,
    {
        let params = &self.parameters;
        let curve = self.curve.as_ref();
        let step = params.step;

        let mut x = lower;
        let mut v = params.initial_velocity;
        let initial_energy = params.kinetic_energy(v) + params.potential_energy(curve.value(x));
        let mut last_energy = initial_energy;
        let mut iteration: u64 = 0;

        let termination = loop {
            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            if !x.is_finite() || !v.is_finite() {
                return Err(SimulationError::NonFiniteState { iteration });
            }
            if x >= upper {
                break Termination::ReachedEnd;
            }
            if x < lower {
                break Termination::RolledBack;
            }
            if iteration >= self.options.max_iterations {
                break Termination::IterationLimit;
            }
            let slope_angle = curve.slope_angle(x);
            let a = params.acceleration(slope_angle);
            if v == 0.0 && a == 0.0 {
                break Termination::Stalled;
            }

            visit(&StepState { iteration, x, v, a, slope_angle })?;
            last_energy = params.kinetic_energy(v) + params.potential_energy(curve.value(x));

            v += a * step;
            x += v * slope_angle.cos() * step;
            iteration += 1;
        };

        Ok(PassOutcome { iterations: iteration, termination, initial_energy, last_energy })
    }

    fn sample(&self, step: &StepState) -> Result<TraceSample, SimulationError> {
        let params = &self.parameters;
        let y = self.curve.value(step.x);
        let mut sample = TraceSample {
            acceleration: step.a,
            velocity: step.v,
            x: step.x,
            y,
            time: step.iteration as f64 * params.step,
            kinetic_energy: params.kinetic_energy(step.v),
            potential_energy: params.potential_energy(y),
            forces: None,
            geometry: None,
        };
        if self.options.track_forces || self.options.track_geometry {
            let radius = self.curve.radius_of_curvature(step.x)?;
            if self.options.track_forces {
                sample.forces = Some((
                    params.normal_force(step.slope_angle, step.v, radius),
                    params.friction_force(step.slope_angle, step.a),
                ));
            }
            if self.options.track_geometry {
                sample.geometry = Some((step.slope_angle, radius));
            }
        }
        Ok(sample)
    }
}

/// Step indices to record: every step when there are at most `size_limit`,
/// otherwise `size_limit` evenly spread ones including the first and last.
fn recording_targets(iterations: u64, size_limit: usize) -> Result<Vec<u64>, SimulationError> {
    let steps = usize::try_from(iterations).map_err(|_| {
        SimulationError::invalid_parameter(format!("{} iterations exceed the addressable range", iterations))
    })?;
    Ok(uniform_indices(steps, size_limit).into_iter().map(|i| i as u64).collect())
}

/// Average distance between recorded steps, `(N - 1) / (size_limit - 1)`.
fn sample_stride(iterations: u64, size_limit: usize) -> f64 {
    if iterations <= 1 {
        return 0.0;
    }
    (iterations - 1) as f64 / (size_limit - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::curve::Domain;
    use crate::math::curve::interpolationscheme::InterpolationScheme;
    use crate::math::curve::nonparametriccurve::polynomial::Polynomial;
    use crate::physics::inertia::InertiaShape;
    use crate::simulation::integrationscheme::IntegrationScheme;
    use crate::simulation::traceresult::SeriesKey;

    fn polynomial_track(coefs: Vec<f64>, min: f64, max: f64) -> Arc<CurveModel> {
        Arc::new(CurveModel::Polynomial(Polynomial::new(coefs, Domain::new(min, max)).unwrap()))
    }

    /// y = 10 - x on [0, 10].
    fn incline() -> Arc<CurveModel> {
        polynomial_track(vec![-1.0, 10.0], 0.0, 10.0)
    }

    #[test]
    fn test_incline_reaches_end_with_consistent_series() {
        let params = PhysicalParameters { step: 0.001, ..Default::default() };
        let mut integrator = MotionIntegrator::new(incline(), params, IntegratorOptions::default()).with_name("incline");
        assert_eq!(integrator.state(), IntegratorState::Idle);
        let result = integrator.run().unwrap();
        assert_eq!(integrator.state(), IntegratorState::Done);

        let stats = result.statistics();
        assert_eq!(stats.termination, Termination::ReachedEnd);
        assert_eq!(stats.recorded_samples as u64, stats.iterations);
        assert!((stats.total_time - stats.iterations as f64 * 0.001).abs() < 1e-12);
        // closed form: 10√2 m along a 45° slope from rest
        let a = 9.81 * std::f64::consts::FRAC_1_SQRT_2;
        let expected = (2.0 * 10.0 * std::f64::consts::SQRT_2 / a).sqrt();
        assert!((stats.total_time - expected).abs() < 0.01, "{}", stats.total_time);

        for key in SeriesKey::CORE {
            assert_eq!(result.series(key).unwrap().len(), result.len(), "{}", key);
        }
        let accel = result.series(SeriesKey::Acceleration).unwrap();
        assert!(accel.iter().all(|&v| (v - a).abs() < 1e-12));
        let x = result.series(SeriesKey::PositionX).unwrap();
        assert!(x.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(result.name(), "incline");
    }

    #[test]
    fn test_size_limit_bounds_every_series() {
        let options = IntegratorOptions { size_limit: 50, track_geometry: false, ..Default::default() };
        let params = PhysicalParameters { step: 0.001, ..Default::default() };
        let result = MotionIntegrator::new(incline(), params, options).run().unwrap();
        let stats = result.statistics();
        assert!(stats.iterations > 50);
        assert_eq!(result.len(), 50);
        for key in result.keys() {
            assert_eq!(result.series(key).unwrap().len(), 50);
        }
        let time = result.series(SeriesKey::Time).unwrap();
        assert_eq!(time[0], 0.0);
        assert!((time[49] - (stats.iterations - 1) as f64 * 0.001).abs() < 1e-9);
        assert!((stats.sample_stride - (stats.iterations - 1) as f64 / 49.0).abs() < 1e-12);
    }

    #[test]
    fn test_energy_drift_shrinks_with_step() {
        let drifts: Vec<f64> = [0.01, 0.001, 0.0001]
            .iter()
            .map(|&step| {
                let params = PhysicalParameters { step, ..Default::default() };
                let result = MotionIntegrator::new(incline(), params, IntegratorOptions::default()).run().unwrap();
                result.statistics().energy_drift_percent
            })
            .collect();
        assert!(drifts.iter().all(|d| d.is_finite() && *d > 0.0), "{:?}", drifts);
        assert!(drifts[0] > drifts[1] && drifts[1] > drifts[2], "{:?}", drifts);
    }

    #[test]
    fn test_unsupported_scheme_fails_before_stepping() {
        for scheme in IntegrationScheme::ALL.into_iter().filter(|s| !s.is_supported()) {
            let params = PhysicalParameters { integration: scheme, ..Default::default() };
            let mut integrator = MotionIntegrator::new(incline(), params, IntegratorOptions::default());
            let mut events = Vec::new();
            let result = integrator.run_with(&CancellationToken::new(), &mut |p| events.push(p));
            assert!(matches!(result, Err(SimulationError::UnsupportedScheme(s)) if s == scheme));
            assert!(events.is_empty());
            assert_eq!(integrator.state(), IntegratorState::Failed);
        }
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let params = PhysicalParameters { mass: -1.0, ..Default::default() };
        let result = MotionIntegrator::new(incline(), params, IntegratorOptions::default()).run();
        assert!(matches!(result, Err(SimulationError::InvalidParameter(_))));

        let options = IntegratorOptions { size_limit: 1, ..Default::default() };
        let result = MotionIntegrator::new(incline(), PhysicalParameters::default(), options).run();
        assert!(matches!(result, Err(SimulationError::InvalidParameter(_))));
    }

    #[test]
    fn test_cancelled_run_fails() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut integrator = MotionIntegrator::new(incline(), PhysicalParameters::default(), IntegratorOptions::default());
        let result = integrator.run_with(&cancel, &mut |_| {});
        assert!(matches!(result, Err(SimulationError::Cancelled)));
        assert_eq!(integrator.state(), IntegratorState::Failed);
    }

    #[test]
    fn test_overflowing_state_fails() {
        let params = PhysicalParameters { gravity: 1e308, step: 10.0, ..Default::default() };
        let mut integrator = MotionIntegrator::new(incline(), params, IntegratorOptions::default());
        let result = integrator.run();
        assert!(matches!(result, Err(SimulationError::NonFiniteState { iteration: 1 })), "{:?}", result);
        assert_eq!(integrator.state(), IntegratorState::Failed);
    }

    #[test]
    fn test_progress_reports() {
        let options = IntegratorOptions { size_limit: 250, progress_interval: 100, ..Default::default() };
        let mut integrator = MotionIntegrator::new(incline(), PhysicalParameters::default(), options);
        let mut events = Vec::new();
        let result = integrator.run_with(&CancellationToken::new(), &mut |p| events.push(p)).unwrap();
        assert_eq!(events[0], Progress::Calibrated { iterations: result.statistics().iterations });
        assert_eq!(
            &events[1..],
            &[
                Progress::Recorded { recorded: 100, capacity: 250 },
                Progress::Recorded { recorded: 200, capacity: 250 },
            ]
        );
    }

    #[test]
    fn test_flat_track_at_rest_stalls() {
        let track = polynomial_track(vec![2.0], 0.0, 1.0);
        let result = MotionIntegrator::new(track, PhysicalParameters::default(), IntegratorOptions::default())
            .run()
            .unwrap();
        assert_eq!(result.statistics().termination, Termination::Stalled);
        assert_eq!(result.statistics().iterations, 0);
        assert!(result.is_empty());
        assert_eq!(result.statistics().energy_drift_percent, 0.0);
    }

    #[test]
    fn test_flat_track_with_initial_velocity_reaches_end() {
        let track = polynomial_track(vec![0.0], 0.0, 1.0);
        let params = PhysicalParameters { initial_velocity: 2.0, step: 0.125, ..Default::default() };
        let result = MotionIntegrator::new(track, params, IntegratorOptions::default()).run().unwrap();
        assert_eq!(result.statistics().termination, Termination::ReachedEnd);
        assert_eq!(result.statistics().iterations, 4);
        assert_eq!(result.series(SeriesKey::PositionX).unwrap(), &[0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_iteration_limit() {
        let options = IntegratorOptions { max_iterations: 10, ..Default::default() };
        let result = MotionIntegrator::new(incline(), PhysicalParameters::default(), options).run().unwrap();
        assert_eq!(result.statistics().termination, Termination::IterationLimit);
        assert_eq!(result.statistics().iterations, 10);
        assert_eq!(result.len(), 10);
    }

    #[test]
    fn test_uphill_start_rolls_back() {
        // y = x rises from the start
        let track = polynomial_track(vec![1.0, 0.0], 0.0, 1.0);
        let result = MotionIntegrator::new(track, PhysicalParameters::default(), IntegratorOptions::default())
            .run()
            .unwrap();
        assert_eq!(result.statistics().termination, Termination::RolledBack);
        assert_eq!(result.statistics().iterations, 1);
    }

    #[test]
    fn test_forces_and_geometry_on_a_valley() {
        // y = (x - 2)², curvature never vanishes
        let track = polynomial_track(vec![1.0, -4.0, 4.0], 0.0, 2.5);
        let options = IntegratorOptions { track_forces: true, track_geometry: true, size_limit: 500, ..Default::default() };
        let params = PhysicalParameters { inertia: InertiaShape::SphereSolid, ..Default::default() };
        let result = MotionIntegrator::new(track, params, options).run().unwrap();
        assert_eq!(result.statistics().termination, Termination::ReachedEnd);
        assert_eq!(result.keys().count(), 12);

        let normal = result.series(SeriesKey::NormalForce).unwrap();
        assert!((normal[0] - 9.81 / 17f64.sqrt()).abs() < 1e-9);
        let friction = result.series(SeriesKey::FrictionForce).unwrap();
        assert!(friction[0] > 0.0);
        let angle = result.series(SeriesKey::SlopeAngle).unwrap();
        assert!((angle[0] - 4f64.atan()).abs() < 1e-12);
        let radius = result.series(SeriesKey::RadiusOfCurvature).unwrap();
        assert!((radius[0] - 17f64.powf(1.5) / 2.0).abs() < 1e-9);
        assert!(result.keys().all(|k| result.series(k).unwrap().len() == result.len()));
    }

    #[test]
    fn test_zero_curvature_with_force_tracking_fails() {
        let options = IntegratorOptions { track_forces: true, ..Default::default() };
        let mut integrator = MotionIntegrator::new(incline(), PhysicalParameters::default(), options);
        let result = integrator.run();
        assert!(matches!(result, Err(SimulationError::CurvatureUndefined { x }) if x == 0.0));
        assert_eq!(integrator.state(), IntegratorState::Failed);
    }

    #[test]
    fn test_bounds_restrict_the_run() {
        let params = PhysicalParameters { min_x: Some(2.0), max_x: Some(3.0), step: 0.001, ..Default::default() };
        let result = MotionIntegrator::new(incline(), params, IntegratorOptions::default()).run().unwrap();
        let x = result.series(SeriesKey::PositionX).unwrap();
        assert_eq!(x[0], 2.0);
        assert!(x.iter().all(|&v| (2.0..3.0).contains(&v)));
        assert_eq!(result.statistics().interpolation, InterpolationScheme::Polynomial);
    }
}
