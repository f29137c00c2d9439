use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{
    DateTime,
    Utc
};
use serde::Serialize;
use uuid::Uuid;

use crate::math::curve::interpolationscheme::InterpolationScheme;
use crate::math::round::round;
use crate::objectwithuuid::ObjectWithUUID;
use crate::simulation::integrationscheme::IntegrationScheme;
use crate::simulation::simulationerror::SimulationError;

// ─────────────────────────────────────────────
// Series vocabulary
// ─────────────────────────────────────────────

/// Names of the simulated series. Serialized under their display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SeriesKey {
    #[serde(rename = "Acceleration")]
    Acceleration,
    #[serde(rename = "Velocity")]
    Velocity,
    #[serde(rename = "Position (x)")]
    PositionX,
    #[serde(rename = "Position (y)")]
    PositionY,
    #[serde(rename = "Time (s)")]
    Time,
    #[serde(rename = "Total energy")]
    TotalEnergy,
    #[serde(rename = "Kinetic energy")]
    KineticEnergy,
    #[serde(rename = "Potential energy")]
    PotentialEnergy,
    #[serde(rename = "Normal force")]
    NormalForce,
    #[serde(rename = "Friction force")]
    FrictionForce,
    /// Stored in radians.
    #[serde(rename = "Slope angle (Rad/Deg)")]
    SlopeAngle,
    #[serde(rename = "Radius of Curvature")]
    RadiusOfCurvature,
}

impl SeriesKey {
    /// Series recorded by every run.
    pub const CORE: [SeriesKey; 8] = [
        SeriesKey::Acceleration,
        SeriesKey::Velocity,
        SeriesKey::PositionX,
        SeriesKey::PositionY,
        SeriesKey::Time,
        SeriesKey::TotalEnergy,
        SeriesKey::KineticEnergy,
        SeriesKey::PotentialEnergy,
    ];

    pub const FORCES: [SeriesKey; 2] = [SeriesKey::NormalForce, SeriesKey::FrictionForce];

    pub const GEOMETRY: [SeriesKey; 2] = [SeriesKey::SlopeAngle, SeriesKey::RadiusOfCurvature];

    pub fn label(&self) -> &'static str {
        match self {
            SeriesKey::Acceleration      => "Acceleration",
            SeriesKey::Velocity          => "Velocity",
            SeriesKey::PositionX         => "Position (x)",
            SeriesKey::PositionY         => "Position (y)",
            SeriesKey::Time              => "Time (s)",
            SeriesKey::TotalEnergy       => "Total energy",
            SeriesKey::KineticEnergy     => "Kinetic energy",
            SeriesKey::PotentialEnergy   => "Potential energy",
            SeriesKey::NormalForce       => "Normal force",
            SeriesKey::FrictionForce     => "Friction force",
            SeriesKey::SlopeAngle        => "Slope angle (Rad/Deg)",
            SeriesKey::RadiusOfCurvature => "Radius of Curvature",
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Columns of the imported track, kept next to the simulated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RawSeriesKey {
    #[serde(rename = "Raw data (t)")]
    T,
    #[serde(rename = "Raw data (x)")]
    X,
    #[serde(rename = "Raw data (y)")]
    Y,
}

impl RawSeriesKey {
    pub fn label(&self) -> &'static str {
        match self {
            RawSeriesKey::T => "Raw data (t)",
            RawSeriesKey::X => "Raw data (x)",
            RawSeriesKey::Y => "Raw data (y)",
        }
    }
}

// ─────────────────────────────────────────────
// Run outcome
// ─────────────────────────────────────────────

/// Why a completed run stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// x reached the upper bound.
    ReachedEnd,
    /// The body rolled back below the lower bound.
    RolledBack,
    /// The iteration guard was hit before either bound.
    IterationLimit,
    /// Zero velocity and zero acceleration; the body will never move.
    Stalled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::ReachedEnd     => "reached end of track",
            Termination::RolledBack     => "rolled back past start",
            Termination::IterationLimit => "iteration limit",
            Termination::Stalled        => "stalled",
        };
        f.write_str(text)
    }
}

/// Percentage energy drift `(initial - final) / final × 100`.
///
/// Equal energies give 0. When the final energy is exactly zero the initial
/// energy is used as denominator instead, so the result stays finite.
pub fn energy_drift_percent(initial: f64, last: f64) -> f64 {
    if initial == last {
        return 0.0;
    }
    let denominator = if last != 0.0 { last } else { initial };
    (initial - last) / denominator * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStatistics {
    pub interpolation: InterpolationScheme,
    pub integration: IntegrationScheme,
    /// Steps taken by the integrating pass.
    pub iterations: u64,
    pub recorded_samples: usize,
    pub step_size: f64,
    /// Average number of steps between two recorded samples.
    pub sample_stride: f64,
    /// Simulated time, `iterations × step_size`.
    pub total_time: f64,
    pub computation_time: Duration,
    pub energy_drift_percent: f64,
    pub termination: Termination,
    pub started_at: DateTime<Utc>,
}

impl fmt::Display for TraceStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function type: {}", self.interpolation)?;
        writeln!(f, "Integration type: {}", self.integration)?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Step size (Δt): {}", self.step_size)?;
        writeln!(f, "Total time: {:.6}", self.total_time)?;
        writeln!(f, "Termination: {}", self.termination)?;
        writeln!(f)?;
        writeln!(f, "Computation time: {:.3} seconds", self.computation_time.as_secs_f64())?;
        write!(f, "Energy difference: {:.9} %", round(self.energy_drift_percent, 9))
    }
}

// ─────────────────────────────────────────────
// Result snapshot
// ─────────────────────────────────────────────

/// Immutable output of one run. A new run produces a new result; nothing
/// here is updated in place.
#[derive(Debug, Clone, Serialize)]
pub struct TraceResult {
    id: Uuid,
    name: String,
    series: BTreeMap<SeriesKey, Vec<f64>>,
    raw_series: BTreeMap<RawSeriesKey, Vec<f64>>,
    statistics: TraceStatistics,
}

impl TraceResult {
    pub(crate) fn new(
        name: String,
        series: BTreeMap<SeriesKey, Vec<f64>>,
        statistics: TraceStatistics,
    ) -> TraceResult {
        TraceResult {
            id: Uuid::new_v4(),
            name,
            series,
            raw_series: BTreeMap::new(),
            statistics,
        }
    }

    pub(crate) fn with_raw_series(mut self, raw_series: BTreeMap<RawSeriesKey, Vec<f64>>) -> TraceResult {
        self.raw_series = raw_series;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for optional series that were not tracked in this run.
    pub fn series(&self, key: SeriesKey) -> Option<&[f64]> {
        self.series.get(&key).map(Vec::as_slice)
    }

    pub fn raw_series(&self, key: RawSeriesKey) -> Option<&[f64]> {
        self.raw_series.get(&key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = SeriesKey> + '_ {
        self.series.keys().copied()
    }

    /// Number of recorded samples; every simulated series has this length.
    pub fn len(&self) -> usize {
        self.statistics.recorded_samples
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> &TraceStatistics {
        &self.statistics
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ObjectWithUUID for TraceResult {
    fn uuid(&self) -> &Uuid {
        &self.id
    }
}

// ─────────────────────────────────────────────
// Recording buffers
// ─────────────────────────────────────────────

/// Quantities of one recorded step. Optional fields are only filled when the
/// run tracks them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TraceSample {
    pub acceleration: f64,
    pub velocity: f64,
    pub x: f64,
    pub y: f64,
    pub time: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub forces: Option<(f64, f64)>,
    pub geometry: Option<(f64, f64)>,
}

/// Private per-run buffers, published as a [`TraceResult`] only when the
/// run completes.
pub(crate) struct SeriesRecorder {
    series: BTreeMap<SeriesKey, Vec<f64>>,
    recorded: usize,
}

impl SeriesRecorder {
    pub fn new(capacity: usize, track_forces: bool, track_geometry: bool) -> SeriesRecorder {
        let mut keys: Vec<SeriesKey> = SeriesKey::CORE.to_vec();
        if track_forces {
            keys.extend(SeriesKey::FORCES);
        }
        if track_geometry {
            keys.extend(SeriesKey::GEOMETRY);
        }
        let series = keys
            .into_iter()
            .map(|key| (key, Vec::with_capacity(capacity)))
            .collect();
        SeriesRecorder { series, recorded: 0 }
    }

    fn push(&mut self, key: SeriesKey, value: f64) {
        if let Some(values) = self.series.get_mut(&key) {
            values.push(value);
        }
    }

    pub fn record(&mut self, sample: &TraceSample) {
        self.push(SeriesKey::Acceleration, sample.acceleration);
        self.push(SeriesKey::Velocity, sample.velocity);
        self.push(SeriesKey::PositionX, sample.x);
        self.push(SeriesKey::PositionY, sample.y);
        self.push(SeriesKey::Time, sample.time);
        self.push(SeriesKey::TotalEnergy, sample.kinetic_energy + sample.potential_energy);
        self.push(SeriesKey::KineticEnergy, sample.kinetic_energy);
        self.push(SeriesKey::PotentialEnergy, sample.potential_energy);
        if let Some((normal, friction)) = sample.forces {
            self.push(SeriesKey::NormalForce, normal);
            self.push(SeriesKey::FrictionForce, friction);
        }
        if let Some((angle, radius)) = sample.geometry {
            self.push(SeriesKey::SlopeAngle, angle);
            self.push(SeriesKey::RadiusOfCurvature, radius);
        }
        self.recorded += 1;
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn into_series(self) -> BTreeMap<SeriesKey, Vec<f64>> {
        self.series
    }
}
