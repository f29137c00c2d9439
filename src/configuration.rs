use std::fs::File;
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf
};

use serde::{
    Deserialize,
    Serialize
};
use tracing::debug;

use crate::math::curve::curvemodel::DEFAULT_POLYNOMIAL_NODES;
use crate::math::curve::interpolationscheme::InterpolationScheme;
use crate::physics::physicalparameters::PhysicalParameters;
use crate::sample::sampleset::SampleSet;
use crate::sample::trackfile::read_track_file;
use crate::simulation::motionintegrator::IntegratorOptions;
use crate::simulation::simulationerror::SimulationError;

/// Everything needed to run one trace: where the samples come from, how
/// they become a curve, and the physical set-up.
///
/// Every field is optional in JSON:
///
/// ```json
/// {
///     "name": "mass B",
///     "file": "imports/mass_B.txt",
///     "interpolation": "polynomial",
///     "parameters": { "mass": 0.2, "inertia": "sphere_solid", "step": 0.0001 },
///     "size_limit": 5000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfiguration {
    pub name: String,
    /// Track export to import. Relative paths are resolved against the
    /// configuration file's directory by [`TraceConfiguration::from_reader`].
    pub file: Option<PathBuf>,
    pub interpolation: InterpolationScheme,
    pub polynomial_nodes: usize,
    pub parameters: PhysicalParameters,
    #[serde(flatten)]
    pub options: IntegratorOptions,
}

impl Default for TraceConfiguration {
    fn default() -> Self {
        Self {
            name: "New trace".to_owned(),
            file: None,
            interpolation: InterpolationScheme::Spline,
            polynomial_nodes: DEFAULT_POLYNOMIAL_NODES,
            parameters: PhysicalParameters::default(),
            options: IntegratorOptions::default(),
        }
    }
}

impl TraceConfiguration {
    pub fn from_reader<P: AsRef<Path>>(file_path: P) -> Result<TraceConfiguration, SimulationError> {
        let file_path = file_path.as_ref();
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let mut configuration: TraceConfiguration = serde_json::from_reader(reader)?;
        if let (Some(track), Some(dir)) = (&configuration.file, file_path.parent()) {
            if track.is_relative() {
                configuration.file = Some(dir.join(track));
            }
        }
        debug!(path = %file_path.display(), name = %configuration.name, "loaded trace configuration");
        Ok(configuration)
    }

    pub fn from_json_str(json: &str) -> Result<TraceConfiguration, SimulationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.polynomial_nodes < 2 {
            return Err(SimulationError::invalid_parameter(format!(
                "polynomial interpolation needs at least 2 nodes, got {}",
                self.polynomial_nodes
            )));
        }
        self.parameters.validate()?;
        self.options.validate()
    }

    /// Imports the configured track file.
    pub fn load_samples(&self) -> Result<SampleSet, SimulationError> {
        match &self.file {
            Some(path) => read_track_file(path),
            None => Err(SimulationError::invalid_input(format!(
                "trace '{}' has no track file",
                self.name
            ))),
        }
    }
}
