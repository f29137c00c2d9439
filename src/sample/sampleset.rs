use serde::Serialize;

use crate::math::curve::curve::Domain;
use crate::math::curve::curvemodel::CurveModel;
use crate::math::curve::interpolationscheme::InterpolationScheme;
use crate::math::matherror::{
    validate_coordinates,
    MathError
};
use crate::simulation::simulationerror::SimulationError;

/// Imported track samples `(t, x, y)`, ordered by strictly increasing x.
///
/// Immutable once built. Runs share one set through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    t: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSet {
    pub fn new(t: Vec<f64>, x: Vec<f64>, y: Vec<f64>) -> Result<SampleSet, SimulationError> {
        if t.len() != x.len() {
            return Err(SimulationError::invalid_input(format!(
                "time and position columns differ in length ({} != {})",
                t.len(),
                x.len()
            )));
        }
        validate_coordinates(&x, &y)?;
        Ok(SampleSet { t, x, y })
    }

    /// Builds a set from `(t, x, y)` rows.
    pub fn from_rows(rows: &[(f64, f64, f64)]) -> Result<SampleSet, SimulationError> {
        let t = rows.iter().map(|r| r.0).collect();
        let x = rows.iter().map(|r| r.1).collect();
        let y = rows.iter().map(|r| r.2).collect();
        SampleSet::new(t, x, y)
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn domain(&self) -> Domain {
        Domain::new(self.x[0], self.x[self.x.len() - 1])
    }

    pub fn interpolate(&self, scheme: InterpolationScheme, polynomial_nodes: usize) -> Result<CurveModel, MathError> {
        CurveModel::interpolate(&self.x, &self.y, scheme, polynomial_nodes)
    }
}
