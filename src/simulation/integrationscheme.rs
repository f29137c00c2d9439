use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

/// Numerical scheme used to step the equations of motion.
///
/// Only [`IntegrationScheme::Euler`] is implemented; the other variants are
/// accepted in configuration and rejected when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationScheme {
    #[default]
    Euler,
    ImprovedEuler,
    RungeKutta,
}

impl IntegrationScheme {
    pub const ALL: [IntegrationScheme; 3] = [
        IntegrationScheme::Euler,
        IntegrationScheme::ImprovedEuler,
        IntegrationScheme::RungeKutta,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IntegrationScheme::Euler         => "Euler's method",
            IntegrationScheme::ImprovedEuler => "Improved Euler's method",
            IntegrationScheme::RungeKutta    => "Runge-Kutta method",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, IntegrationScheme::Euler)
    }
}

impl fmt::Display for IntegrationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
