use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

/// How a track sample is turned into a continuous curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationScheme {
    /// Natural cubic spline through every sample.
    #[default]
    Spline,
    /// Single global polynomial through a few Chebyshev-selected samples.
    Polynomial,
}

impl InterpolationScheme {
    pub const ALL: [InterpolationScheme; 2] = [
        InterpolationScheme::Spline,
        InterpolationScheme::Polynomial,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InterpolationScheme::Spline     => "Polynomial Spline",
            InterpolationScheme::Polynomial => "Polynomial",
        }
    }
}

impl fmt::Display for InterpolationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
