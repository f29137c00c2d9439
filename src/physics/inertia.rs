use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

/// Shape of the rolling body, carrying the dimensionless factor `c` in
/// `I = c·m·r²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InertiaShape {
    /// Sliding point, no rotational energy.
    #[default]
    PointMass,
    DiscSolid,
    DiscHollow,
    SphereSolid,
    SphereHollow,
    CylinderSolid,
    CylinderHollow,
    /// Any other body; the factor must be non-negative.
    Custom(f64),
}

impl InertiaShape {
    pub const CANONICAL: [InertiaShape; 7] = [
        InertiaShape::PointMass,
        InertiaShape::DiscSolid,
        InertiaShape::DiscHollow,
        InertiaShape::SphereSolid,
        InertiaShape::SphereHollow,
        InertiaShape::CylinderSolid,
        InertiaShape::CylinderHollow,
    ];

    pub fn coefficient(&self) -> f64 {
        match self {
            InertiaShape::PointMass      => 0.0,
            InertiaShape::DiscSolid      => 1.0 / 2.0,
            InertiaShape::DiscHollow     => 1.0,
            InertiaShape::SphereSolid    => 2.0 / 5.0,
            InertiaShape::SphereHollow   => 2.0 / 3.0,
            InertiaShape::CylinderSolid  => 1.0 / 2.0,
            InertiaShape::CylinderHollow => 1.0,
            InertiaShape::Custom(c)      => *c,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InertiaShape::PointMass      => "Point of mass",
            InertiaShape::DiscSolid      => "Disc (Solid)",
            InertiaShape::DiscHollow     => "Disc (Hollow)",
            InertiaShape::SphereSolid    => "Sphere (Solid)",
            InertiaShape::SphereHollow   => "Sphere (Hollow)",
            InertiaShape::CylinderSolid  => "Cylinder (Solid)",
            InertiaShape::CylinderHollow => "Cylinder (Hollow)",
            InertiaShape::Custom(_)      => "Custom",
        }
    }
}

impl fmt::Display for InertiaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InertiaShape::Custom(c) => write!(f, "Custom (c = {})", c),
            shape => f.write_str(shape.label()),
        }
    }
}
