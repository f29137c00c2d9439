pub mod configuration;

pub mod math {
    pub mod matherror;
    pub mod round;
    pub mod nodeselection;

    pub mod curve {
        pub mod curve;
        pub mod interpolationscheme;
        pub mod curvemodel;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
            pub mod polynomial;
            pub mod lagrangepolynomial;
        }
    }
}

pub mod objectwithuuid;

pub mod physics {
    pub mod inertia;
    pub mod physicalparameters;
}

pub mod sample {
    pub mod sampleset;
    pub mod trackfile;
}

pub mod simulation {
    pub mod simulationerror;
    pub mod integrationscheme;
    pub mod traceresult;
    pub mod motionintegrator;
    pub mod tracerunner;
}
