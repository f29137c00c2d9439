use std::env;
use std::fs;
use std::io;

use tracing::{
    error,
    info
};
use tracing_subscriber::EnvFilter;

use trackroll::configuration::TraceConfiguration;
use trackroll::objectwithuuid::ObjectWithUUID;
use trackroll::simulation::motionintegrator::Progress;
use trackroll::simulation::simulationerror::SimulationError;
use trackroll::simulation::tracerunner::TraceRunner;

const USAGE: &str = "usage: trackroll <config.json> [result.json]";

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(config_path) = args.next() else {
        eprintln!("{}", USAGE);
        return Err(SimulationError::invalid_input("missing configuration path"));
    };
    let output_path = args.next();

    let configuration = TraceConfiguration::from_reader(&config_path)?;
    let runner = TraceRunner::from_configuration(configuration)?;
    info!(trace = %runner.configuration().name, samples = runner.samples().len(), "track imported");

    let handle = runner.spawn()?;
    let result = handle.wait_with(|progress| {
        if let Progress::Recorded { recorded, capacity } = progress {
            if recorded % 1000 == 0 {
                info!(recorded, capacity, "recording");
            }
        }
    });
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "trace failed");
            return Err(err);
        }
    };

    println!("Trace: {} ({})", result.name(), result.short_id());
    println!("{}", result.statistics());

    if let Some(path) = output_path {
        fs::write(&path, result.to_json()?)?;
        info!(path = %path, "wrote trace result");
    }
    Ok(())
}
