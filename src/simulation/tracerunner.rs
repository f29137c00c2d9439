use std::collections::BTreeMap;
use std::sync::atomic::{
    AtomicBool,
    Ordering
};
use std::sync::mpsc::{
    self,
    Receiver,
    TryRecvError
};
use std::sync::Arc;
use std::thread::{
    self,
    JoinHandle
};

use tracing::{
    debug,
    info
};

use crate::configuration::TraceConfiguration;
use crate::math::curve::curvemodel::CurveModel;
use crate::math::nodeselection::reduce_array;
use crate::objectwithuuid::ObjectWithUUID;
use crate::sample::sampleset::SampleSet;
use crate::simulation::motionintegrator::{
    CancellationToken,
    MotionIntegrator,
    Progress
};
use crate::simulation::simulationerror::SimulationError;
use crate::simulation::traceresult::{
    RawSeriesKey,
    TraceResult
};

/// Messages from a background run. `Finished` is always the last one.
#[derive(Debug)]
pub enum RunMessage {
    Progress(Progress),
    Finished(Result<TraceResult, SimulationError>),
}

/// Marks a runner busy for as long as it lives.
struct ActiveRun {
    active: Arc<AtomicBool>,
}

impl ActiveRun {
    fn acquire(active: &Arc<AtomicBool>) -> Result<ActiveRun, SimulationError> {
        if active.swap(true, Ordering::SeqCst) {
            return Err(SimulationError::AlreadyRunning);
        }
        Ok(ActiveRun { active: Arc::clone(active) })
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Runs the full pipeline `SampleSet → CurveModel → MotionIntegrator` for
/// one configuration, either on the calling thread or on a worker.
///
/// At most one run per runner is active at a time; starting another while
/// one is outstanding fails with [`SimulationError::AlreadyRunning`].
pub struct TraceRunner {
    configuration: TraceConfiguration,
    samples: Arc<SampleSet>,
    active: Arc<AtomicBool>,
}

impl TraceRunner {
    pub fn new(configuration: TraceConfiguration, samples: Arc<SampleSet>) -> Result<TraceRunner, SimulationError> {
        configuration.validate()?;
        Ok(TraceRunner {
            configuration,
            samples,
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Imports the configured track file and wraps it in a runner.
    pub fn from_configuration(configuration: TraceConfiguration) -> Result<TraceRunner, SimulationError> {
        let samples = configuration.load_samples()?;
        TraceRunner::new(configuration, Arc::new(samples))
    }

    pub fn configuration(&self) -> &TraceConfiguration {
        &self.configuration
    }

    pub fn samples(&self) -> &Arc<SampleSet> {
        &self.samples
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn build_curve(&self) -> Result<CurveModel, SimulationError> {
        build_curve(&self.configuration, &self.samples)
    }

    pub fn run_blocking(&self) -> Result<TraceResult, SimulationError> {
        self.run_with(&CancellationToken::new(), &mut |_| {})
    }

    pub fn run_with(
        &self,
        cancel: &CancellationToken,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<TraceResult, SimulationError> {
        let _active = ActiveRun::acquire(&self.active)?;
        execute(&self.configuration, &self.samples, cancel, on_progress)
    }

    /// Starts the run on a worker thread. Progress and the final result
    /// arrive through the returned handle.
    pub fn spawn(&self) -> Result<RunHandle, SimulationError> {
        let active = ActiveRun::acquire(&self.active)?;
        let configuration = self.configuration.clone();
        let samples = Arc::clone(&self.samples);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let (sender, receiver) = mpsc::channel();

        let thread = thread::Builder::new()
            .name(format!("trace-{}", configuration.name))
            .spawn(move || {
                let result = execute(&configuration, &samples, &worker_cancel, &mut |progress| {
                    let _ = sender.send(RunMessage::Progress(progress));
                });
                // free the runner before the caller can observe the result
                drop(active);
                let _ = sender.send(RunMessage::Finished(result));
            })?;

        debug!(trace = %self.configuration.name, "spawned background run");
        Ok(RunHandle { receiver, cancel, thread: Some(thread) })
    }
}

fn build_curve(configuration: &TraceConfiguration, samples: &SampleSet) -> Result<CurveModel, SimulationError> {
    Ok(samples.interpolate(configuration.interpolation, configuration.polynomial_nodes)?)
}

fn execute(
    configuration: &TraceConfiguration,
    samples: &SampleSet,
    cancel: &CancellationToken,
    on_progress: &mut dyn FnMut(Progress),
) -> Result<TraceResult, SimulationError> {
    let curve = Arc::new(build_curve(configuration, samples)?);
    let mut integrator = MotionIntegrator::new(curve, configuration.parameters, configuration.options)
        .with_name(configuration.name.clone());
    let result = integrator.run_with(cancel, on_progress)?;

    let size_limit = configuration.options.size_limit;
    let raw_series = BTreeMap::from([
        (RawSeriesKey::T, reduce_array(samples.t(), size_limit).into_owned()),
        (RawSeriesKey::X, reduce_array(samples.x(), size_limit).into_owned()),
        (RawSeriesKey::Y, reduce_array(samples.y(), size_limit).into_owned()),
    ]);
    info!(trace = %configuration.name, id = %result.short_id(), "trace result published");
    Ok(result.with_raw_series(raw_series))
}

/// Caller side of a background run.
pub struct RunHandle {
    receiver: Receiver<RunMessage>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Asks the worker to stop at the next step; the run then finishes with
    /// [`SimulationError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Blocks for the next message.
    pub fn recv(&self) -> Result<RunMessage, SimulationError> {
        self.receiver.recv().map_err(|_| SimulationError::WorkerDisconnected)
    }

    /// Next message if one is already waiting.
    pub fn try_recv(&self) -> Result<Option<RunMessage>, SimulationError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimulationError::WorkerDisconnected),
        }
    }

    pub fn wait(self) -> Result<TraceResult, SimulationError> {
        self.wait_with(|_| {})
    }

    /// Drains progress messages into `on_progress` until the result arrives.
    pub fn wait_with<F: FnMut(Progress)>(mut self, mut on_progress: F) -> Result<TraceResult, SimulationError> {
        loop {
            match self.recv()? {
                RunMessage::Progress(progress) => on_progress(progress),
                RunMessage::Finished(result) => {
                    if let Some(thread) = self.thread.take() {
                        let _ = thread.join();
                    }
                    return result;
                }
            }
        }
    }
}

impl Drop for RunHandle {
    /// An abandoned run is cancelled and joined so the runner is free again.
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel.cancel();
            let _ = thread.join();
        }
    }
}
