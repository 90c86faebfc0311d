//! Best-effort sampling profiler
//!
//! Samples the runtime's live task count on a fixed tick while a run is in
//! progress. It is not part of a run's correctness and may be left off.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default sampling interval
pub const DEFAULT_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Samples {
    ticks: u64,
    total_tasks: u64,
}

/// Summary of one profiling session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileReport {
    pub elapsed: Duration,
    pub ticks: u64,
    pub average_tasks: u64,
}

impl ProfileReport {
    fn new(elapsed: Duration, samples: Samples) -> Self {
        let average_tasks = if samples.ticks == 0 {
            0
        } else {
            samples.total_tasks / samples.ticks
        };
        Self {
            elapsed,
            ticks: samples.ticks,
            average_tasks,
        }
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total time: {:?}, ticks: {}, average task number: {}",
            self.elapsed, self.ticks, self.average_tasks
        )
    }
}

struct Session {
    started: Instant,
    cancel: CancellationToken,
    sampler: JoinHandle<Samples>,
}

/// Tick-based sampler of live runtime tasks
pub struct Profiler {
    tick: Duration,
    session: Option<Session>,
}

impl Profiler {
    /// Create a profiler with the default tick
    #[must_use]
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    /// Create a profiler with a custom tick (at least 1µs)
    #[must_use]
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_micros(1)),
            session: None,
        }
    }

    /// Whether a session is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Start sampling; restarts if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if let Some(previous) = self.session.take() {
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let sampler = tokio::spawn(sample(Handle::current(), self.tick, cancel.clone()));
        self.session = Some(Session {
            started: Instant::now(),
            cancel,
            sampler,
        });
    }

    /// Stop sampling and report. Returns `None` if nothing was running.
    pub async fn stop(&mut self) -> Option<ProfileReport> {
        let session = self.session.take()?;
        session.cancel.cancel();
        let elapsed = session.started.elapsed();

        let samples = match session.sampler.await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!("Profiler sampler failed: {}", e);
                Samples::default()
            }
        };
        Some(ProfileReport::new(elapsed, samples))
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

async fn sample(handle: Handle, tick: Duration, cancel: CancellationToken) -> Samples {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut samples = Samples::default();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                samples.ticks += 1;
                samples.total_tasks += handle.metrics().num_alive_tasks() as u64;
            }
        }
    }

    samples
}
