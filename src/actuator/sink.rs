// Actuation sinks - deliver a code after the settling delay
//
// Two strategies share one trait:
// - BlockingActuator sleeps on the calling thread, then writes. This is the
//   single-threaded reference behavior and stalls frame processing.
// - ScheduledActuator turns the delay into a cancellable tokio task so the
//   frame loop keeps running while the vibration settles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

use crate::actuator::channel::ActuatorChannel;
use crate::error::{log_actuator_error, ActuatorError};

/// Default pause between a decision and its emission
pub const DEFAULT_SETTLING_DELAY: Duration = Duration::from_millis(800);

/// What a sink did with a dispatched code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationReceipt {
    /// Written before `dispatch` returned
    Written { code: u8 },
    /// Queued; the write happens after the settling delay
    Scheduled { code: u8 },
}

impl ActuationReceipt {
    pub fn code(&self) -> u8 {
        match *self {
            ActuationReceipt::Written { code } | ActuationReceipt::Scheduled { code } => code,
        }
    }
}

/// Destination for finalized trial codes
pub trait ActuationSink: Send {
    fn dispatch(&mut self, code: u8) -> Result<ActuationReceipt, ActuatorError>;

    /// Block until every queued emission has finished
    ///
    /// Returns the outcome of each emission the sink has not reported yet.
    fn settle(&mut self) -> Vec<Result<u8, ActuatorError>> {
        Vec::new()
    }

    /// `settle` for callers already running on an async runtime
    fn settle_async(&mut self) -> BoxFuture<'_, Vec<Result<u8, ActuatorError>>> {
        async { Vec::new() }.boxed()
    }
}

type SharedChannel = Arc<Mutex<Box<dyn ActuatorChannel>>>;

fn write_shared(channel: &SharedChannel, code: u8) -> Result<(), ActuatorError> {
    let mut guard = channel
        .lock()
        .map_err(|_| ActuatorError::ChannelWriteFailure {
            code,
            reason: "channel lock poisoned".to_string(),
        })?;
    guard.write_code(code)
}

/// Sleep-then-write on the calling thread
pub struct BlockingActuator {
    channel: Box<dyn ActuatorChannel>,
    settling_delay: Duration,
}

impl BlockingActuator {
    pub fn new(channel: Box<dyn ActuatorChannel>, settling_delay: Duration) -> Self {
        Self {
            channel,
            settling_delay,
        }
    }
}

impl ActuationSink for BlockingActuator {
    fn dispatch(&mut self, code: u8) -> Result<ActuationReceipt, ActuatorError> {
        std::thread::sleep(self.settling_delay);
        self.channel.write_code(code).inspect_err(|err| {
            log_actuator_error(err, "blocking_dispatch");
        })?;
        tracing::info!("[Actuator] Sent code {} to {}", code, self.channel.describe());
        Ok(ActuationReceipt::Written { code })
    }
}

/// Handle on one pending emission
///
/// Dropping the handle does not cancel the emission; call `cancel()`.
pub struct ScheduledActuation {
    code: u8,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<u8, ActuatorError>>,
}

impl ScheduledActuation {
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Stop the emission if the settling delay has not elapsed yet
    ///
    /// Returns false if the emission already ran or was already cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.cancel_tx.take() {
            Some(tx) => tx.send(()).is_ok() && !self.task.is_finished(),
            None => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the emission and return the written code
    pub async fn outcome(mut self) -> Result<u8, ActuatorError> {
        let joined = (&mut self.task).await;
        self.resolve(joined)
    }

    /// Outcome of an emission that already ran; `None` while it is still waiting
    fn try_outcome(&mut self) -> Option<Result<u8, ActuatorError>> {
        if !self.task.is_finished() {
            return None;
        }
        let joined = (&mut self.task).now_or_never()?;
        Some(self.resolve(joined))
    }

    fn resolve(
        &self,
        joined: Result<Result<u8, ActuatorError>, JoinError>,
    ) -> Result<u8, ActuatorError> {
        match joined {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => {
                Err(ActuatorError::Cancelled { code: self.code })
            }
            Err(join_err) => Err(ActuatorError::ChannelWriteFailure {
                code: self.code,
                reason: join_err.to_string(),
            }),
        }
    }
}

/// Timer-driven sink running on a tokio runtime
pub struct ScheduledActuator {
    channel: SharedChannel,
    settling_delay: Duration,
    runtime: Handle,
    pending: Vec<ScheduledActuation>,
    /// Outcomes of finished emissions not yet handed to a caller
    completed: Vec<Result<u8, ActuatorError>>,
}

impl ScheduledActuator {
    /// Create a sink that spawns onto `runtime`
    pub fn new(channel: Box<dyn ActuatorChannel>, settling_delay: Duration, runtime: Handle) -> Self {
        Self {
            channel: Arc::new(Mutex::new(channel)),
            settling_delay,
            runtime,
            pending: Vec::new(),
            completed: Vec::new(),
        }
    }

    /// Spawn one emission and hand back its handle
    pub fn schedule(&self, code: u8) -> ScheduledActuation {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let channel = Arc::clone(&self.channel);
        let delay = self.settling_delay;

        let task = self.runtime.spawn(async move {
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);

            tokio::select! {
                _ = &mut sleep => {}
                signal = cancel_rx => {
                    if signal.is_ok() {
                        tracing::info!("[Actuator] Emission of code {} cancelled", code);
                        return Err(ActuatorError::Cancelled { code });
                    }
                    // Handle dropped without cancelling
                    sleep.await;
                }
            }

            match write_shared(&channel, code) {
                Ok(()) => {
                    tracing::info!("[Actuator] Sent code {}", code);
                    Ok(code)
                }
                Err(err) => {
                    log_actuator_error(&err, "scheduled_dispatch");
                    Err(err)
                }
            }
        });

        ScheduledActuation {
            code,
            cancel_tx: Some(cancel_tx),
            task,
        }
    }

    /// Emissions dispatched through the sink that have not been drained
    pub fn pending(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    /// Move outcomes of finished emissions into `completed`
    fn collect_finished(&mut self) {
        let completed = &mut self.completed;
        self.pending
            .retain_mut(|actuation| match actuation.try_outcome() {
                Some(outcome) => {
                    completed.push(outcome);
                    false
                }
                None => true,
            });
    }

    /// Cancel every pending emission; returns how many were stopped in time
    pub fn cancel_pending(&mut self) -> usize {
        self.pending
            .iter_mut()
            .map(ScheduledActuation::cancel)
            .filter(|cancelled| *cancelled)
            .count()
    }

    /// Wait for every pending emission, oldest first
    ///
    /// Emissions that finished earlier, failed ones included, are reported too.
    pub async fn drain(&mut self) -> Vec<Result<u8, ActuatorError>> {
        self.collect_finished();
        let mut outcomes = std::mem::take(&mut self.completed);
        for actuation in self.pending.drain(..) {
            outcomes.push(actuation.outcome().await);
        }
        outcomes
    }
}

impl ActuationSink for ScheduledActuator {
    fn dispatch(&mut self, code: u8) -> Result<ActuationReceipt, ActuatorError> {
        self.collect_finished();
        let actuation = self.schedule(code);
        self.pending.push(actuation);
        Ok(ActuationReceipt::Scheduled { code })
    }

    /// Blocks only when called from outside any runtime
    ///
    /// Inside a runtime blocking would stall the executor, so only emissions
    /// that already finished are returned; use `settle_async` there.
    fn settle(&mut self) -> Vec<Result<u8, ActuatorError>> {
        if Handle::try_current().is_ok() {
            tracing::warn!("[Actuator] settle() called on a runtime thread; not waiting");
            self.collect_finished();
            return std::mem::take(&mut self.completed);
        }
        let runtime = self.runtime.clone();
        runtime.block_on(self.drain())
    }

    fn settle_async(&mut self) -> BoxFuture<'_, Vec<Result<u8, ActuatorError>>> {
        self.drain().boxed()
    }
}
