//! Async driver for the acquisition state machine.
//!
//! [`LocatorSession::spawn`] runs the machine on a Tokio task. Readers observe
//! [`LocatorSnapshot`]s through a `watch` channel; each snapshot is replaced
//! whole, so a reader never sees a phase from one step paired with a sample
//! from another. Dropping the session aborts the task, which drops any active
//! watch stream, in-flight fix request and pending back-off timer.

use std::sync::Arc;

use attend_core::LocationSample;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::engine::{Acquisition, AcquisitionConfig, Command, Event, Phase};
use crate::error::{LocationError, LocatorError};
use crate::provider::PositionProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct LocatorSnapshot {
    pub phase: Phase,
    pub sample: Option<LocationSample>,
    pub attempt: u32,
}

impl LocatorSnapshot {
    fn of(machine: &Acquisition) -> Self {
        Self {
            phase: machine.phase().clone(),
            sample: machine.sample(),
            attempt: machine.attempt(),
        }
    }

    /// `true` while a one-shot fix is pending or a retry is scheduled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            Phase::QuickFix | Phase::HighAccuracyFix | Phase::Retrying { .. }
        )
    }

    #[must_use]
    pub fn error(&self) -> Option<&LocationError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }
}

enum Control {
    Retry,
}

/// A running acquisition session.
pub struct LocatorSession {
    snapshots: watch::Receiver<LocatorSnapshot>,
    control: mpsc::UnboundedSender<Control>,
    task: JoinHandle<()>,
}

impl LocatorSession {
    /// Starts acquisition on the current Tokio runtime.
    pub fn spawn<P: PositionProvider>(provider: Arc<P>, config: AcquisitionConfig) -> Self {
        let machine = Acquisition::new(config);
        let (snapshot_tx, snapshots) = watch::channel(LocatorSnapshot::of(&machine));
        let (control, control_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(provider, machine, snapshot_tx, control_rx));
        Self {
            snapshots,
            control,
            task,
        }
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LocatorSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver for change notifications.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocatorSnapshot> {
        self.snapshots.clone()
    }

    /// User-triggered retry: resets the attempt counter and restarts from
    /// the quick fix.
    pub fn retry(&self) {
        if self.control.send(Control::Retry).is_err() {
            tracing::debug!("retry requested after location session ended");
        }
    }

    /// Waits until a sample is available or acquisition has failed.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::Location`] with the final error once the session
    ///   reaches [`Phase::Failed`].
    /// - [`LocatorError::SessionClosed`] if the driver task stopped.
    pub async fn wait_for_fix(&self) -> Result<LocationSample, LocatorError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.sample.is_some() || s.error().is_some())
            .await
            .map_err(|_| LocatorError::SessionClosed)?;
        if let Some(sample) = snapshot.sample {
            return Ok(sample);
        }
        match snapshot.error() {
            Some(err) => Err(err.clone().into()),
            None => Err(LocatorError::SessionClosed),
        }
    }

    /// Stops acquisition and releases the watch and any pending timer.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for LocatorSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive<P: PositionProvider>(
    provider: Arc<P>,
    mut machine: Acquisition,
    snapshots: watch::Sender<LocatorSnapshot>,
    mut control: mpsc::UnboundedReceiver<Control>,
) {
    let mut tracker: Option<BoxStream<'static, Result<LocationSample, LocationError>>> = None;
    let mut command = machine.handle(Event::Start);
    snapshots.send_replace(LocatorSnapshot::of(&machine));

    loop {
        let event = match command {
            Command::RequestFix(options) => {
                tracker = None;
                let request = tokio::time::timeout(
                    options.timeout,
                    provider.current_position(options),
                );
                tokio::select! {
                    result = request => match result {
                        Ok(Ok(sample)) => Event::FixSucceeded(sample),
                        Ok(Err(err)) => Event::FixFailed(err),
                        Err(_elapsed) => Event::FixFailed(LocationError::Timeout),
                    },
                    ctl = control.recv() => match ctl {
                        Some(Control::Retry) => Event::ManualRetry,
                        None => return,
                    },
                }
            }
            Command::Wait(delay) => {
                tokio::select! {
                    () = tokio::time::sleep(delay) => Event::BackoffElapsed,
                    ctl = control.recv() => match ctl {
                        Some(Control::Retry) => Event::ManualRetry,
                        None => return,
                    },
                }
            }
            Command::StartWatch(options) => {
                tracing::info!("starting continuous location tracking");
                tracker = Some(provider.watch_position(options));
                command = Command::Continue;
                continue;
            }
            Command::Continue => {
                let next_update = async {
                    match tracker.as_mut() {
                        Some(stream) => stream.next().await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    update = next_update => match update {
                        Some(Ok(sample)) => Event::TrackingSample(sample),
                        Some(Err(err)) => Event::TrackingFailed(err),
                        None => {
                            tracing::warn!("location watch ended; keeping last fix");
                            tracker = None;
                            continue;
                        }
                    },
                    ctl = control.recv() => match ctl {
                        Some(Control::Retry) => Event::ManualRetry,
                        None => return,
                    },
                }
            }
        };

        command = machine.handle(event);
        snapshots.send_replace(LocatorSnapshot::of(&machine));
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
