//! Location acquisition state machine.
//!
//! ```text
//! Idle ──start──▶ QuickFix ──ok──▶ Tracking
//!                    │fail
//!                    ▼
//!             HighAccuracyFix ──ok──▶ Tracking
//!               │fail   ▲
//!   retryable & │       │ backoff elapsed
//!   attempts    ▼       │
//!   left ───▶ Retrying ─┘
//!   otherwise ──▶ Failed ──manual retry──▶ QuickFix
//! ```
//!
//! [`Acquisition::handle`] is a pure reducer: it consumes an [`Event`],
//! updates the phase, retry counter and retained sample, and returns the
//! [`Command`] the driver must execute next. It never sleeps or performs I/O.

use std::time::Duration;

use attend_core::{retain_better, LocationSample, LocatorSettings};

use crate::backoff::retry_delay;
use crate::error::LocationError;
use crate::provider::PositionOptions;

/// Acquisition policy with concrete durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub max_attempts: u32,
    pub quick: PositionOptions,
    pub precise: PositionOptions,
    pub watch: PositionOptions,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
}

impl From<&LocatorSettings> for AcquisitionConfig {
    fn from(settings: &LocatorSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            quick: PositionOptions {
                high_accuracy: false,
                timeout: Duration::from_millis(settings.quick_fix_timeout_ms),
                maximum_age: Duration::from_millis(settings.quick_fix_max_age_ms),
            },
            precise: PositionOptions {
                high_accuracy: true,
                timeout: Duration::from_millis(settings.precise_fix_timeout_ms),
                maximum_age: Duration::ZERO,
            },
            watch: PositionOptions {
                high_accuracy: true,
                timeout: Duration::from_millis(settings.precise_fix_timeout_ms),
                maximum_age: Duration::from_millis(settings.watch_max_age_ms),
            },
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            backoff_cap: Duration::from_millis(settings.backoff_cap_ms),
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self::from(&LocatorSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    QuickFix,
    HighAccuracyFix,
    Retrying { delay: Duration },
    Tracking,
    Failed(LocationError),
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::QuickFix => write!(f, "quick-fix"),
            Phase::HighAccuracyFix => write!(f, "high-accuracy-fix"),
            Phase::Retrying { delay } => write!(f, "retrying in {}ms", delay.as_millis()),
            Phase::Tracking => write!(f, "tracking"),
            Phase::Failed(_) => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    ManualRetry,
    FixSucceeded(LocationSample),
    FixFailed(LocationError),
    BackoffElapsed,
    TrackingSample(LocationSample),
    TrackingFailed(LocationError),
}

/// Work the driver performs after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request a one-shot fix, dropping any active watch first.
    RequestFix(PositionOptions),
    /// Sleep, then feed [`Event::BackoffElapsed`].
    Wait(Duration),
    /// Open the continuous watch.
    StartWatch(PositionOptions),
    /// Keep doing whatever is in flight.
    Continue,
}

#[derive(Debug, Clone)]
pub struct Acquisition {
    config: AcquisitionConfig,
    phase: Phase,
    attempt: u32,
    sample: Option<LocationSample>,
}

impl Acquisition {
    #[must_use]
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            attempt: 0,
            sample: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn sample(&self) -> Option<LocationSample> {
        self.sample
    }

    #[must_use]
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Applies `event` and returns the next command.
    ///
    /// Events that do not apply to the current phase (a late backoff timer
    /// after a manual retry, for instance) are ignored.
    pub fn handle(&mut self, event: Event) -> Command {
        match (&self.phase, event) {
            (Phase::Idle, Event::Start) | (_, Event::ManualRetry) => self.restart(),

            (Phase::QuickFix | Phase::HighAccuracyFix, Event::FixSucceeded(sample)) => {
                tracing::info!(
                    phase = %self.phase,
                    accuracy = ?sample.accuracy_meters,
                    "location fix acquired"
                );
                self.sample = Some(sample);
                self.attempt = 0;
                self.phase = Phase::Tracking;
                Command::StartWatch(self.config.watch)
            }

            (Phase::QuickFix, Event::FixFailed(err)) => {
                tracing::info!(error = %err, "quick fix failed; requesting high-accuracy fix");
                self.phase = Phase::HighAccuracyFix;
                Command::RequestFix(self.config.precise)
            }

            (Phase::HighAccuracyFix, Event::FixFailed(err)) => {
                if err.is_retryable() && self.attempt < self.config.max_attempts {
                    let delay =
                        retry_delay(self.attempt, self.config.backoff_base, self.config.backoff_cap);
                    tracing::warn!(
                        attempt = self.attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "location fix failed; retrying after back-off"
                    );
                    self.phase = Phase::Retrying { delay };
                    Command::Wait(delay)
                } else {
                    tracing::warn!(
                        attempt = self.attempt,
                        error = %err,
                        "location acquisition failed"
                    );
                    self.phase = Phase::Failed(err);
                    Command::Continue
                }
            }

            (Phase::Retrying { .. }, Event::BackoffElapsed) => {
                self.attempt += 1;
                self.phase = Phase::HighAccuracyFix;
                Command::RequestFix(self.config.precise)
            }

            (Phase::Tracking, Event::TrackingSample(sample)) => {
                let kept = retain_better(self.sample, sample);
                if kept != sample {
                    tracing::debug!(
                        incoming = ?sample.accuracy_meters,
                        retained = ?kept.accuracy_meters,
                        "discarding less accurate sample"
                    );
                }
                self.sample = Some(kept);
                Command::Continue
            }

            (Phase::Tracking, Event::TrackingFailed(err)) => {
                tracing::warn!(error = %err, "location tracking error; keeping last fix");
                Command::Continue
            }

            (phase, event) => {
                tracing::debug!(%phase, ?event, "ignoring event for current phase");
                Command::Continue
            }
        }
    }

    fn restart(&mut self) -> Command {
        self.attempt = 0;
        self.phase = Phase::QuickFix;
        Command::RequestFix(self.config.quick)
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
