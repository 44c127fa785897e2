//! Check-in/check-out flow against the backend.
//!
//! [`AttendanceDesk`] keeps the branch list and today's record fetched from
//! the API, runs the admission gate over them and a location sample, submits
//! on `Allow`, and then re-reads today's record. Local state is only ever
//! replaced by what the backend returns; a failed submission triggers the same
//! re-read instead of any local patching.

use attend_core::{
    can_check_in, can_check_out, nearest, Admission, AttendanceRecord, Branch, DenyReason,
    GateState, LocationSample, NearestBranch,
};
use chrono::{DateTime, FixedOffset, Local};
use thiserror::Error;

use crate::client::AttendanceClient;
use crate::error::ClientError;
use crate::events::{AttendanceEvent, EventBus};
use crate::types::CheckRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CheckIn,
    CheckOut,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::CheckIn => write!(f, "check-in"),
            Direction::CheckOut => write!(f, "check-out"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("{0}")]
    Denied(DenyReason),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result of an accepted submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub direction: Direction,
    pub branch: NearestBranch,
    pub client_time: DateTime<FixedOffset>,
    /// Today's record re-read after the submission; `None` if that read
    /// failed or the backend has nothing for today.
    pub record: Option<AttendanceRecord>,
}

pub struct AttendanceDesk {
    client: AttendanceClient,
    events: EventBus,
    branches: Vec<Branch>,
    record: Option<AttendanceRecord>,
}

impl AttendanceDesk {
    #[must_use]
    pub fn new(client: AttendanceClient, events: EventBus) -> Self {
        Self {
            client,
            events,
            branches: Vec::new(),
            record: None,
        }
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[must_use]
    pub fn record(&self) -> Option<&AttendanceRecord> {
        self.record.as_ref()
    }

    /// Reloads the branch list.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the fetch; the previous list is kept.
    pub async fn refresh_branches(&mut self) -> Result<&[Branch], ClientError> {
        self.branches = self.client.list_branches().await?;
        Ok(&self.branches)
    }

    /// Reloads today's record and announces it on the event bus.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientError`] from the fetch; the previous record is kept.
    pub async fn refresh_record(&mut self) -> Result<Option<&AttendanceRecord>, ClientError> {
        self.record = self.client.today_record().await?;
        self.events
            .publish(AttendanceEvent::RecordRefreshed(self.record.clone()));
        Ok(self.record.as_ref())
    }

    /// Nearest known branch to `location`.
    #[must_use]
    pub fn nearest(&self, location: &LocationSample) -> Option<NearestBranch> {
        nearest(location.coordinate, &self.branches)
    }

    /// Runs the admission gate without submitting.
    #[must_use]
    pub fn admission(&self, direction: Direction, location: Option<&LocationSample>) -> Admission {
        let resolved = location.and_then(|l| self.nearest(l));
        let state = GateState {
            location,
            nearest: resolved.as_ref(),
            record: self.record.as_ref(),
        };
        match direction {
            Direction::CheckIn => can_check_in(&state),
            Direction::CheckOut => can_check_out(&state),
        }
    }

    /// Submits a check-in stamped with the local clock.
    ///
    /// # Errors
    ///
    /// See [`AttendanceDesk::submit_at`].
    pub async fn check_in(
        &mut self,
        location: Option<&LocationSample>,
    ) -> Result<Submission, DeskError> {
        self.submit(Direction::CheckIn, location).await
    }

    /// Submits a check-out stamped with the local clock.
    ///
    /// # Errors
    ///
    /// See [`AttendanceDesk::submit_at`].
    pub async fn check_out(
        &mut self,
        location: Option<&LocationSample>,
    ) -> Result<Submission, DeskError> {
        self.submit(Direction::CheckOut, location).await
    }

    /// Submits in `direction` stamped with the local clock and its real
    /// UTC offset.
    ///
    /// # Errors
    ///
    /// See [`AttendanceDesk::submit_at`].
    pub async fn submit(
        &mut self,
        direction: Direction,
        location: Option<&LocationSample>,
    ) -> Result<Submission, DeskError> {
        self.submit_at(direction, location, Local::now().fixed_offset())
            .await
    }

    /// Gates, submits and refreshes.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Denied`] if the gate refuses; nothing is sent.
    /// - [`DeskError::Client`] if the submission fails. Today's record is
    ///   re-read before returning so callers see the backend's view.
    pub async fn submit_at(
        &mut self,
        direction: Direction,
        location: Option<&LocationSample>,
        client_time: DateTime<FixedOffset>,
    ) -> Result<Submission, DeskError> {
        if let Admission::Deny(reason) = self.admission(direction, location) {
            tracing::info!(%direction, %reason, "attendance submission denied");
            return Err(DeskError::Denied(reason));
        }
        // Allow implies both are present.
        let resolved = location.and_then(|l| self.nearest(l));
        let (Some(sample), Some(branch)) = (location, resolved) else {
            return Err(DeskError::Denied(DenyReason::LocationUnavailable));
        };

        let request = CheckRequest::new(sample, branch.branch.id.clone(), client_time);
        let sent = match direction {
            Direction::CheckIn => self.client.check_in(&request).await,
            Direction::CheckOut => self.client.check_out(&request).await,
        };

        if let Err(err) = sent {
            tracing::warn!(
                %direction,
                status = ?err.status(),
                error = %err,
                "attendance submission failed"
            );
            if let Err(refresh_err) = self.refresh_record().await {
                tracing::warn!(error = %refresh_err, "could not refresh today's record");
            }
            return Err(err.into());
        }

        let event = match direction {
            Direction::CheckIn => AttendanceEvent::CheckedIn {
                branch_id: branch.branch.id.clone(),
                at: client_time,
            },
            Direction::CheckOut => AttendanceEvent::CheckedOut {
                branch_id: branch.branch.id.clone(),
                at: client_time,
            },
        };
        self.events.publish(event);

        let record = match self.refresh_record().await {
            Ok(record) => record.cloned(),
            Err(err) => {
                tracing::warn!(error = %err, "submission accepted but refresh failed");
                None
            }
        };

        tracing::info!(
            %direction,
            branch_id = %branch.branch.id,
            distance_m = branch.distance_meters,
            "attendance recorded"
        );
        Ok(Submission {
            direction,
            branch,
            client_time,
            record,
        })
    }
}
