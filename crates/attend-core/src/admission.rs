//! Check-in/check-out admission gate.
//!
//! A pure decision over a snapshot of the current location, the nearest
//! branch and today's record. Preconditions are evaluated in a fixed order and
//! the first failing one is reported:
//!
//! 1. a location sample is available
//! 2. a nearest branch exists
//! 3. the nearest branch is within its radius (boundary inclusive)
//! 4. the record allows the requested transition

use serde::Serialize;

use crate::branch::NearestBranch;
use crate::record::AttendanceRecord;
use crate::sample::LocationSample;

/// Snapshot the gate decides over.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateState<'a> {
    pub location: Option<&'a LocationSample>,
    pub nearest: Option<&'a NearestBranch>,
    pub record: Option<&'a AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    LocationUnavailable,
    NoBranchNearby,
    OutOfRange { distance: f64, radius: f64 },
    AlreadyCheckedIn,
    NotCheckedInYet,
    AlreadyCheckedOut,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::LocationUnavailable => {
                write!(f, "your location is not available yet")
            }
            DenyReason::NoBranchNearby => write!(f, "no branch with a known location"),
            DenyReason::OutOfRange { distance, radius } => write!(
                f,
                "you are {distance:.0} m from the nearest branch; check-in is allowed within {radius:.0} m"
            ),
            DenyReason::AlreadyCheckedIn => write!(f, "you have already checked in today"),
            DenyReason::NotCheckedInYet => write!(f, "you have not checked in today"),
            DenyReason::AlreadyCheckedOut => write!(f, "you have already checked out today"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allow,
    Deny(DenyReason),
}

impl Admission {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow)
    }
}

/// Checks the location preconditions shared by both directions.
fn check_location(state: &GateState<'_>) -> Result<(), DenyReason> {
    if state.location.is_none() {
        return Err(DenyReason::LocationUnavailable);
    }
    let nearest = state.nearest.ok_or(DenyReason::NoBranchNearby)?;
    if !nearest.in_range() {
        return Err(DenyReason::OutOfRange {
            distance: nearest.distance_meters,
            radius: nearest.branch.radius_meters,
        });
    }
    Ok(())
}

fn into_admission(result: Result<(), DenyReason>) -> Admission {
    match result {
        Ok(()) => Admission::Allow,
        Err(reason) => Admission::Deny(reason),
    }
}

/// Decides whether a check-in may be submitted.
#[must_use]
pub fn can_check_in(state: &GateState<'_>) -> Admission {
    into_admission(check_location(state).and_then(|()| {
        if state.record.is_some_and(|r| r.check_in.is_some()) {
            Err(DenyReason::AlreadyCheckedIn)
        } else {
            Ok(())
        }
    }))
}

/// Decides whether a check-out may be submitted.
#[must_use]
pub fn can_check_out(state: &GateState<'_>) -> Admission {
    into_admission(check_location(state).and_then(|()| {
        let record = state.record.ok_or(DenyReason::NotCheckedInYet)?;
        if record.check_in.is_none() {
            return Err(DenyReason::NotCheckedInYet);
        }
        if record.check_out.is_some() {
            return Err(DenyReason::AlreadyCheckedOut);
        }
        Ok(())
    }))
}

#[cfg(test)]
#[path = "admission_test.rs"]
mod tests;
