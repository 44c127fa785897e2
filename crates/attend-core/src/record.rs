//! Today's attendance record as reported by the backend.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Check-in/check-out timestamps for the current day.
///
/// Owned by the backend. This crate only reads it; changes happen through the
/// check-in/check-out endpoints followed by a fresh fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub check_in: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub check_out: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::NotCheckedIn => write!(f, "not checked in"),
            AttendanceStatus::CheckedIn => write!(f, "checked in"),
            AttendanceStatus::CheckedOut => write!(f, "checked out"),
        }
    }
}

impl AttendanceRecord {
    #[must_use]
    pub fn status(&self) -> AttendanceStatus {
        match (self.check_in, self.check_out) {
            (None, _) => AttendanceStatus::NotCheckedIn,
            (Some(_), None) => AttendanceStatus::CheckedIn,
            (Some(_), Some(_)) => AttendanceStatus::CheckedOut,
        }
    }

    /// Time between check-in and check-out, or `None` until both are set.
    ///
    /// A check-out recorded before the check-in yields `None` rather than a
    /// negative span.
    #[must_use]
    pub fn worked(&self) -> Option<Duration> {
        let span = self.check_out? - self.check_in?;
        (span >= Duration::zero()).then_some(span)
    }
}
