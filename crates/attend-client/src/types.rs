//! Attendance API wire types.
//!
//! Every response wraps its payload in a `{"data": ...}` envelope;
//! [`DataEnvelope`] captures that pattern generically. Failures carry a
//! human-readable `message`, captured by [`ErrorBody`].

use attend_core::{Branch, Coordinate, LocationSample};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Top-level envelope for successful responses.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /branches
// ---------------------------------------------------------------------------

/// A branch as the backend serialises it.
///
/// Coordinates are optional on the wire; branches registered without a map
/// position still appear in listings.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub radius: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl BranchDto {
    /// Converts to the domain type.
    ///
    /// A missing or out-of-range coordinate becomes `None` (the branch is kept
    /// but never matched). A non-positive radius makes the whole branch
    /// unusable and returns `None`.
    #[must_use]
    pub fn into_branch(self) -> Option<Branch> {
        let coordinate = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                .map_err(|e| {
                    tracing::warn!(branch_id = %self.id, error = %e, "ignoring invalid branch coordinate");
                })
                .ok(),
            _ => None,
        };
        Branch::new(self.id, self.name, coordinate, self.radius, self.address)
            .map_err(|e| {
                tracing::warn!(error = %e, "skipping branch with invalid radius");
            })
            .ok()
    }
}

// ---------------------------------------------------------------------------
// POST /attendance-records/check-in | check-out
// ---------------------------------------------------------------------------

/// Body for both check-in and check-out submissions.
///
/// `client_time` is the device clock at submission, with its real UTC
/// offset. The backend timestamps independently and uses this for audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub branch_id: String,
    pub client_time: DateTime<FixedOffset>,
}

impl CheckRequest {
    #[must_use]
    pub fn new(
        sample: &LocationSample,
        branch_id: impl Into<String>,
        client_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            latitude: sample.coordinate.latitude(),
            longitude: sample.coordinate.longitude(),
            branch_id: branch_id.into(),
            client_time,
        }
    }
}
