//! Branches and nearest-branch resolution.

use serde::Serialize;

use crate::geo::{distance_meters, Coordinate};
use crate::CoreError;

/// A company branch with its admission geofence.
///
/// `coordinate` is `None` when the backend has no usable position on file;
/// such branches are never selected as nearest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub radius_meters: f64,
    pub address: Option<String>,
}

impl Branch {
    /// Builds a branch, enforcing a positive finite radius.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRadius`] if `radius_meters` is not `> 0`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinate: Option<Coordinate>,
        radius_meters: f64,
        address: Option<String>,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(CoreError::InvalidRadius {
                branch_id: id,
                radius: radius_meters,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            coordinate,
            radius_meters,
            address,
        })
    }
}

/// The closest branch to a position and how far away it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestBranch {
    pub branch: Branch,
    pub distance_meters: f64,
}

impl NearestBranch {
    /// Inclusive geofence check: standing exactly on the boundary is inside.
    #[must_use]
    pub fn in_range(&self) -> bool {
        self.distance_meters <= self.branch.radius_meters
    }
}

/// Finds the branch closest to `current`.
///
/// Branches without coordinates are skipped. Ties go to the branch that
/// appears first in `branches`. Returns `None` when no branch has a
/// coordinate.
#[must_use]
pub fn nearest(current: Coordinate, branches: &[Branch]) -> Option<NearestBranch> {
    let mut best: Option<(&Branch, f64)> = None;
    for branch in branches {
        let Some(coordinate) = branch.coordinate else {
            continue;
        };
        let distance = distance_meters(current, coordinate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((branch, distance)),
        }
    }
    best.map(|(branch, distance_meters)| NearestBranch {
        branch: branch.clone(),
        distance_meters,
    })
}
