//! Position samples and the best-sample-wins reducer.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// One position fix reported by a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub coordinate: Coordinate,
    /// Reported uncertainty radius in meters; smaller is better.
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

impl LocationSample {
    /// Negative or non-finite accuracy is treated as unknown.
    #[must_use]
    pub fn new(coordinate: Coordinate, accuracy_meters: Option<f64>) -> Self {
        Self {
            coordinate,
            accuracy_meters: accuracy_meters.filter(|a| a.is_finite() && *a >= 0.0),
        }
    }

    /// Returns `true` if `self` should replace `current`.
    ///
    /// A sample wins when the current one has no accuracy recorded, or when its
    /// own accuracy is strictly lower. A sample without accuracy never beats
    /// one that has it.
    #[must_use]
    pub fn improves_on(&self, current: &LocationSample) -> bool {
        match (current.accuracy_meters, self.accuracy_meters) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(current), Some(incoming)) => incoming < current,
        }
    }
}

/// Folds an incoming sample into the retained one.
///
/// Returns the sample that should be current after `incoming` arrives. The
/// retained accuracy never regresses, whatever order samples arrive in.
#[must_use]
pub fn retain_better(current: Option<LocationSample>, incoming: LocationSample) -> LocationSample {
    match current {
        Some(current) if !incoming.improves_on(&current) => current,
        _ => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(accuracy: Option<f64>) -> LocationSample {
        LocationSample::new(
            Coordinate::new(24.7136, 46.6753).expect("valid coordinate"),
            accuracy,
        )
    }

    #[test]
    fn first_sample_is_always_retained() {
        let kept = retain_better(None, sample(Some(500.0)));
        assert_eq!(kept.accuracy_meters, Some(500.0));
    }

    #[test]
    fn accuracy_never_regresses() {
        let mut current = None;
        let mut retained = Vec::new();
        for accuracy in [50.0, 30.0, 80.0, 10.0] {
            let kept = retain_better(current, sample(Some(accuracy)));
            retained.push(kept.accuracy_meters.unwrap());
            current = Some(kept);
        }
        assert_eq!(retained, vec![50.0, 30.0, 30.0, 10.0]);
    }

    #[test]
    fn equal_accuracy_keeps_the_existing_sample() {
        let first = LocationSample::new(Coordinate::new(1.0, 1.0).unwrap(), Some(20.0));
        let second = LocationSample::new(Coordinate::new(2.0, 2.0).unwrap(), Some(20.0));
        assert_eq!(retain_better(Some(first), second), first);
    }

    #[test]
    fn sample_without_accuracy_is_replaced_by_anything() {
        let kept = retain_better(Some(sample(None)), sample(Some(900.0)));
        assert_eq!(kept.accuracy_meters, Some(900.0));
    }

    #[test]
    fn sample_without_accuracy_does_not_replace_a_measured_one() {
        let kept = retain_better(Some(sample(Some(15.0))), sample(None));
        assert_eq!(kept.accuracy_meters, Some(15.0));
    }

    #[test]
    fn unusable_accuracy_is_treated_as_unknown() {
        assert_eq!(sample(Some(-5.0)).accuracy_meters, None);
        assert_eq!(sample(Some(f64::NAN)).accuracy_meters, None);
        assert_eq!(sample(Some(f64::INFINITY)).accuracy_meters, None);
        assert_eq!(sample(Some(0.0)).accuracy_meters, Some(0.0));
    }

    #[test]
    fn negative_accuracy_cannot_pin_the_retained_sample() {
        let kept = retain_better(Some(sample(Some(-1.0))), sample(Some(25.0)));
        assert_eq!(kept.accuracy_meters, Some(25.0));
        let kept = retain_better(Some(kept), sample(Some(10.0)));
        assert_eq!(kept.accuracy_meters, Some(10.0));
    }
}
