//! Scripted position provider.
//!
//! Replays fixes and failures from a JSON script so the full acquisition flow
//! can run without a GPS receiver:
//!
//! ```json
//! {
//!   "fixes": [
//!     { "kind": "fail", "error": "timeout" },
//!     { "kind": "fix", "latitude": 24.7136, "longitude": 46.6753, "accuracy": 35.0 }
//!   ],
//!   "watch": [
//!     { "kind": "fix", "latitude": 24.7137, "longitude": 46.6754, "accuracy": 12.0, "delay_ms": 1000 }
//!   ]
//! }
//! ```
//!
//! `fixes` answers one-shot requests in order; `watch` feeds the continuous
//! stream. An exhausted `fixes` queue reports the position as unavailable, an
//! exhausted `watch` queue simply goes quiet.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use attend_core::{Coordinate, LocationSample};
use futures::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;

use crate::error::LocationError;
use crate::provider::{PositionOptions, PositionProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayFailure {
    PermissionDenied,
    InsecureOrigin,
    Unavailable,
    Timeout,
}

impl From<ReplayFailure> for LocationError {
    fn from(failure: ReplayFailure) -> Self {
        match failure {
            ReplayFailure::PermissionDenied => LocationError::PermissionDenied {
                insecure_origin: false,
            },
            ReplayFailure::InsecureOrigin => LocationError::PermissionDenied {
                insecure_origin: true,
            },
            ReplayFailure::Unavailable => {
                LocationError::PositionUnavailable("replayed outage".to_owned())
            }
            ReplayFailure::Timeout => LocationError::Timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayStep {
    Fix {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        accuracy: Option<f64>,
        #[serde(default)]
        delay_ms: u64,
    },
    Fail {
        error: ReplayFailure,
        #[serde(default)]
        delay_ms: u64,
    },
    /// Never answers; only the session timeout ends the request.
    Hang,
}

impl ReplayStep {
    async fn play(self) -> Result<LocationSample, LocationError> {
        match self {
            ReplayStep::Fix {
                latitude,
                longitude,
                accuracy,
                delay_ms,
            } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                let coordinate = Coordinate::new(latitude, longitude)
                    .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;
                Ok(LocationSample::new(coordinate, accuracy))
            }
            ReplayStep::Fail { error, delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Err(error.into())
            }
            ReplayStep::Hang => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub fixes: Vec<ReplayStep>,
    #[serde(default)]
    pub watch: Vec<ReplayStep>,
}

impl ReplayScript {
    /// Reads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`std::io::ErrorKind::InvalidData`] if it is not a valid script.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Provider that plays back a [`ReplayScript`].
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    fixes: Arc<Mutex<VecDeque<ReplayStep>>>,
    watch: Arc<Mutex<VecDeque<ReplayStep>>>,
    fix_requests: Arc<Mutex<Vec<PositionOptions>>>,
}

impl ReplayProvider {
    #[must_use]
    pub fn new(script: ReplayScript) -> Self {
        Self {
            fixes: Arc::new(Mutex::new(script.fixes.into())),
            watch: Arc::new(Mutex::new(script.watch.into())),
            fix_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Options of every one-shot request received so far, in order.
    #[must_use]
    pub fn fix_requests(&self) -> Vec<PositionOptions> {
        self.fix_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PositionProvider for ReplayProvider {
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<LocationSample, LocationError> {
        self.fix_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options);
        let step = self
            .fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match step {
            Some(step) => step.play().await,
            None => Err(LocationError::PositionUnavailable(
                "replay script exhausted".to_owned(),
            )),
        }
    }

    fn watch_position(
        &self,
        _options: PositionOptions,
    ) -> BoxStream<'static, Result<LocationSample, LocationError>> {
        let queue = Arc::clone(&self.watch);
        stream::unfold(queue, |queue| async move {
            let step = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()?;
            let item = step.play().await;
            Some((item, queue))
        })
        .chain(stream::pending())
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "fixes": [
            { "kind": "fail", "error": "insecure_origin" },
            { "kind": "fix", "latitude": 24.7136, "longitude": 46.6753, "accuracy": 35.0 },
            { "kind": "hang" }
        ],
        "watch": [
            { "kind": "fix", "latitude": 24.7137, "longitude": 46.6754 }
        ]
    }"#;

    fn options() -> PositionOptions {
        PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(30),
            maximum_age: Duration::ZERO,
        }
    }

    #[test]
    fn parses_all_step_kinds() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(script.fixes.len(), 3);
        assert_eq!(script.fixes[2], ReplayStep::Hang);
        assert!(matches!(
            script.watch[0],
            ReplayStep::Fix {
                accuracy: None,
                delay_ms: 0,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn fixes_are_served_in_order() {
        let provider = ReplayProvider::new(serde_json::from_str(SCRIPT).unwrap());
        let first = provider.current_position(options()).await;
        assert_eq!(
            first,
            Err(LocationError::PermissionDenied {
                insecure_origin: true
            })
        );
        let second = provider.current_position(options()).await.unwrap();
        assert_eq!(second.accuracy_meters, Some(35.0));
        assert_eq!(provider.fix_requests().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_reports_unavailable() {
        let provider = ReplayProvider::new(ReplayScript::default());
        let result = provider.current_position(options()).await;
        assert!(matches!(result, Err(LocationError::PositionUnavailable(_))));
    }

    #[tokio::test]
    async fn invalid_coordinates_surface_as_unavailable() {
        let provider = ReplayProvider::new(ReplayScript {
            fixes: vec![ReplayStep::Fix {
                latitude: 123.0,
                longitude: 0.0,
                accuracy: None,
                delay_ms: 0,
            }],
            watch: Vec::new(),
        });
        let result = provider.current_position(options()).await;
        assert!(matches!(result, Err(LocationError::PositionUnavailable(_))));
    }

    #[tokio::test]
    async fn watch_stream_yields_scripted_samples() {
        let provider = ReplayProvider::new(serde_json::from_str(SCRIPT).unwrap());
        let mut stream = provider.watch_position(options());
        let first = stream.next().await.unwrap().unwrap();
        assert!((first.coordinate.latitude() - 24.7137).abs() < 1e-9);
    }

    #[tokio::test]
    async fn negative_replayed_accuracy_is_dropped() {
        let provider = ReplayProvider::new(ReplayScript {
            fixes: vec![ReplayStep::Fix {
                latitude: 24.7136,
                longitude: 46.6753,
                accuracy: Some(-3.0),
                delay_ms: 0,
            }],
            watch: vec![],
        });
        let sample = provider.current_position(options()).await.unwrap();
        assert_eq!(sample.accuracy_meters, None);
    }
}
