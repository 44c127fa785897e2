//! Position provider seam.
//!
//! A provider turns platform geolocation into a future for one-shot fixes and
//! a stream for continuous updates. Dropping either cancels the underlying
//! request; the session relies on that for teardown.

use std::future::Future;
use std::time::Duration;

use attend_core::LocationSample;
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::LocationError;

/// Request options mirroring the platform geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the provider may return instead of a fresh one.
    pub maximum_age: Duration,
}

pub trait PositionProvider: Send + Sync + 'static {
    /// Requests a single fix.
    ///
    /// The session enforces `options.timeout` itself, so implementations may
    /// ignore it.
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<LocationSample, LocationError>> + Send;

    /// Starts continuous updates. The stream ends the watch when dropped.
    fn watch_position(
        &self,
        options: PositionOptions,
    ) -> BoxStream<'static, Result<LocationSample, LocationError>>;
}

/// Provider that always reports the same sample.
///
/// Used for kiosks with a surveyed position and for command-line overrides.
#[derive(Debug, Clone, Copy)]
pub struct FixedProvider {
    sample: LocationSample,
}

impl FixedProvider {
    #[must_use]
    pub fn new(sample: LocationSample) -> Self {
        Self { sample }
    }
}

impl PositionProvider for FixedProvider {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<LocationSample, LocationError> {
        Ok(self.sample)
    }

    fn watch_position(
        &self,
        _options: PositionOptions,
    ) -> BoxStream<'static, Result<LocationSample, LocationError>> {
        stream::once(futures::future::ready(Ok(self.sample)))
            .chain(stream::pending())
            .boxed()
    }
}
