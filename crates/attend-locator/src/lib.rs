//! Location acquisition for attendance check-in.
//!
//! The acquisition policy is a pure state machine ([`engine::Acquisition`])
//! driven by an async session ([`session::LocatorSession`]) that talks to a
//! pluggable [`provider::PositionProvider`]. The split keeps retry, backoff
//! and best-sample rules testable without timers or devices.

pub mod backoff;
pub mod engine;
pub mod error;
pub mod provider;
pub mod replay;
pub mod session;

pub use backoff::retry_delay;
pub use engine::{Acquisition, AcquisitionConfig, Command, Event, Phase};
pub use error::{LocationError, LocatorError};
pub use provider::{FixedProvider, PositionOptions, PositionProvider};
pub use replay::{ReplayProvider, ReplayScript, ReplayStep};
pub use session::{LocatorSession, LocatorSnapshot};
