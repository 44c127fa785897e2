//! REST client and check-in orchestration for the attendance backend.

pub mod client;
pub mod desk;
pub mod error;
pub mod events;
mod retry;
pub mod types;

pub use client::AttendanceClient;
pub use desk::{AttendanceDesk, DeskError, Direction, Submission};
pub use error::{ClientError, FALLBACK_MESSAGE};
pub use events::{AttendanceEvent, EventBus};
pub use types::{BranchDto, CheckRequest};
