//! Domain types shared by handlers and the storage layer

pub mod grading;
pub mod linking;
pub mod roles;

pub use grading::weighted_score;
pub use linking::LinkOutcome;
pub use roles::RoleKind;
