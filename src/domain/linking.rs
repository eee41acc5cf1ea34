//! Outcome of the post-registration student link step

use serde::Serialize;
use uuid::Uuid;

/// Result of trying to attach an existing student profile to a freshly
/// registered account. Reported explicitly in the registration response;
/// never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// An unlinked student matched and is now attached
    Linked { student_id: Uuid },
    /// The matched student already belongs to another account
    AlreadyLinked,
    /// Nothing matched the provided matricule
    NoMatch,
    /// No matricule was provided, so no link was attempted
    NotAttempted,
}
