//! Resource scoping
//!
//! Entity-instance ownership checks layered under the role gates: "may THIS
//! caller act on THIS row", not just "does this caller hold an allowed
//! role". Existence is checked before ownership, so callers learn that a row
//! is missing but never whose it is.

use crate::auth::identity::{AuthSession, Identity};
use crate::storage::database::entities::module;
use crate::storage::Database;
use crate::utils::error::{ApiError, Result};
use uuid::Uuid;

/// Resolve a module and authorize the caller against it.
///
/// Admin-family callers bypass ownership; a teacher passes only for modules
/// whose teacher reference equals their own profile id. Callers gated as
/// teachers but with no linked profile get the explicit "not linked"
/// condition, and students never reach module mutation paths.
pub async fn authorize_module(
    db: &Database,
    session: &AuthSession,
    module_id: Uuid,
) -> Result<module::Model> {
    let module = db
        .find_module(module_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Module not found"))?;

    match &session.identity {
        Identity::Admin | Identity::Staff(_) => Ok(module),
        Identity::Teacher(profile) => {
            if module.teacher_id == Some(profile.id) {
                Ok(module)
            } else {
                Err(ApiError::not_owner("You do not teach this module"))
            }
        }
        Identity::UnlinkedTeacher => Err(ApiError::profile_not_linked(
            "No teacher profile is linked to this account yet",
        )),
        _ => Err(ApiError::forbidden(
            "Reserved for administration or teachers",
        )),
    }
}
