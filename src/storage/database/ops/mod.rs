// Per-entity query operations on `Database`
mod audit_ops;
mod bulletin_ops;
mod filiere_ops;
mod module_ops;
mod note_ops;
mod presence_ops;
mod promotion_ops;
mod resource_ops;
mod role_ops;
mod schedule_ops;
mod seance_ops;
mod stats_ops;
mod student_ops;
mod teacher_ops;
mod user_ops;

pub use module_ops::ModuleDetail;
pub use note_ops::{NoteDetail, NoteFilter};
pub use presence_ops::{PresenceDetail, PresenceStats};
pub use stats_ops::{GlobalStats, StudentStats};
pub use student_ops::StudentDetail;
pub use user_ops::NewUser;
