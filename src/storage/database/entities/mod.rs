//! SeaORM entities for the relational schema

pub mod audit_log;
pub mod bulletin;
pub mod filiere;
pub mod module;
pub mod note;
pub mod presence;
pub mod promotion;
pub mod resource;
pub mod role;
pub mod schedule;
pub mod seance;
pub mod student;
pub mod teacher;
pub mod user;

pub use audit_log::Entity as AuditLog;
pub use bulletin::Entity as Bulletin;
pub use filiere::Entity as Filiere;
pub use module::Entity as Module;
pub use note::Entity as Note;
pub use presence::Entity as Presence;
pub use promotion::Entity as Promotion;
pub use resource::Entity as Resource;
pub use role::Entity as Role;
pub use schedule::Entity as Schedule;
pub use seance::Entity as Seance;
pub use student::Entity as Student;
pub use teacher::Entity as Teacher;
pub use user::Entity as User;
