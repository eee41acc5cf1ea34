use crate::storage::database::entities::{self, bulletin, note, student, user};
use crate::storage::database::Database;
use crate::utils::error::Result;
use sea_orm::*;
use serde::Serialize;
use uuid::Uuid;

/// Global entity counts for the staff dashboard
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub students: u64,
    pub teachers: u64,
    pub modules: u64,
    pub notes: u64,
    pub bulletins: u64,
}

/// Personal counts for the student dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub notes_for_student: u64,
    pub bulletins_for_student: u64,
}

impl Database {
    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let students = entities::Student::find()
            .filter(student::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        let teachers = entities::Teacher::find().count(&self.db).await?;
        let modules = entities::Module::find().count(&self.db).await?;
        let notes = entities::Note::find().count(&self.db).await?;
        let bulletins = entities::Bulletin::find().count(&self.db).await?;

        Ok(GlobalStats {
            students,
            teachers,
            modules,
            notes,
            bulletins,
        })
    }

    pub async fn student_stats(&self, student_id: Uuid) -> Result<StudentStats> {
        let notes_for_student = entities::Note::find()
            .filter(note::Column::StudentId.eq(student_id))
            .count(&self.db)
            .await?;
        let bulletins_for_student = entities::Bulletin::find()
            .filter(bulletin::Column::StudentId.eq(student_id))
            .count(&self.db)
            .await?;

        Ok(StudentStats {
            notes_for_student,
            bulletins_for_student,
        })
    }

    /// Count of live user accounts; seed tooling uses it for a sanity report
    pub async fn count_users(&self) -> Result<u64> {
        let count = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
