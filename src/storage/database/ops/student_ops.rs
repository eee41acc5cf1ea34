use crate::storage::database::entities::{self, filiere, promotion, student, user};
use crate::storage::database::{is_unique_violation, now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Student row joined with its promotion (plus filière) and linked account
pub type StudentDetail = (
    student::Model,
    Option<promotion::Model>,
    Option<filiere::Model>,
    Option<user::Model>,
);

impl Database {
    /// List live students with promotion, filière and linked user
    pub async fn list_students(&self) -> Result<Vec<StudentDetail>> {
        let students = entities::Student::find()
            .filter(student::Column::DeletedAt.is_null())
            .find_also_related(entities::Promotion)
            .order_by_asc(student::Column::Nom)
            .all(&self.db)
            .await?;
        self.hydrate_students(students).await
    }

    /// Students of one promotion
    pub async fn list_students_by_promotion(
        &self,
        promotion_id: i32,
    ) -> Result<Vec<StudentDetail>> {
        let students = entities::Student::find()
            .filter(student::Column::DeletedAt.is_null())
            .filter(student::Column::PromotionId.eq(promotion_id))
            .find_also_related(entities::Promotion)
            .order_by_asc(student::Column::Nom)
            .all(&self.db)
            .await?;
        self.hydrate_students(students).await
    }

    async fn hydrate_students(
        &self,
        students: Vec<(student::Model, Option<promotion::Model>)>,
    ) -> Result<Vec<StudentDetail>> {
        let filiere_ids: Vec<i32> = students
            .iter()
            .filter_map(|(_, p)| p.as_ref().and_then(|p| p.filiere_id))
            .collect();
        let user_ids: Vec<Uuid> = students.iter().filter_map(|(s, _)| s.user_id).collect();

        let filieres: HashMap<i32, filiere::Model> = entities::Filiere::find()
            .filter(filiere::Column::Id.is_in(filiere_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let users: HashMap<Uuid, user::Model> = entities::User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .filter(user::Column::DeletedAt.is_null())
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(students
            .into_iter()
            .map(|(s, p)| {
                let f = p
                    .as_ref()
                    .and_then(|p| p.filiere_id)
                    .and_then(|id| filieres.get(&id).cloned());
                let u = s.user_id.and_then(|id| users.get(&id).cloned());
                (s, p, f, u)
            })
            .collect())
    }

    pub async fn find_student(&self, student_id: Uuid) -> Result<Option<student::Model>> {
        let found = entities::Student::find_by_id(student_id)
            .filter(student::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Student joined to a given user account
    pub async fn find_student_by_user_id(&self, user_id: Uuid) -> Result<Option<student::Model>> {
        let found = entities::Student::find()
            .filter(student::Column::DeletedAt.is_null())
            .filter(student::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn find_student_by_matricule(
        &self,
        matricule: &str,
    ) -> Result<Option<student::Model>> {
        let found = entities::Student::find()
            .filter(student::Column::DeletedAt.is_null())
            .filter(student::Column::Matricule.eq(matricule))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_student(
        &self,
        matricule: String,
        nom: String,
        prenom: Option<String>,
        sexe: Option<String>,
        date_naissance: Option<chrono::NaiveDate>,
        lieu_naissance: Option<String>,
        grade: Option<String>,
        etat_dossier: Option<String>,
        promotion_id: i32,
        user_id: Option<Uuid>,
        photo_url: Option<String>,
    ) -> Result<student::Model> {
        let model = student::ActiveModel {
            id: Set(Uuid::new_v4()),
            matricule: Set(matricule),
            nom: Set(nom),
            prenom: Set(prenom),
            sexe: Set(sexe),
            date_naissance: Set(date_naissance),
            lieu_naissance: Set(lieu_naissance),
            grade: Set(grade),
            etat_dossier: Set(etat_dossier.unwrap_or_else(|| "en_cours".to_string())),
            user_id: Set(user_id),
            promotion_id: Set(promotion_id),
            photo_url: Set(photo_url),
            deleted_at: Set(None),
            created_at: Set(now()),
            updated_at: Set(now()),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Matricule already exists or user already linked")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn update_student(
        &self,
        student_id: Uuid,
        changes: student::ActiveModel,
    ) -> Result<student::Model> {
        let existing = self
            .find_student(student_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Student not found"))?;

        let mut model = changes;
        model.id = Set(existing.id);
        model.updated_at = Set(now());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Matricule already exists or user already linked")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn soft_delete_student(&self, student_id: Uuid) -> Result<()> {
        let existing = self
            .find_student(student_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Student not found"))?;

        let mut model: student::ActiveModel = existing.into();
        model.deleted_at = Set(Some(now()));
        model.updated_at = Set(now());
        model.update(&self.db).await?;
        Ok(())
    }

    /// Link a student profile to a user account.
    ///
    /// The existence pre-check is best-effort; the unique index on
    /// `students.user_id` decides concurrent attempts and surfaces as a 409.
    pub async fn link_student_to_user(
        &self,
        student_id: Uuid,
        user_id: Uuid,
    ) -> Result<student::Model> {
        let student = self
            .find_student(student_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Student not found"))?;

        if let Some(existing) = self.find_student_by_user_id(user_id).await? {
            if existing.id != student.id {
                return Err(ApiError::conflict(
                    "This user is already linked to another student",
                ));
            }
        }

        let mut model: student::ActiveModel = student.into();
        model.user_id = Set(Some(user_id));
        model.updated_at = Set(now());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("This user is already linked to another student")
            } else {
                ApiError::Database(e)
            }
        })
    }
}
