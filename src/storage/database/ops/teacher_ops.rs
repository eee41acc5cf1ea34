use crate::storage::database::entities::{self, teacher, user};
use crate::storage::database::{is_unique_violation, now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use uuid::Uuid;

impl Database {
    /// List teachers with their linked user accounts
    pub async fn list_teachers(&self) -> Result<Vec<(teacher::Model, Option<user::Model>)>> {
        let teachers = entities::Teacher::find()
            .find_also_related(entities::User)
            .order_by_asc(teacher::Column::Nom)
            .all(&self.db)
            .await?;
        Ok(teachers)
    }

    pub async fn find_teacher(&self, teacher_id: Uuid) -> Result<Option<teacher::Model>> {
        Ok(entities::Teacher::find_by_id(teacher_id)
            .one(&self.db)
            .await?)
    }

    pub async fn find_teacher_with_user(
        &self,
        teacher_id: Uuid,
    ) -> Result<Option<(teacher::Model, Option<user::Model>)>> {
        let found = entities::Teacher::find_by_id(teacher_id)
            .find_also_related(entities::User)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn find_teacher_by_user_id(&self, user_id: Uuid) -> Result<Option<teacher::Model>> {
        let found = entities::Teacher::find()
            .filter(teacher::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn create_teacher(
        &self,
        nom: String,
        prenom: Option<String>,
        grade: Option<String>,
        specialite: Option<String>,
        user_id: Option<Uuid>,
    ) -> Result<teacher::Model> {
        let model = teacher::ActiveModel {
            id: Set(Uuid::new_v4()),
            nom: Set(nom),
            prenom: Set(prenom),
            grade: Set(grade),
            specialite: Set(specialite),
            user_id: Set(user_id),
            photo_url: Set(None),
            created_at: Set(now()),
            updated_at: Set(now()),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("This user is already linked to another teacher")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn update_teacher(
        &self,
        teacher_id: Uuid,
        nom: Option<String>,
        prenom: Option<Option<String>>,
        grade: Option<Option<String>>,
        specialite: Option<Option<String>>,
        user_id: Option<Option<Uuid>>,
    ) -> Result<teacher::Model> {
        let existing = self
            .find_teacher(teacher_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

        let mut model: teacher::ActiveModel = existing.into();
        if let Some(nom) = nom {
            model.nom = Set(nom);
        }
        if let Some(prenom) = prenom {
            model.prenom = Set(prenom);
        }
        if let Some(grade) = grade {
            model.grade = Set(grade);
        }
        if let Some(specialite) = specialite {
            model.specialite = Set(specialite);
        }
        if let Some(user_id) = user_id {
            model.user_id = Set(user_id);
        }
        model.updated_at = Set(now());

        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("This user is already linked to another teacher")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn delete_teacher(&self, teacher_id: Uuid) -> Result<()> {
        let existing = self
            .find_teacher(teacher_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Teacher not found"))?;
        entities::Teacher::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Link a teacher profile to a user account; the unique index on
    /// `teachers.user_id` is the final arbiter for races
    pub async fn link_teacher_to_user(
        &self,
        teacher_id: Uuid,
        user_id: Uuid,
    ) -> Result<teacher::Model> {
        let teacher = self
            .find_teacher(teacher_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

        if let Some(existing) = self.find_teacher_by_user_id(user_id).await? {
            if existing.id != teacher.id {
                return Err(ApiError::conflict(
                    "This user is already linked to another teacher",
                ));
            }
        }

        let mut model: teacher::ActiveModel = teacher.into();
        model.user_id = Set(Some(user_id));
        model.updated_at = Set(now());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("This user is already linked to another teacher")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn set_teacher_photo(&self, teacher_id: Uuid, photo_url: &str) -> Result<teacher::Model> {
        let existing = self
            .find_teacher(teacher_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

        let mut model: teacher::ActiveModel = existing.into();
        model.photo_url = Set(Some(photo_url.to_string()));
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }
}
