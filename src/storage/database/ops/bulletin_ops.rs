use crate::storage::database::entities::{self, bulletin, student};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use uuid::Uuid;

impl Database {
    pub async fn list_bulletins(
        &self,
    ) -> Result<Vec<(bulletin::Model, Option<student::Model>)>> {
        let bulletins = entities::Bulletin::find()
            .find_also_related(entities::Student)
            .order_by_desc(bulletin::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(bulletins)
    }

    pub async fn find_bulletin(
        &self,
        bulletin_id: Uuid,
    ) -> Result<Option<(bulletin::Model, Option<student::Model>)>> {
        let found = entities::Bulletin::find_by_id(bulletin_id)
            .find_also_related(entities::Student)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn create_bulletin(
        &self,
        term: String,
        average: Option<f32>,
        student_id: Option<Uuid>,
    ) -> Result<bulletin::Model> {
        let model = bulletin::ActiveModel {
            id: Set(Uuid::new_v4()),
            term: Set(term),
            average: Set(average),
            student_id: Set(student_id),
            created_at: Set(now()),
            updated_at: Set(now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_bulletin(
        &self,
        bulletin_id: Uuid,
        term: Option<String>,
        average: Option<Option<f32>>,
        student_id: Option<Option<Uuid>>,
    ) -> Result<bulletin::Model> {
        let (existing, _) = self
            .find_bulletin(bulletin_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Bulletin not found"))?;

        let mut model: bulletin::ActiveModel = existing.into();
        if let Some(term) = term {
            model.term = Set(term);
        }
        if let Some(average) = average {
            model.average = Set(average);
        }
        if let Some(student_id) = student_id {
            model.student_id = Set(student_id);
        }
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_bulletin(&self, bulletin_id: Uuid) -> Result<()> {
        let (existing, _) = self
            .find_bulletin(bulletin_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Bulletin not found"))?;
        entities::Bulletin::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
