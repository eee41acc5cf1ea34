use crate::storage::database::entities::{self, schedule};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use uuid::Uuid;

impl Database {
    pub async fn list_schedules(&self) -> Result<Vec<schedule::Model>> {
        let schedules = entities::Schedule::find()
            .order_by_asc(schedule::Column::Start)
            .all(&self.db)
            .await?;
        Ok(schedules)
    }

    pub async fn list_schedules_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<schedule::Model>> {
        let schedules = entities::Schedule::find()
            .filter(schedule::Column::TeacherId.eq(teacher_id))
            .order_by_asc(schedule::Column::Start)
            .all(&self.db)
            .await?;
        Ok(schedules)
    }

    pub async fn list_schedules_by_promotion(
        &self,
        promotion_id: i32,
    ) -> Result<Vec<schedule::Model>> {
        let schedules = entities::Schedule::find()
            .filter(schedule::Column::PromotionId.eq(promotion_id))
            .order_by_asc(schedule::Column::Start)
            .all(&self.db)
            .await?;
        Ok(schedules)
    }

    pub async fn find_schedule(&self, schedule_id: Uuid) -> Result<Option<schedule::Model>> {
        Ok(entities::Schedule::find_by_id(schedule_id)
            .one(&self.db)
            .await?)
    }

    pub async fn create_schedule(&self, mut model: schedule::ActiveModel) -> Result<schedule::Model> {
        model.id = Set(Uuid::new_v4());
        model.created_at = Set(now());
        model.updated_at = Set(now());
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        mut changes: schedule::ActiveModel,
    ) -> Result<schedule::Model> {
        let existing = self
            .find_schedule(schedule_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Schedule not found"))?;

        changes.id = Set(existing.id);
        changes.created_at = Set(existing.created_at);
        changes.updated_at = Set(now());
        Ok(changes.update(&self.db).await?)
    }

    pub async fn delete_schedule(&self, schedule_id: Uuid) -> Result<()> {
        let existing = self
            .find_schedule(schedule_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Schedule not found"))?;
        entities::Schedule::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
