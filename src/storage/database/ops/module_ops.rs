use crate::storage::database::entities::{self, filiere, module, promotion, teacher};
use crate::storage::database::{is_unique_violation, now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Module row joined with its teacher, promotion and filière
pub type ModuleDetail = (
    module::Model,
    Option<teacher::Model>,
    Option<promotion::Model>,
    Option<filiere::Model>,
);

impl Database {
    pub async fn list_modules(&self) -> Result<Vec<ModuleDetail>> {
        let modules = entities::Module::find()
            .find_also_related(entities::Teacher)
            .order_by_desc(module::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.hydrate_modules(modules).await
    }

    /// Modules owned by a teacher profile, ordered by semester then title
    pub async fn list_modules_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<ModuleDetail>> {
        let modules = entities::Module::find()
            .filter(module::Column::TeacherId.eq(teacher_id))
            .find_also_related(entities::Teacher)
            .order_by_asc(module::Column::Semester)
            .order_by_asc(module::Column::Title)
            .all(&self.db)
            .await?;
        self.hydrate_modules(modules).await
    }

    /// Modules taught to a promotion, ordered by title
    pub async fn list_modules_by_promotion(&self, promotion_id: i32) -> Result<Vec<ModuleDetail>> {
        let modules = entities::Module::find()
            .filter(module::Column::PromotionId.eq(promotion_id))
            .find_also_related(entities::Teacher)
            .order_by_asc(module::Column::Title)
            .all(&self.db)
            .await?;
        self.hydrate_modules(modules).await
    }

    async fn hydrate_modules(
        &self,
        modules: Vec<(module::Model, Option<teacher::Model>)>,
    ) -> Result<Vec<ModuleDetail>> {
        let promotion_ids: Vec<i32> = modules.iter().filter_map(|(m, _)| m.promotion_id).collect();
        let promotions: HashMap<i32, promotion::Model> = entities::Promotion::find()
            .filter(promotion::Column::Id.is_in(promotion_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let filiere_ids: Vec<i32> = promotions.values().filter_map(|p| p.filiere_id).collect();
        let filieres: HashMap<i32, filiere::Model> = entities::Filiere::find()
            .filter(filiere::Column::Id.is_in(filiere_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        Ok(modules
            .into_iter()
            .map(|(m, t)| {
                let p = m.promotion_id.and_then(|id| promotions.get(&id).cloned());
                let f = p
                    .as_ref()
                    .and_then(|p| p.filiere_id)
                    .and_then(|id| filieres.get(&id).cloned());
                (m, t, p, f)
            })
            .collect())
    }

    pub async fn find_module(&self, module_id: Uuid) -> Result<Option<module::Model>> {
        Ok(entities::Module::find_by_id(module_id).one(&self.db).await?)
    }

    pub async fn find_module_detail(&self, module_id: Uuid) -> Result<Option<ModuleDetail>> {
        let found = entities::Module::find_by_id(module_id)
            .find_also_related(entities::Teacher)
            .one(&self.db)
            .await?;
        match found {
            Some(pair) => Ok(self.hydrate_modules(vec![pair]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    pub async fn find_module_by_code(&self, code: &str) -> Result<Option<module::Model>> {
        let found = entities::Module::find()
            .filter(module::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_module(
        &self,
        title: String,
        code: String,
        description: Option<String>,
        credits: i32,
        semester: i32,
        coefficient: f32,
        is_optional: bool,
        teacher_id: Option<Uuid>,
        promotion_id: Option<i32>,
        filiere_id: Option<i32>,
    ) -> Result<module::Model> {
        let model = module::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            code: Set(code),
            description: Set(description),
            credits: Set(credits),
            semester: Set(semester),
            coefficient: Set(coefficient),
            is_optional: Set(is_optional),
            teacher_id: Set(teacher_id),
            promotion_id: Set(promotion_id),
            filiere_id: Set(filiere_id),
            created_at: Set(now()),
            updated_at: Set(now()),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Module code already exists")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn update_module(
        &self,
        module_id: Uuid,
        changes: module::ActiveModel,
    ) -> Result<module::Model> {
        let existing = self
            .find_module(module_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Module not found"))?;

        let mut model = changes;
        model.id = Set(existing.id);
        model.updated_at = Set(now());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Module code already exists")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn delete_module(&self, module_id: Uuid) -> Result<()> {
        let existing = self
            .find_module(module_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Module not found"))?;
        entities::Module::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
