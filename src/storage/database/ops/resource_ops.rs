use crate::storage::database::entities::{self, resource};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use uuid::Uuid;

impl Database {
    pub async fn list_resources(&self) -> Result<Vec<resource::Model>> {
        let resources = entities::Resource::find()
            .order_by_desc(resource::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(resources)
    }

    pub async fn list_resources_by_module(&self, module_id: Uuid) -> Result<Vec<resource::Model>> {
        let resources = entities::Resource::find()
            .filter(resource::Column::ModuleId.eq(module_id))
            .order_by_desc(resource::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(resources)
    }

    pub async fn find_resource(&self, resource_id: Uuid) -> Result<Option<resource::Model>> {
        Ok(entities::Resource::find_by_id(resource_id)
            .one(&self.db)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_resource(
        &self,
        title: String,
        kind: String,
        url: String,
        description: Option<String>,
        module_id: Option<Uuid>,
        uploaded_by: Option<Uuid>,
    ) -> Result<resource::Model> {
        let model = resource::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            kind: Set(kind),
            url: Set(url),
            description: Set(description),
            module_id: Set(module_id),
            uploaded_by: Set(uploaded_by),
            created_at: Set(now()),
            updated_at: Set(now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_resource(
        &self,
        resource_id: Uuid,
        title: Option<String>,
        kind: Option<String>,
        url: Option<String>,
        description: Option<Option<String>>,
    ) -> Result<resource::Model> {
        let existing = self
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Resource not found"))?;

        let mut model: resource::ActiveModel = existing.into();
        if let Some(title) = title {
            model.title = Set(title);
        }
        if let Some(kind) = kind {
            model.kind = Set(kind);
        }
        if let Some(url) = url {
            model.url = Set(url);
        }
        if let Some(description) = description {
            model.description = Set(description);
        }
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_resource(&self, resource_id: Uuid) -> Result<()> {
        let existing = self
            .find_resource(resource_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Resource not found"))?;
        entities::Resource::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
