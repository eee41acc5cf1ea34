use crate::storage::database::entities::{self, role};
use crate::storage::database::{is_unique_violation, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;

impl Database {
    pub async fn list_roles(&self) -> Result<Vec<role::Model>> {
        let roles = entities::Role::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?;
        Ok(roles)
    }

    pub async fn find_role(&self, role_id: i32) -> Result<Option<role::Model>> {
        Ok(entities::Role::find_by_id(role_id).one(&self.db).await?)
    }

    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<role::Model>> {
        let found = entities::Role::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn create_role(&self, name: &str) -> Result<role::Model> {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Role already exists")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn update_role(&self, role_id: i32, name: &str) -> Result<role::Model> {
        let existing = self
            .find_role(role_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Role not found"))?;

        let mut model: role::ActiveModel = existing.into();
        model.name = Set(name.to_string());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Role name already in use")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn delete_role(&self, role_id: i32) -> Result<()> {
        let existing = self
            .find_role(role_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Role not found"))?;
        entities::Role::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
