use crate::storage::database::entities::{self, filiere};
use crate::storage::database::{is_unique_violation, now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;

impl Database {
    pub async fn list_filieres(&self) -> Result<Vec<filiere::Model>> {
        let filieres = entities::Filiere::find()
            .order_by_desc(filiere::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(filieres)
    }

    pub async fn find_filiere(&self, filiere_id: i32) -> Result<Option<filiere::Model>> {
        Ok(entities::Filiere::find_by_id(filiere_id)
            .one(&self.db)
            .await?)
    }

    pub async fn find_filiere_by_name(&self, nom: &str) -> Result<Option<filiere::Model>> {
        let found = entities::Filiere::find()
            .filter(filiere::Column::Nom.eq(nom))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn create_filiere(
        &self,
        nom: String,
        description: Option<String>,
    ) -> Result<filiere::Model> {
        let model = filiere::ActiveModel {
            nom: Set(nom),
            description: Set(description),
            created_at: Set(now()),
            updated_at: Set(now()),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Filière already exists")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn update_filiere(
        &self,
        filiere_id: i32,
        nom: Option<String>,
        description: Option<String>,
    ) -> Result<filiere::Model> {
        let existing = self
            .find_filiere(filiere_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Filière not found"))?;

        let mut model: filiere::ActiveModel = existing.into();
        if let Some(nom) = nom {
            model.nom = Set(nom);
        }
        if let Some(description) = description {
            model.description = Set(Some(description));
        }
        model.updated_at = Set(now());
        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Filière name already in use")
            } else {
                ApiError::Database(e)
            }
        })
    }

    pub async fn delete_filiere(&self, filiere_id: i32) -> Result<()> {
        let existing = self
            .find_filiere(filiere_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Filière not found"))?;
        entities::Filiere::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
