use crate::storage::database::entities::{self, filiere, promotion};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;

impl Database {
    /// List promotions with their filière, newest year first
    pub async fn list_promotions(
        &self,
    ) -> Result<Vec<(promotion::Model, Option<filiere::Model>)>> {
        let promotions = entities::Promotion::find()
            .find_also_related(entities::Filiere)
            .order_by_desc(promotion::Column::Annee)
            .all(&self.db)
            .await?;
        Ok(promotions)
    }

    pub async fn list_promotions_by_filiere(
        &self,
        filiere_id: i32,
    ) -> Result<Vec<promotion::Model>> {
        let promotions = entities::Promotion::find()
            .filter(promotion::Column::FiliereId.eq(filiere_id))
            .order_by_desc(promotion::Column::Annee)
            .all(&self.db)
            .await?;
        Ok(promotions)
    }

    pub async fn find_promotion(&self, promotion_id: i32) -> Result<Option<promotion::Model>> {
        Ok(entities::Promotion::find_by_id(promotion_id)
            .one(&self.db)
            .await?)
    }

    pub async fn find_promotion_with_filiere(
        &self,
        promotion_id: i32,
    ) -> Result<Option<(promotion::Model, Option<filiere::Model>)>> {
        let found = entities::Promotion::find_by_id(promotion_id)
            .find_also_related(entities::Filiere)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn first_promotion(&self) -> Result<Option<promotion::Model>> {
        let found = entities::Promotion::find()
            .order_by_asc(promotion::Column::Id)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn create_promotion(
        &self,
        nom: String,
        annee: i32,
        filiere_id: Option<i32>,
    ) -> Result<promotion::Model> {
        let model = promotion::ActiveModel {
            nom: Set(nom),
            annee: Set(annee),
            filiere_id: Set(filiere_id),
            created_at: Set(now()),
            updated_at: Set(now()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_promotion(
        &self,
        promotion_id: i32,
        nom: Option<String>,
        annee: Option<i32>,
        filiere_id: Option<Option<i32>>,
    ) -> Result<promotion::Model> {
        let existing = self
            .find_promotion(promotion_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Promotion not found"))?;

        let mut model: promotion::ActiveModel = existing.into();
        if let Some(nom) = nom {
            model.nom = Set(nom);
        }
        if let Some(annee) = annee {
            model.annee = Set(annee);
        }
        if let Some(filiere_id) = filiere_id {
            model.filiere_id = Set(filiere_id);
        }
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_promotion(&self, promotion_id: i32) -> Result<()> {
        let existing = self
            .find_promotion(promotion_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Promotion not found"))?;
        entities::Promotion::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
