use crate::storage::database::entities::{self, module, presence, seance};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use uuid::Uuid;

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub async fn create_seance(
        &self,
        module_id: Uuid,
        teacher_id: Option<Uuid>,
        date: chrono::NaiveDate,
        titre: Option<String>,
        heure_debut: Option<String>,
        heure_fin: Option<String>,
    ) -> Result<seance::Model> {
        let model = seance::ActiveModel {
            id: Set(Uuid::new_v4()),
            module_id: Set(module_id),
            teacher_id: Set(teacher_id),
            date: Set(date),
            titre: Set(titre.or_else(|| Some(format!("Séance du {}", date)))),
            heure_debut: Set(heure_debut.unwrap_or_else(|| "08:00:00".to_string())),
            heure_fin: Set(heure_fin.unwrap_or_else(|| "10:00:00".to_string())),
            created_at: Set(now()),
            updated_at: Set(now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_seance(&self, seance_id: Uuid) -> Result<Option<seance::Model>> {
        Ok(entities::Seance::find_by_id(seance_id).one(&self.db).await?)
    }

    pub async fn find_seance_with_module(
        &self,
        seance_id: Uuid,
    ) -> Result<Option<(seance::Model, Option<module::Model>)>> {
        let found = entities::Seance::find_by_id(seance_id)
            .find_also_related(entities::Module)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Séance of a module on a given date, if one exists
    pub async fn find_seance_by_module_and_date(
        &self,
        module_id: Uuid,
        date: chrono::NaiveDate,
    ) -> Result<Option<seance::Model>> {
        let found = entities::Seance::find()
            .filter(seance::Column::ModuleId.eq(module_id))
            .filter(seance::Column::Date.eq(date))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn list_seances_by_module(&self, module_id: Uuid) -> Result<Vec<seance::Model>> {
        let seances = entities::Seance::find()
            .filter(seance::Column::ModuleId.eq(module_id))
            .order_by_desc(seance::Column::Date)
            .all(&self.db)
            .await?;
        Ok(seances)
    }

    pub async fn update_seance(
        &self,
        seance_id: Uuid,
        date: Option<chrono::NaiveDate>,
        titre: Option<Option<String>>,
        heure_debut: Option<String>,
        heure_fin: Option<String>,
    ) -> Result<seance::Model> {
        let existing = self
            .find_seance(seance_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Séance not found"))?;

        let mut model: seance::ActiveModel = existing.into();
        if let Some(date) = date {
            model.date = Set(date);
        }
        if let Some(titre) = titre {
            model.titre = Set(titre);
        }
        if let Some(heure_debut) = heure_debut {
            model.heure_debut = Set(heure_debut);
        }
        if let Some(heure_fin) = heure_fin {
            model.heure_fin = Set(heure_fin);
        }
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    /// Delete a séance together with its presences, atomically
    pub async fn delete_seance(&self, seance_id: Uuid) -> Result<()> {
        let existing = self
            .find_seance(seance_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Séance not found"))?;

        let txn = self.db.begin().await?;
        entities::Presence::delete_many()
            .filter(presence::Column::SeanceId.eq(existing.id))
            .exec(&txn)
            .await?;
        entities::Seance::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}
