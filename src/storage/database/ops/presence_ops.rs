use crate::storage::database::entities::{self, module, presence, seance, student};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Presence row joined with its student and séance
pub type PresenceDetail = (
    presence::Model,
    Option<student::Model>,
    Option<seance::Model>,
);

/// Attendance counters for a module or séance
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PresenceStats {
    pub total: u64,
    pub present: u64,
    pub absent: u64,
    pub retard: u64,
}

fn stats_from(rows: &[presence::Model]) -> PresenceStats {
    PresenceStats {
        total: rows.len() as u64,
        present: rows.iter().filter(|p| p.statut == "present").count() as u64,
        absent: rows.iter().filter(|p| p.statut == "absent").count() as u64,
        retard: rows.iter().filter(|p| p.statut == "retard").count() as u64,
    }
}

impl Database {
    pub async fn find_presence(&self, presence_id: Uuid) -> Result<Option<presence::Model>> {
        Ok(entities::Presence::find_by_id(presence_id)
            .one(&self.db)
            .await?)
    }

    /// Existing presence row for one student at one séance of a module
    pub async fn find_presence_for_seance(
        &self,
        student_id: Uuid,
        module_id: Uuid,
        seance_id: Uuid,
    ) -> Result<Option<presence::Model>> {
        let found = entities::Presence::find()
            .filter(presence::Column::StudentId.eq(student_id))
            .filter(presence::Column::ModuleId.eq(module_id))
            .filter(presence::Column::SeanceId.eq(seance_id))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_presence(
        &self,
        student_id: Uuid,
        module_id: Uuid,
        teacher_id: Option<Uuid>,
        seance_id: Uuid,
        statut: String,
        motif: Option<String>,
    ) -> Result<presence::Model> {
        let model = presence::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            module_id: Set(module_id),
            teacher_id: Set(teacher_id),
            seance_id: Set(seance_id),
            statut: Set(statut),
            motif: Set(motif),
            created_at: Set(now()),
            updated_at: Set(now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_presence(
        &self,
        presence_id: Uuid,
        statut: String,
        motif: Option<String>,
        teacher_id: Option<Uuid>,
    ) -> Result<presence::Model> {
        let existing = self
            .find_presence(presence_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Presence not found"))?;

        let mut model: presence::ActiveModel = existing.into();
        model.statut = Set(statut);
        model.motif = Set(motif);
        model.teacher_id = Set(teacher_id);
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_presence(&self, presence_id: Uuid) -> Result<()> {
        let existing = self
            .find_presence(presence_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Presence not found"))?;
        entities::Presence::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn list_presences_by_module(&self, module_id: Uuid) -> Result<Vec<PresenceDetail>> {
        let rows = entities::Presence::find()
            .filter(presence::Column::ModuleId.eq(module_id))
            .all(&self.db)
            .await?;
        self.hydrate_presences(rows).await
    }

    pub async fn list_presences_by_seance(&self, seance_id: Uuid) -> Result<Vec<PresenceDetail>> {
        let rows = entities::Presence::find()
            .filter(presence::Column::SeanceId.eq(seance_id))
            .all(&self.db)
            .await?;
        self.hydrate_presences(rows).await
    }

    /// Student's own attendance history with module context, newest first
    pub async fn list_presences_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<(presence::Model, Option<module::Model>, Option<seance::Model>)>> {
        let rows = entities::Presence::find()
            .filter(presence::Column::StudentId.eq(student_id))
            .order_by_desc(presence::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let module_ids: Vec<Uuid> = rows.iter().map(|p| p.module_id).collect();
        let seance_ids: Vec<Uuid> = rows.iter().map(|p| p.seance_id).collect();

        let modules: HashMap<Uuid, module::Model> = entities::Module::find()
            .filter(module::Column::Id.is_in(module_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let seances: HashMap<Uuid, seance::Model> = entities::Seance::find()
            .filter(seance::Column::Id.is_in(seance_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(rows
            .into_iter()
            .map(|p| {
                let m = modules.get(&p.module_id).cloned();
                let s = seances.get(&p.seance_id).cloned();
                (p, m, s)
            })
            .collect())
    }

    async fn hydrate_presences(&self, rows: Vec<presence::Model>) -> Result<Vec<PresenceDetail>> {
        let student_ids: Vec<Uuid> = rows.iter().map(|p| p.student_id).collect();
        let seance_ids: Vec<Uuid> = rows.iter().map(|p| p.seance_id).collect();

        let students: HashMap<Uuid, student::Model> = entities::Student::find()
            .filter(student::Column::Id.is_in(student_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let seances: HashMap<Uuid, seance::Model> = entities::Seance::find()
            .filter(seance::Column::Id.is_in(seance_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(rows
            .into_iter()
            .map(|p| {
                let st = students.get(&p.student_id).cloned();
                let se = seances.get(&p.seance_id).cloned();
                (p, st, se)
            })
            .collect())
    }

    pub async fn presence_stats_by_module(&self, module_id: Uuid) -> Result<PresenceStats> {
        let rows = entities::Presence::find()
            .filter(presence::Column::ModuleId.eq(module_id))
            .all(&self.db)
            .await?;
        Ok(stats_from(&rows))
    }

    pub async fn presence_stats_by_seance(&self, seance_id: Uuid) -> Result<PresenceStats> {
        let rows = entities::Presence::find()
            .filter(presence::Column::SeanceId.eq(seance_id))
            .all(&self.db)
            .await?;
        Ok(stats_from(&rows))
    }
}
