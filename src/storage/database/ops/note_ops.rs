use crate::domain::weighted_score;
use crate::storage::database::entities::{self, module, note, student};
use crate::storage::database::{now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Note row joined with its student and module
pub type NoteDetail = (note::Model, Option<student::Model>, Option<module::Model>);

/// Admin listing filters; `None` means no constraint
#[derive(Debug, Default, Clone)]
pub struct NoteFilter {
    pub session: Option<String>,
    pub semester: Option<i32>,
    pub module_id: Option<Uuid>,
    pub promotion_id: Option<i32>,
    pub search: Option<String>,
}

impl Database {
    /// Full note listing with filters, newest first
    pub async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<NoteDetail>> {
        let mut query = entities::Note::find();
        if let Some(session) = &filter.session {
            query = query.filter(note::Column::Session.eq(session.clone()));
        }
        if let Some(semester) = filter.semester {
            query = query.filter(note::Column::Semester.eq(semester));
        }
        if let Some(module_id) = filter.module_id {
            query = query.filter(note::Column::ModuleId.eq(module_id));
        }

        let notes = query
            .order_by_desc(note::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let detailed = self.hydrate_notes(notes).await?;

        // Promotion and free-text constraints need the joined rows
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        Ok(detailed
            .into_iter()
            .filter(|(_, s, m)| {
                if let Some(promotion_id) = filter.promotion_id {
                    if s.as_ref().map(|s| s.promotion_id) != Some(promotion_id) {
                        return false;
                    }
                }
                if let Some(needle) = &search {
                    let haystack = [
                        s.as_ref().map(|s| s.nom.to_lowercase()),
                        s.as_ref().and_then(|s| s.prenom.as_ref().map(|p| p.to_lowercase())),
                        m.as_ref().map(|m| m.title.to_lowercase()),
                        m.as_ref().map(|m| m.code.to_lowercase()),
                    ];
                    if !haystack
                        .iter()
                        .flatten()
                        .any(|field| field.contains(needle))
                    {
                        return false;
                    }
                }
                true
            })
            .collect())
    }

    async fn hydrate_notes(&self, notes: Vec<note::Model>) -> Result<Vec<NoteDetail>> {
        let student_ids: Vec<Uuid> = notes.iter().map(|n| n.student_id).collect();
        let module_ids: Vec<Uuid> = notes.iter().map(|n| n.module_id).collect();

        let students: HashMap<Uuid, student::Model> = entities::Student::find()
            .filter(student::Column::Id.is_in(student_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let modules: HashMap<Uuid, module::Model> = entities::Module::find()
            .filter(module::Column::Id.is_in(module_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(notes
            .into_iter()
            .map(|n| {
                let s = students.get(&n.student_id).cloned();
                let m = modules.get(&n.module_id).cloned();
                (n, s, m)
            })
            .collect())
    }

    pub async fn find_note(&self, note_id: Uuid) -> Result<Option<note::Model>> {
        Ok(entities::Note::find_by_id(note_id).one(&self.db).await?)
    }

    pub async fn find_note_detail(&self, note_id: Uuid) -> Result<Option<NoteDetail>> {
        match self.find_note(note_id).await? {
            Some(n) => Ok(self.hydrate_notes(vec![n]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    pub async fn list_notes_by_module(&self, module_id: Uuid) -> Result<Vec<NoteDetail>> {
        let notes = entities::Note::find()
            .filter(note::Column::ModuleId.eq(module_id))
            .order_by_desc(note::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.hydrate_notes(notes).await
    }

    pub async fn list_notes_by_student(&self, student_id: Uuid) -> Result<Vec<NoteDetail>> {
        let notes = entities::Note::find()
            .filter(note::Column::StudentId.eq(student_id))
            .order_by_desc(note::Column::CreatedAt)
            .all(&self.db)
            .await?;
        self.hydrate_notes(notes).await
    }

    /// Insert a note; the score is always recomputed from the two terms
    #[allow(clippy::too_many_arguments)]
    pub async fn create_note(
        &self,
        student_id: Uuid,
        module_id: Uuid,
        ce: Option<f32>,
        fe: Option<f32>,
        session: Option<String>,
        semester: Option<i32>,
        appreciation: Option<String>,
    ) -> Result<note::Model> {
        let model = note::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            module_id: Set(module_id),
            session: Set(session.unwrap_or_else(|| "Normale".to_string())),
            semester: Set(semester.unwrap_or(1)),
            ce: Set(ce),
            fe: Set(fe),
            score: Set(Some(weighted_score(ce, fe))),
            appreciation: Set(appreciation),
            created_at: Set(now()),
            updated_at: Set(now()),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Update a note's marks and metadata, recomputing the score
    #[allow(clippy::too_many_arguments)]
    pub async fn update_note(
        &self,
        note_id: Uuid,
        ce: Option<f32>,
        fe: Option<f32>,
        session: Option<String>,
        semester: Option<i32>,
        appreciation: Option<Option<String>>,
    ) -> Result<note::Model> {
        let existing = self
            .find_note(note_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Note not found"))?;

        let mut model: note::ActiveModel = existing.into();
        model.ce = Set(ce);
        model.fe = Set(fe);
        model.score = Set(Some(weighted_score(ce, fe)));
        if let Some(session) = session {
            model.session = Set(session);
        }
        if let Some(semester) = semester {
            model.semester = Set(semester);
        }
        if let Some(appreciation) = appreciation {
            model.appreciation = Set(appreciation);
        }
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_note(&self, note_id: Uuid) -> Result<()> {
        let existing = self
            .find_note(note_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Note not found"))?;
        entities::Note::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
