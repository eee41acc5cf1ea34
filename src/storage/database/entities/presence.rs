use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance record of a student at a séance
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "presences")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub student_id: Uuid,
    pub module_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub seance_id: Uuid,

    /// `present`, `absent`, `retard` or `justifie`
    pub statut: String,
    pub motif: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,

    #[sea_orm(
        belongs_to = "super::seance::Entity",
        from = "Column::SeanceId",
        to = "super::seance::Column::Id"
    )]
    Seance,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::seance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
