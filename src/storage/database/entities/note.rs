use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Exam note; `score` is the server-computed weighted average of `ce`/`fe`
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub student_id: Uuid,
    pub module_id: Uuid,

    /// Exam session, e.g. `Normale` or `Rattrapage`
    pub session: String,
    pub semester: i32,

    /// Continuous evaluation mark (0..=20)
    pub ce: Option<f32>,
    /// Final exam mark (0..=20)
    pub fe: Option<f32>,
    /// Weighted average, recomputed on every write
    pub score: Option<f32>,

    pub appreciation: Option<String>,

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

impl ActiveModelBehavior for ActiveModel {}
