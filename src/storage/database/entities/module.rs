use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teaching module; `teacher_id` is the ownership reference checked by
/// resource scoping
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modules")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    #[sea_orm(unique)]
    pub code: String,

    pub description: Option<String>,
    pub credits: i32,
    pub semester: i32,
    pub coefficient: f32,
    pub is_optional: bool,

    /// Owning teacher profile
    pub teacher_id: Option<Uuid>,
    pub promotion_id: Option<i32>,
    pub filiere_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id"
    )]
    Teacher,

    #[sea_orm(
        belongs_to = "super::promotion::Entity",
        from = "Column::PromotionId",
        to = "super::promotion::Column::Id"
    )]
    Promotion,

    #[sea_orm(
        belongs_to = "super::filiere::Entity",
        from = "Column::FiliereId",
        to = "super::filiere::Column::Id"
    )]
    Filiere,

    #[sea_orm(has_many = "super::note::Entity")]
    Notes,

    #[sea_orm(has_many = "super::seance::Entity")]
    Seances,

    #[sea_orm(has_many = "super::presence::Entity")]
    Presences,

    #[sea_orm(has_many = "super::resource::Entity")]
    Resources,
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::promotion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promotion.def()
    }
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl Related<super::seance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seances.def()
    }
}

impl Related<super::presence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Presences.def()
    }
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
