use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Promotion (year group) within a filière
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub nom: String,
    pub annee: i32,
    pub filiere_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::filiere::Entity",
        from = "Column::FiliereId",
        to = "super::filiere::Column::Id"
    )]
    Filiere,

    #[sea_orm(has_many = "super::student::Entity")]
    Students,

    #[sea_orm(has_many = "super::module::Entity")]
    Modules,
}

impl Related<super::filiere::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Filiere.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
