use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student academic profile, optionally linked to a user account
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique academic identification code
    #[sea_orm(unique)]
    pub matricule: String,

    pub nom: String,
    pub prenom: Option<String>,

    /// `M`, `F` or `Autre`
    pub sexe: Option<String>,
    pub date_naissance: Option<Date>,
    pub lieu_naissance: Option<String>,

    /// Academic or military grade
    pub grade: Option<String>,

    /// Administrative file status: `en_cours`, `complet` or `incomplet`
    pub etat_dossier: String,

    /// Linked user account; unique when present — the store-level arbiter
    /// for concurrent link attempts
    #[sea_orm(unique)]
    pub user_id: Option<Uuid>,

    pub promotion_id: i32,
    pub photo_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::promotion::Entity",
        from = "Column::PromotionId",
        to = "super::promotion::Column::Id"
    )]
    Promotion,

    #[sea_orm(has_many = "super::note::Entity")]
    Notes,

    #[sea_orm(has_many = "super::presence::Entity")]
    Presences,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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

impl Related<super::presence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Presences.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
