use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account record
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// User ID (UUID)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Username (unique)
    #[sea_orm(unique)]
    pub username: String,

    /// Email address (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Password hash; never serialized into responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Phone number (optional)
    pub phone: Option<String>,

    /// Profile photo URL (optional, relative)
    pub photo_url: Option<String>,

    /// Account status: `active` or `inactive`
    pub status: String,

    /// Role reference (nullable only transiently)
    pub role_id: Option<i32>,

    /// Last login timestamp
    pub last_login_at: Option<DateTimeWithTimeZone>,

    /// Soft-delete marker; excluded from normal lookups when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    /// Creation timestamp
    pub created_at: DateTimeWithTimeZone,

    /// Last update timestamp
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,

    #[sea_orm(has_one = "super::student::Entity")]
    Student,

    #[sea_orm(has_one = "super::teacher::Entity")]
    Teacher,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the account may log in
    pub fn is_active(&self) -> bool {
        self.status == "active" && self.deleted_at.is_none()
    }
}
