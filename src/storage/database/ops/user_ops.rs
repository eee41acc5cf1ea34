use crate::storage::database::entities::{self, role, user};
use crate::storage::database::{is_unique_violation, now, Database};
use crate::utils::error::{ApiError, Result};
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

/// Payload for inserting a user row
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    pub role_id: Option<i32>,
}

impl Database {
    /// Find a live (non-deleted) user by id
    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>> {
        let found = entities::User::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Find a live user together with its role
    pub async fn find_user_with_role(
        &self,
        user_id: Uuid,
    ) -> Result<Option<(user::Model, Option<role::Model>)>> {
        let found = entities::User::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .find_also_related(entities::Role)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Look up a user by username or email for login
    pub async fn find_user_for_login(
        &self,
        identifier: &str,
    ) -> Result<Option<(user::Model, Option<role::Model>)>> {
        debug!("Login lookup for identifier: {}", identifier);
        let found = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(identifier))
                    .add(user::Column::Email.eq(identifier.to_lowercase())),
            )
            .find_also_related(entities::Role)
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Find a live user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        let found = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Find a live user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let found = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// List live users with their roles, ordered by username
    pub async fn list_users(&self) -> Result<Vec<(user::Model, Option<role::Model>)>> {
        let users = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .find_also_related(entities::Role)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    /// List live users whose role name matches (or, inverted, differs from)
    /// the given role name
    pub async fn list_users_by_role_name(
        &self,
        role_name: &str,
        invert: bool,
    ) -> Result<Vec<(user::Model, Option<role::Model>)>> {
        let users = self.list_users().await?;
        Ok(users
            .into_iter()
            .filter(|(_, r)| {
                let matches = r
                    .as_ref()
                    .map(|r| r.name.eq_ignore_ascii_case(role_name))
                    .unwrap_or(false);
                matches != invert
            })
            .collect())
    }

    /// Insert a user row; duplicate username/email surfaces as a 409
    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model> {
        debug!("Creating user: {}", new_user.username);

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            phone: Set(new_user.phone),
            photo_url: Set(new_user.photo_url),
            status: Set(new_user.status),
            role_id: Set(new_user.role_id),
            last_login_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now()),
            updated_at: Set(now()),
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Username or email already in use")
            } else {
                ApiError::Database(e)
            }
        })
    }

    /// Update mutable account fields; `None` leaves a field untouched
    #[allow(clippy::too_many_arguments)]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        username: Option<String>,
        email: Option<String>,
        phone: Option<Option<String>>,
        photo_url: Option<Option<String>>,
        status: Option<String>,
        role_id: Option<Option<i32>>,
        password_hash: Option<String>,
    ) -> Result<user::Model> {
        let existing = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut model: user::ActiveModel = existing.into();
        if let Some(username) = username {
            model.username = Set(username);
        }
        if let Some(email) = email {
            model.email = Set(email);
        }
        if let Some(phone) = phone {
            model.phone = Set(phone);
        }
        if let Some(photo_url) = photo_url {
            model.photo_url = Set(photo_url);
        }
        if let Some(status) = status {
            model.status = Set(status);
        }
        if let Some(role_id) = role_id {
            model.role_id = Set(role_id);
        }
        if let Some(password_hash) = password_hash {
            model.password_hash = Set(password_hash);
        }
        model.updated_at = Set(now());

        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Username or email already in use")
            } else {
                ApiError::Database(e)
            }
        })
    }

    /// Update a user's password hash
    pub async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let existing = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut model: user::ActiveModel = existing.into();
        model.password_hash = Set(password_hash.to_string());
        model.updated_at = Set(now());
        model.update(&self.db).await?;
        Ok(())
    }

    /// Record a successful login
    pub async fn update_user_last_login(&self, user_id: Uuid) -> Result<()> {
        let existing = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut model: user::ActiveModel = existing.into();
        model.last_login_at = Set(Some(now()));
        model.updated_at = Set(now());
        model.update(&self.db).await?;
        Ok(())
    }

    /// Set the account status (`active` / `inactive`)
    pub async fn set_user_status(&self, user_id: Uuid, status: &str) -> Result<user::Model> {
        let existing = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut model: user::ActiveModel = existing.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    /// Soft-delete a user; the row stays for restore but stops resolving
    pub async fn soft_delete_user(&self, user_id: Uuid) -> Result<()> {
        let existing = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut model: user::ActiveModel = existing.into();
        model.deleted_at = Set(Some(now()));
        model.updated_at = Set(now());
        model.update(&self.db).await?;
        Ok(())
    }

    /// Restore a soft-deleted user
    pub async fn restore_user(&self, user_id: Uuid) -> Result<user::Model> {
        let existing = entities::User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if existing.deleted_at.is_none() {
            return Err(ApiError::validation("User is not deleted"));
        }

        let mut model: user::ActiveModel = existing.into();
        model.deleted_at = Set(None);
        model.updated_at = Set(now());
        Ok(model.update(&self.db).await?)
    }

    /// Permanently remove a user row, soft-deleted or not
    pub async fn force_delete_user(&self, user_id: Uuid) -> Result<()> {
        let existing = entities::User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        entities::User::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
