use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{validate_email, validate_name};
use crate::error::ApiError;
use crate::guard;
use crate::models::User;
use crate::roles::Role;
use crate::store::Datastore;

/// Partial update payload for PUT /api/users/:id. Absent fields are left
/// untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Datastore>,
}

impl UserService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list_users().await?)
    }

    /// Fetch one user. Directory reads are admin territory, but everyone may
    /// look at their own record.
    pub async fn get(&self, actor: &User, id: Uuid) -> Result<User, ApiError> {
        if actor.id != id {
            guard::require_role(actor.role, &[Role::Admin])?;
        }
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Guarded update. Self-service covers profile fields only; touching
    /// anyone else requires strictly higher rank, and the `role` field is a
    /// superadmin-exclusive capability that is never self-applicable.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        fields: UpdateUserFields,
    ) -> Result<User, ApiError> {
        let mut target = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let is_self = actor.id == id;
        if !is_self && !guard::can_modify(actor.role, target.role) {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        if let Some(role) = fields.role {
            if is_self {
                return Err(ApiError::forbidden("Cannot change your own role"));
            }
            if actor.role != Role::Superadmin {
                return Err(ApiError::forbidden("Role changes require superadmin"));
            }
            target.role = role;
        }

        if let Some(is_active) = fields.is_active {
            if is_self {
                return Err(ApiError::forbidden("Cannot change your own active status"));
            }
            target.is_active = is_active;
        }

        if let Some(name) = fields.name {
            validate_name(&name)?;
            target.name = name;
        }

        if let Some(email) = fields.email {
            validate_email(&email)?;
            target.email = email.to_lowercase();
        }

        target.updated_at = Utc::now();
        Ok(self.store.update_user(target).await?)
    }

    /// Guarded hard delete. Nobody removes their own account through the
    /// admin surface, and the store must never reach zero superadmins.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), ApiError> {
        let target = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if actor.id == id {
            return Err(ApiError::forbidden("Cannot delete your own account"));
        }

        if target.role == Role::Superadmin
            && self.store.count_active_with_role(Role::Superadmin).await? <= 1
        {
            return Err(ApiError::forbidden("Cannot delete the last superadmin"));
        }

        if !guard::can_modify(actor.role, target.role) {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        self.store.delete_user(id).await?;
        tracing::info!(target_id = %id, actor_id = %actor.id, "user deleted");
        Ok(())
    }
}
