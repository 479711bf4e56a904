//! Persistence seam. The rest of the crate only sees the [`Datastore`]
//! trait; the in-memory document store ships as the default backend and the
//! test double alike.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PrivilegeRequest, RequestStatus, User};
use crate::roles::Role;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{0}")]
    Conflict(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Datastore: Send + Sync {
    // -- users ------------------------------------------------------------

    /// Insert a new user. Fails with `DuplicateEmail` when the (lowercased)
    /// email is already present.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Case-insensitive email lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Full-record replacement keyed by `user.id`. Re-checks email
    /// uniqueness against every other record.
    async fn update_user(&self, user: User) -> Result<User, StoreError>;

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    async fn count_users(&self) -> Result<usize, StoreError>;

    async fn count_active_with_role(&self, role: Role) -> Result<usize, StoreError>;

    /// Active users whose rank meets `min_role` (the notification audience
    /// for new privilege requests).
    async fn users_with_min_role(&self, min_role: Role) -> Result<Vec<User>, StoreError>;

    // -- privilege requests ------------------------------------------------

    async fn insert_request(
        &self,
        request: PrivilegeRequest,
    ) -> Result<PrivilegeRequest, StoreError>;

    async fn find_request(&self, id: Uuid) -> Result<Option<PrivilegeRequest>, StoreError>;

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PrivilegeRequest>, StoreError>;

    /// Conditional single-shot transition out of `pending`. A request that
    /// has already been reviewed yields `Conflict`, never an overwrite; the
    /// backend must serialize racing calls on the same id.
    async fn transition_request(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        status: RequestStatus,
        notes: Option<String>,
    ) -> Result<PrivilegeRequest, StoreError>;

    /// Approve a pending request and attach the resulting temporary grant
    /// to the requesting user as one atomic operation. Yields `Conflict`
    /// for an already-reviewed request and `NotFound` when the request or
    /// its requester is gone; in the latter case the request stays pending.
    async fn approve_request(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        notes: Option<String>,
    ) -> Result<PrivilegeRequest, StoreError>;
}
