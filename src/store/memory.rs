use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Datastore, StoreError};
use crate::models::{PrivilegeRequest, RequestStatus, TemporaryGrant, User};
use crate::roles::Role;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    requests: HashMap<Uuid, PrivilegeRequest>,
}

/// Document store backed by process memory. One lock covers both
/// collections, so request transitions and the grants they produce commit
/// under a single write guard.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.inner.read().await.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if inner.users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count_users(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.users.len())
    }

    async fn count_active_with_role(&self, role: Role) -> Result<usize, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .filter(|u| u.role == role && u.is_active)
            .count())
    }

    async fn users_with_min_role(&self, min_role: Role) -> Result<Vec<User>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .filter(|u| u.is_active && u.role.rank() >= min_role.rank())
            .cloned()
            .collect())
    }

    async fn insert_request(
        &self,
        request: PrivilegeRequest,
    ) -> Result<PrivilegeRequest, StoreError> {
        self.inner.write().await.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<PrivilegeRequest>, StoreError> {
        Ok(self.inner.read().await.requests.get(&id).cloned())
    }

    async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PrivilegeRequest>, StoreError> {
        let mut requests: Vec<PrivilegeRequest> = self
            .inner
            .read()
            .await
            .requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.requested_at);
        Ok(requests)
    }

    async fn transition_request(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        status: RequestStatus,
        notes: Option<String>,
    ) -> Result<PrivilegeRequest, StoreError> {
        let mut inner = self.inner.write().await;
        let request = inner.requests.get_mut(&id).ok_or(StoreError::NotFound)?;

        // Conditional update: the write guard serializes racing reviews, the
        // status check makes the transition single-shot.
        if request.status != RequestStatus::Pending {
            return Err(StoreError::Conflict("Request has already been reviewed".to_string()));
        }

        request.status = status;
        request.reviewed_by = Some(reviewed_by);
        request.review_notes = notes;
        request.reviewed_at = Some(Utc::now());
        Ok(request.clone())
    }

    async fn approve_request(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        notes: Option<String>,
    ) -> Result<PrivilegeRequest, StoreError> {
        let mut inner = self.inner.write().await;
        let Inner { users, requests } = &mut *inner;

        let request = requests.get_mut(&id).ok_or(StoreError::NotFound)?;
        if request.status != RequestStatus::Pending {
            return Err(StoreError::Conflict("Request has already been reviewed".to_string()));
        }
        // All checks first: a missing requester must not consume the
        // request's single transition.
        let user = users.get_mut(&request.user_id).ok_or(StoreError::NotFound)?;

        let now = Utc::now();
        request.status = RequestStatus::Approved;
        request.reviewed_by = Some(reviewed_by);
        request.review_notes = notes;
        request.reviewed_at = Some(now);

        user.temporary_grants.push(TemporaryGrant {
            privileges: request.requested_privileges.clone(),
            granted_by: reviewed_by,
            granted_at: now,
            expires_at: request.expires_at,
        });
        user.updated_at = now;
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Privilege;

    fn sample_user(email: &str, role: Role) -> User {
        User::new("Sample".into(), email.into(), "hash".into(), role)
    }

    #[tokio::test]
    async fn email_uniqueness_is_case_insensitive() {
        let store = MemoryStore::new();
        store.insert_user(sample_user("a@x.com", Role::User)).await.unwrap();

        let dup = store.insert_user(sample_user("A@X.COM", Role::User)).await;
        assert!(matches!(dup, Err(StoreError::DuplicateEmail)));

        let found = store.find_user_by_email("A@x.Com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn update_rejects_stealing_another_users_email() {
        let store = MemoryStore::new();
        let a = store.insert_user(sample_user("a@x.com", Role::User)).await.unwrap();
        let _b = store.insert_user(sample_user("b@x.com", Role::User)).await.unwrap();

        let mut a_changed = a.clone();
        a_changed.email = "b@x.com".into();
        assert!(matches!(
            store.update_user(a_changed).await,
            Err(StoreError::DuplicateEmail)
        ));

        // Unchanged email is not a self-collision
        assert!(store.update_user(a).await.is_ok());
    }

    #[tokio::test]
    async fn transition_is_single_shot() {
        let store = MemoryStore::new();
        let requester = store.insert_user(sample_user("r@x.com", Role::Manager)).await.unwrap();
        let reviewer_id = Uuid::new_v4();

        let request = store
            .insert_request(PrivilegeRequest::new(
                requester.id,
                vec![Privilege::SecurityViewLogs],
                "oncall".into(),
                None,
            ))
            .await
            .unwrap();

        let first = store
            .transition_request(request.id, reviewer_id, RequestStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(first.status, RequestStatus::Approved);
        assert_eq!(first.reviewed_by, Some(reviewer_id));

        let second = store
            .transition_request(request.id, reviewer_id, RequestStatus::Rejected, None)
            .await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));

        // Verdict survives the failed overwrite
        let stored = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn approve_commits_verdict_and_grant_together() {
        let store = MemoryStore::new();
        let requester = store.insert_user(sample_user("r@x.com", Role::Manager)).await.unwrap();
        let reviewer_id = Uuid::new_v4();

        let request = store
            .insert_request(PrivilegeRequest::new(
                requester.id,
                vec![Privilege::SecurityViewLogs],
                "oncall".into(),
                None,
            ))
            .await
            .unwrap();

        let reviewed = store.approve_request(request.id, reviewer_id, None).await.unwrap();
        assert_eq!(reviewed.status, RequestStatus::Approved);

        let requester = store.find_user(requester.id).await.unwrap().unwrap();
        assert_eq!(requester.temporary_grants.len(), 1);
        assert_eq!(requester.temporary_grants[0].granted_by, reviewer_id);
    }

    #[tokio::test]
    async fn approve_with_a_deleted_requester_leaves_the_request_pending() {
        let store = MemoryStore::new();
        let requester = store.insert_user(sample_user("r@x.com", Role::Manager)).await.unwrap();

        let request = store
            .insert_request(PrivilegeRequest::new(
                requester.id,
                vec![Privilege::SecurityViewLogs],
                "oncall".into(),
                None,
            ))
            .await
            .unwrap();

        store.delete_user(requester.id).await.unwrap();

        let verdict = store.approve_request(request.id, Uuid::new_v4(), None).await;
        assert!(matches!(verdict, Err(StoreError::NotFound)));

        // No half-applied approval: the request kept its single transition.
        let stored = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(stored.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn min_role_filter_spans_admins_and_superadmins() {
        let store = MemoryStore::new();
        store.insert_user(sample_user("u@x.com", Role::User)).await.unwrap();
        store.insert_user(sample_user("m@x.com", Role::Manager)).await.unwrap();
        store.insert_user(sample_user("a@x.com", Role::Admin)).await.unwrap();
        store.insert_user(sample_user("s@x.com", Role::Superadmin)).await.unwrap();

        let audience = store.users_with_min_role(Role::Admin).await.unwrap();
        assert_eq!(audience.len(), 2);
        assert!(audience.iter().all(|u| u.role.rank() >= Role::Admin.rank()));
    }
}
