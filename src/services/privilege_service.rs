use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::guard;
use crate::models::{PrivilegeRequest, RequestStatus, ReviewDecision, User};
use crate::notify::Notifier;
use crate::roles::{Privilege, Role};
use crate::store::Datastore;

/// Longest lifetime a grant may be requested with. Open-ended grants stay
/// possible by omitting the field entirely.
const MAX_GRANT_HOURS: i64 = 24 * 365;

#[derive(Clone)]
pub struct PrivilegeService {
    store: Arc<dyn Datastore>,
    notifier: Arc<dyn Notifier>,
}

impl PrivilegeService {
    pub fn new(store: Arc<dyn Datastore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Enqueue a pending request for privileges above the requester's
    /// effective set, then tell the admins. Notification failures never
    /// block the enqueue.
    pub async fn create(
        &self,
        requester: &User,
        privileges: Vec<Privilege>,
        reason: String,
        expires_in_hours: Option<i64>,
    ) -> Result<PrivilegeRequest, ApiError> {
        if privileges.is_empty() {
            return Err(ApiError::validation_error("At least one privilege is required", None));
        }
        if reason.trim().is_empty() {
            return Err(ApiError::validation_error("A reason is required", None));
        }

        let now = Utc::now();
        if privileges.iter().all(|p| guard::has_privilege(requester, *p, now)) {
            return Err(ApiError::validation_error(
                "You already hold all of the requested privileges",
                None,
            ));
        }

        // Client-supplied and unbounded, so range-check before it ever
        // reaches date arithmetic.
        let expires_at = match expires_in_hours {
            None => None,
            Some(hours) if (1..=MAX_GRANT_HOURS).contains(&hours) => {
                Some(now + Duration::hours(hours))
            }
            Some(_) => {
                return Err(ApiError::validation_error(
                    format!("expires_in_hours must be between 1 and {}", MAX_GRANT_HOURS),
                    None,
                ));
            }
        };
        let request = self
            .store
            .insert_request(PrivilegeRequest::new(requester.id, privileges, reason, expires_at))
            .await?;

        for reviewer in self.store.users_with_min_role(Role::Admin).await? {
            self.notifier
                .notify(
                    reviewer.id,
                    "New privilege request",
                    &format!("User {} has requested new privileges", requester.name),
                )
                .await;
        }

        Ok(request)
    }

    pub async fn list(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PrivilegeRequest>, ApiError> {
        Ok(self.store.list_requests(status).await?)
    }

    /// Review a pending request. The transition out of `pending` happens
    /// exactly once; on approval the requested privileges attach to the
    /// requester as a time-bounded grant layered over the role set.
    pub async fn review(
        &self,
        reviewer: &User,
        request_id: Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<PrivilegeRequest, ApiError> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Request not found"))?;

        let requester = self
            .store
            .find_user(request.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Requesting user not found"))?;

        // Strictly-higher rank required, which also rules out self-review.
        if reviewer.role.rank() <= requester.role.rank() {
            return Err(ApiError::forbidden(
                "Reviewers must outrank the requesting user",
            ));
        }

        // Approval commits the transition and the grant as one store
        // operation, so the requester vanishing mid-review leaves the
        // request pending rather than approved-without-a-grant.
        let reviewed = match decision {
            ReviewDecision::Approved => {
                let reviewed =
                    self.store.approve_request(request_id, reviewer.id, notes).await?;
                tracing::info!(
                    request_id = %request_id,
                    user_id = %requester.id,
                    reviewer_id = %reviewer.id,
                    "privilege request approved"
                );
                reviewed
            }
            ReviewDecision::Rejected => {
                self.store
                    .transition_request(request_id, reviewer.id, RequestStatus::Rejected, notes)
                    .await?
            }
        };

        let verdict = match decision {
            ReviewDecision::Approved => "approved",
            ReviewDecision::Rejected => "rejected",
        };
        self.notifier
            .notify(
                requester.id,
                "Privilege request updated",
                &format!("Your privilege request has been {}", verdict),
            )
            .await;

        Ok(reviewed)
    }
}
