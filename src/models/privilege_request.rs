use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Privilege;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Reviewer verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// A user's request for privileges above their role's set.
///
/// Leaves `pending` exactly once: the store performs the transition as a
/// conditional update, so a racing second review fails instead of
/// overwriting the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivilegeRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub requested_privileges: Vec<Privilege>,
    pub reason: String,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PrivilegeRequest {
    pub fn new(
        user_id: Uuid,
        requested_privileges: Vec<Privilege>,
        reason: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            requested_privileges,
            reason,
            status: RequestStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            requested_at: Utc::now(),
            reviewed_at: None,
            expires_at,
        }
    }
}
