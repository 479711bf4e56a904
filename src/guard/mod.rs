//! Pure authorization decisions. Everything here is total and deterministic
//! given `(identity, requirement)`; denial surfaces as `Forbidden`, never as
//! a panic or an "it depends" error.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::User;
use crate::roles::{privileges_of, Privilege, Role};

/// Rank-threshold role gate.
///
/// An empty `allowed` list is an open gate: any authenticated identity
/// passes. Otherwise the identity passes iff its rank meets the *lowest*
/// rank among the allowed roles, so a superadmin always clears a gate that
/// lists only `admin`.
pub fn require_role(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    let Some(min_required) = allowed.iter().map(|r| r.rank()).min() else {
        return Ok(());
    };

    if role.rank() >= min_required {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access denied. Insufficient permissions."))
    }
}

/// Whether `actor` may modify an account holding `target` role.
///
/// Strictly greater rank is required; two admins may never modify each
/// other, and the reflexive case is always false. Self-access to one's own
/// profile fields is a separate allowance checked before this.
pub fn can_modify(actor: Role, target: Role) -> bool {
    actor.rank() > target.rank()
}

/// Membership test against the user's role closure plus any temporary
/// grants still active at `now`.
pub fn has_privilege(user: &User, privilege: Privilege, now: DateTime<Utc>) -> bool {
    if privileges_of(user.role).contains(&privilege) {
        return true;
    }
    user.active_grants(now).any(|g| g.privileges.contains(&privilege))
}

/// Privileges the user holds at `now`, role-derived and granted combined.
pub fn effective_privileges(user: &User, now: DateTime<Utc>) -> Vec<Privilege> {
    let mut set: std::collections::HashSet<Privilege> =
        privileges_of(user.role).iter().copied().collect();
    for grant in user.active_grants(now) {
        set.extend(grant.privileges.iter().copied());
    }
    let mut out: Vec<Privilege> = set.into_iter().collect();
    out.sort_by_key(|p| p.as_str());
    out
}
