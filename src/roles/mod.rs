use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The four account roles, totally ordered by rank.
///
/// Every higher rank implicitly holds all privileges of every lower rank
/// (cumulative inheritance). Derived `Ord` follows declaration order, which
/// matches the rank order, so `Role::Superadmin > Role::Admin` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
    Admin,
    Superadmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Manager, Role::Admin, Role::Superadmin];

    /// Numeric rank, 1 (user) through 4 (superadmin).
    pub fn rank(&self) -> u8 {
        match self {
            Role::User => 1,
            Role::Manager => 2,
            Role::Admin => 3,
            Role::Superadmin => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A named capability, grantable via role or temporary grant.
///
/// The set is closed: request payloads naming anything outside it fail to
/// deserialize, so guards never see an unknown privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    // User management
    #[serde(rename = "user.view")]
    UserView,
    #[serde(rename = "user.create")]
    UserCreate,
    #[serde(rename = "user.edit")]
    UserEdit,
    #[serde(rename = "user.delete")]
    UserDelete,
    #[serde(rename = "user.manage_roles")]
    UserManageRoles,
    // Content management
    #[serde(rename = "content.view")]
    ContentView,
    #[serde(rename = "content.create")]
    ContentCreate,
    #[serde(rename = "content.edit")]
    ContentEdit,
    #[serde(rename = "content.delete")]
    ContentDelete,
    #[serde(rename = "content.publish")]
    ContentPublish,
    // System management
    #[serde(rename = "system.view_logs")]
    SystemViewLogs,
    #[serde(rename = "system.manage_settings")]
    SystemManageSettings,
    #[serde(rename = "system.manage_backups")]
    SystemManageBackups,
    // Security management
    #[serde(rename = "security.view_logs")]
    SecurityViewLogs,
    #[serde(rename = "security.manage_permissions")]
    SecurityManagePermissions,
    #[serde(rename = "security.grant_privileges")]
    SecurityGrantPrivileges,
    // API access
    #[serde(rename = "api.read")]
    ApiRead,
    #[serde(rename = "api.write")]
    ApiWrite,
    #[serde(rename = "api.admin")]
    ApiAdmin,
}

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::UserView => "user.view",
            Privilege::UserCreate => "user.create",
            Privilege::UserEdit => "user.edit",
            Privilege::UserDelete => "user.delete",
            Privilege::UserManageRoles => "user.manage_roles",
            Privilege::ContentView => "content.view",
            Privilege::ContentCreate => "content.create",
            Privilege::ContentEdit => "content.edit",
            Privilege::ContentDelete => "content.delete",
            Privilege::ContentPublish => "content.publish",
            Privilege::SystemViewLogs => "system.view_logs",
            Privilege::SystemManageSettings => "system.manage_settings",
            Privilege::SystemManageBackups => "system.manage_backups",
            Privilege::SecurityViewLogs => "security.view_logs",
            Privilege::SecurityManagePermissions => "security.manage_permissions",
            Privilege::SecurityGrantPrivileges => "security.grant_privileges",
            Privilege::ApiRead => "api.read",
            Privilege::ApiWrite => "api.write",
            Privilege::ApiAdmin => "api.admin",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privileges declared directly on a role, NOT including inherited ones.
/// Use [`privileges_of`] for the effective (cumulative) set.
fn declared_privileges(role: Role) -> &'static [Privilege] {
    use Privilege::*;
    match role {
        Role::User => &[ContentView, ApiRead],
        Role::Manager => &[UserView, ContentCreate, ContentEdit, ContentPublish, ApiWrite],
        Role::Admin => &[
            UserCreate,
            UserEdit,
            UserDelete,
            ContentDelete,
            SystemViewLogs,
            SystemManageSettings,
            SecurityViewLogs,
        ],
        Role::Superadmin => &[
            UserManageRoles,
            SystemManageBackups,
            SecurityManagePermissions,
            SecurityGrantPrivileges,
            ApiAdmin,
        ],
    }
}

// Cumulative closure over all four roles, built once at startup. Every guard
// consults this table; there is no second copy of the hierarchy anywhere.
static PRIVILEGE_CLOSURE: Lazy<HashMap<Role, HashSet<Privilege>>> = Lazy::new(|| {
    Role::ALL
        .iter()
        .map(|&role| {
            let set = Role::ALL
                .iter()
                .filter(|r| r.rank() <= role.rank())
                .flat_map(|&r| declared_privileges(r).iter().copied())
                .collect();
            (role, set)
        })
        .collect()
});

/// Effective privilege set for a role: its own declarations plus those of
/// every role of lower rank.
pub fn privileges_of(role: Role) -> &'static HashSet<Privilege> {
    // Total over the enum; the entry always exists.
    &PRIVILEGE_CLOSURE[&role]
}
