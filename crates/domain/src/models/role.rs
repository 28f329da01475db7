//! Roles and the permission gate.
//!
//! A profile's role maps to a set of `resource:action` permission tags via
//! the role_permissions table. The Admin role is authorized for everything
//! without consulting the mapping, so an empty or unreachable mapping can
//! never lock administrators out.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Volunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organizer => "organizer",
            Role::Volunteer => "volunteer",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "organizer" => Some(Role::Organizer),
            "volunteer" => Some(Role::Volunteer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The permission set loaded for a profile at session-fetch time.
///
/// This is the single authorization gate; call sites must not re-implement
/// the Admin bypass.
#[derive(Debug, Clone)]
pub struct PermissionSet {
    role: Role,
    permissions: HashSet<String>,
}

impl PermissionSet {
    pub fn new(role: Role, permissions: Vec<String>) -> Self {
        Self {
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the holder may perform the tagged action.
    /// Admin short-circuits to true regardless of the stored mapping.
    pub fn has(&self, permission: &str) -> bool {
        self.role == Role::Admin || self.permissions.contains(permission)
    }

    /// The granted tags, for the session response. Sorted for stable output.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.permissions.iter().cloned().collect();
        tags.sort();
        tags
    }
}

/// Permission tags used by the route handlers.
pub mod permissions {
    pub const USERS_VIEW: &str = "users:view";
    pub const USERS_CREATE: &str = "users:create";
    pub const USERS_EDIT: &str = "users:edit";
    pub const USERS_DELETE: &str = "users:delete";

    pub const SUBMISSIONS_VIEW: &str = "submissions:view";
    pub const SUBMISSIONS_CREATE: &str = "submissions:create";
    pub const SUBMISSIONS_EDIT: &str = "submissions:edit";
    pub const SUBMISSIONS_DELETE: &str = "submissions:delete";
    pub const SUBMISSIONS_APPROVE: &str = "submissions:approve";

    pub const SPEAKERS_VIEW: &str = "speakers:view";
    pub const SPEAKERS_CREATE: &str = "speakers:create";
    pub const SPEAKERS_EDIT: &str = "speakers:edit";
    pub const SPEAKERS_DELETE: &str = "speakers:delete";

    pub const SPONSORS_VIEW: &str = "sponsors:view";
    pub const SPONSORS_CREATE: &str = "sponsors:create";
    pub const SPONSORS_EDIT: &str = "sponsors:edit";
    pub const SPONSORS_DELETE: &str = "sponsors:delete";
    pub const SPONSORS_APPROVE: &str = "sponsors:approve";

    pub const TASKS_VIEW: &str = "tasks:view";
    pub const TASKS_CREATE: &str = "tasks:create";
    pub const TASKS_EDIT: &str = "tasks:edit";
    pub const TASKS_DELETE: &str = "tasks:delete";

    pub const FINANCE_VIEW: &str = "finance:view";
    pub const FINANCE_CREATE: &str = "finance:create";
    pub const FINANCE_EDIT: &str = "finance:edit";
    pub const FINANCE_DELETE: &str = "finance:delete";

    pub const DOCUMENTS_VIEW: &str = "documents:view";
    pub const DOCUMENTS_CREATE: &str = "documents:create";
    pub const DOCUMENTS_EDIT: &str = "documents:edit";
    pub const DOCUMENTS_DELETE: &str = "documents:delete";

    pub const PROGRAM_VIEW: &str = "program:view";
    pub const PROGRAM_CREATE: &str = "program:create";
    pub const PROGRAM_EDIT: &str = "program:edit";
    pub const PROGRAM_DELETE: &str = "program:delete";

    pub const SETTINGS_VIEW: &str = "settings:view";
    pub const SETTINGS_EDIT: &str = "settings:edit";

    pub const EMAILS_SEND: &str = "emails:send";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Admin, Role::Organizer, Role::Volunteer] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Organizer).unwrap(), "\"organizer\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_admin_bypasses_empty_mapping() {
        let set = PermissionSet::new(Role::Admin, vec![]);
        assert!(set.has(permissions::SUBMISSIONS_APPROVE));
        assert!(set.has(permissions::SETTINGS_EDIT));
        assert!(set.has("anything:at_all"));
    }

    #[test]
    fn test_non_admin_requires_membership() {
        let set = PermissionSet::new(
            Role::Organizer,
            vec![
                permissions::SUBMISSIONS_VIEW.to_string(),
                permissions::SUBMISSIONS_EDIT.to_string(),
            ],
        );
        assert!(set.has(permissions::SUBMISSIONS_VIEW));
        assert!(!set.has(permissions::SUBMISSIONS_APPROVE));
        assert!(!set.has(permissions::SETTINGS_EDIT));
    }

    #[test]
    fn test_volunteer_empty_set_denied() {
        let set = PermissionSet::new(Role::Volunteer, vec![]);
        assert!(!set.has(permissions::TASKS_VIEW));
    }

    #[test]
    fn test_tags_sorted() {
        let set = PermissionSet::new(
            Role::Organizer,
            vec!["tasks:view".to_string(), "finance:view".to_string()],
        );
        assert_eq!(set.tags(), vec!["finance:view", "tasks:view"]);
    }

    #[test]
    fn test_admin_tags_reflect_stored_mapping_only() {
        // The bypass grants access, it does not fabricate tags
        let set = PermissionSet::new(Role::Admin, vec![]);
        assert!(set.tags().is_empty());
    }
}
