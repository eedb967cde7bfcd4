use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workforce roles, totally ordered by privilege level.
///
/// Stored as text in the users table; unknown stored values are rejected at the
/// deserialization boundary instead of being carried through business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Unassigned,
    Employee,
    ContactManager,
    Supervisor,
    Admin,
    SuperAdmin,
}

/// All roles, lowest privilege first.
pub const ALL_ROLES: [Role; 6] = [
    Role::Unassigned,
    Role::Employee,
    Role::ContactManager,
    Role::Supervisor,
    Role::Admin,
    Role::SuperAdmin,
];

impl Role {
    /// Privilege level. Higher level outranks lower.
    pub fn level(&self) -> u8 {
        match self {
            Role::Unassigned => 0,
            Role::Employee => 1,
            Role::ContactManager => 2,
            Role::Supervisor => 3,
            Role::Admin => 4,
            Role::SuperAdmin => 5,
        }
    }

    /// A caller may grant any role at or below its own level.
    pub fn can_assign(&self, target: Role) -> bool {
        self.level() >= target.level()
    }

    /// Roles this role is allowed to grant, lowest first.
    pub fn assignable_roles(&self) -> Vec<Role> {
        ALL_ROLES
            .iter()
            .copied()
            .filter(|r| self.can_assign(*r))
            .collect()
    }

    /// User-management capability: supervisors and above.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin | Role::SuperAdmin)
    }

    /// Canonical storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unassigned => "UNASSIGNED",
            Role::Employee => "EMPLOYEE",
            Role::ContactManager => "CONTACT_MANAGER",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNASSIGNED" => Ok(Role::Unassigned),
            "EMPLOYEE" => Ok(Role::Employee),
            "CONTACT_MANAGER" => Ok(Role::ContactManager),
            "SUPERVISOR" => Ok(Role::Supervisor),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when persisted or client-supplied role text is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct RoleParseError(pub String);

/// A requested change to a user's role.
///
/// `Unassign` carries the deletion semantics: the user's role is forced to
/// `Unassigned` and the record is soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Set(Role),
    Unassign,
}

impl RoleChange {
    /// Map the wire form (`"role": "SUPERVISOR"` or `"role": null`) to a change.
    pub fn from_wire(role: Option<Role>) -> Self {
        match role {
            Some(role) => RoleChange::Set(role),
            None => RoleChange::Unassign,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn levels_strictly_increase_along_hierarchy() {
        for pair in ALL_ROLES.windows(2) {
            assert!(
                pair[0].level() < pair[1].level(),
                "expected {} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn can_assign_is_level_bounded() {
        assert!(Role::SuperAdmin.can_assign(Role::SuperAdmin));
        assert!(Role::Admin.can_assign(Role::Supervisor));
        assert!(Role::Supervisor.can_assign(Role::Employee));
        assert!(!Role::Supervisor.can_assign(Role::Admin));
        assert!(!Role::Employee.can_assign(Role::Supervisor));
    }

    #[test]
    fn assignable_roles_are_everything_at_or_below() {
        assert_eq!(
            Role::Supervisor.assignable_roles(),
            vec![
                Role::Unassigned,
                Role::Employee,
                Role::ContactManager,
                Role::Supervisor
            ]
        );
        assert_eq!(Role::SuperAdmin.assignable_roles().len(), ALL_ROLES.len());
    }

    #[test]
    fn manage_users_is_supervisor_and_above() {
        assert!(!Role::Unassigned.can_manage_users());
        assert!(!Role::Employee.can_manage_users());
        assert!(!Role::ContactManager.can_manage_users());
        assert!(Role::Supervisor.can_manage_users());
        assert!(Role::Admin.can_manage_users());
        assert!(Role::SuperAdmin.can_manage_users());
    }

    #[test]
    fn storage_form_round_trips() {
        for role in ALL_ROLES {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_text_is_rejected() {
        let err = Role::from_str("MANAGER").unwrap_err();
        assert_eq!(err, RoleParseError("MANAGER".to_string()));
    }

    #[test]
    fn wire_null_means_unassign() {
        assert_eq!(RoleChange::from_wire(None), RoleChange::Unassign);
        assert_eq!(
            RoleChange::from_wire(Some(Role::Employee)),
            RoleChange::Set(Role::Employee)
        );
    }
}
