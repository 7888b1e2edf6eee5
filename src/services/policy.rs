//! Declarative authorization policy.
//!
//! One table maps `(resource, action)` to the `"Resource:Action"` privilege
//! string a role must carry; a single `authorize` call replaces the
//! per-module checks. A literal `"*"` privilege grants everything.

use std::fmt;

use crate::models::Identity;
use crate::services::error::DomainError;

pub const WILDCARD_PRIVILEGE: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Catalogue,
    VegetableProduction,
    BiosecurityImport,
    User,
    Role,
    AuditLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Export,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Catalogue => "Catalogue",
            Self::VegetableProduction => "VegetableProduction",
            Self::BiosecurityImport => "BiosecurityImport",
            Self::User => "User",
            Self::Role => "Role",
            Self::AuditLog => "AuditLog",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "Read",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Export => "Export",
        };
        write!(f, "{name}")
    }
}

/// The policy table. Every guarded operation appears here; resolvers never
/// hand-roll privilege strings.
pub const POLICY: &[(Resource, Action)] = &[
    (Resource::Catalogue, Action::Read),
    (Resource::Catalogue, Action::Create),
    (Resource::Catalogue, Action::Update),
    (Resource::Catalogue, Action::Delete),
    (Resource::Catalogue, Action::Export),
    (Resource::VegetableProduction, Action::Read),
    (Resource::VegetableProduction, Action::Create),
    (Resource::VegetableProduction, Action::Update),
    (Resource::VegetableProduction, Action::Delete),
    (Resource::VegetableProduction, Action::Export),
    (Resource::BiosecurityImport, Action::Read),
    (Resource::BiosecurityImport, Action::Create),
    (Resource::BiosecurityImport, Action::Update),
    (Resource::BiosecurityImport, Action::Delete),
    (Resource::BiosecurityImport, Action::Export),
    (Resource::User, Action::Read),
    (Resource::User, Action::Create),
    (Resource::User, Action::Update),
    (Resource::User, Action::Delete),
    (Resource::Role, Action::Read),
    (Resource::Role, Action::Create),
    (Resource::Role, Action::Update),
    (Resource::Role, Action::Delete),
    (Resource::AuditLog, Action::Read),
];

/// Privilege string required for an operation.
#[must_use]
pub fn required_privilege(resource: Resource, action: Action) -> String {
    format!("{resource}:{action}")
}

/// Asserts the caller holds the privilege the policy table demands.
/// Missing privilege is always an error, never an empty result.
pub fn authorize(
    identity: &Identity,
    resource: Resource,
    action: Action,
) -> Result<(), DomainError> {
    let required = required_privilege(resource, action);

    if identity
        .privileges
        .iter()
        .any(|p| p == WILDCARD_PRIVILEGE || *p == required)
    {
        return Ok(());
    }

    Err(DomainError::Authorization(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallerClass;

    fn identity_with(privileges: &[&str]) -> Identity {
        Identity {
            user_uuid: "u-1".to_string(),
            username: "tester".to_string(),
            privileges: privileges.iter().map(ToString::to_string).collect(),
            class: CallerClass::Root,
        }
    }

    #[test]
    fn test_exact_privilege_grants() {
        let identity = identity_with(&["Catalogue:Read"]);
        assert!(authorize(&identity, Resource::Catalogue, Action::Read).is_ok());
    }

    #[test]
    fn test_missing_privilege_errors() {
        let identity = identity_with(&["Catalogue:Read"]);
        let err = authorize(&identity, Resource::Catalogue, Action::Delete).unwrap_err();
        assert!(err.to_string().contains("Catalogue:Delete"));
    }

    #[test]
    fn test_wildcard_grants_everything() {
        let identity = identity_with(&["*"]);
        for (resource, action) in POLICY {
            assert!(authorize(&identity, *resource, *action).is_ok());
        }
    }

    #[test]
    fn test_policy_covers_exports() {
        assert!(
            POLICY.contains(&(Resource::BiosecurityImport, Action::Export)),
            "export operations must be in the policy table"
        );
    }
}
