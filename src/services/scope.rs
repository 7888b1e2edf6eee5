//! Record-visibility scoping.
//!
//! Pure derivation from the caller's identity plus the requested
//! point-of-entry filter; repositories translate the resulting [`Scope`] into
//! query predicates against their own columns.

use crate::constants::ALL_POINTS_OF_ENTRY;
use crate::models::{CallerClass, Identity};

/// Visibility restriction applied to every scoped query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No restriction (root, enforcement officers, explicit "All" opt-out).
    Unrestricted,

    /// Records owned by one of these companies only.
    Companies(Vec<String>),

    /// Records belonging to this district/control-post pair only.
    Post {
        district: String,
        control_post: String,
    },
}

/// Derives the scope for a caller, in priority order: farmers are always
/// restricted to their linked companies; non-enforcement officers with a post
/// assignment are restricted to it unless the literal `"All"` sentinel was
/// requested; everyone else is unrestricted.
#[must_use]
pub fn scope_for(identity: &Identity, point_of_entry: Option<&str>) -> Scope {
    match &identity.class {
        CallerClass::Farmer { company_uuids, .. } => Scope::Companies(company_uuids.clone()),

        CallerClass::Officer {
            district,
            control_post,
            enforcement_only,
        } => {
            if *enforcement_only {
                return Scope::Unrestricted;
            }
            if point_of_entry == Some(ALL_POINTS_OF_ENTRY) {
                return Scope::Unrestricted;
            }
            if district.is_empty() && control_post.is_empty() {
                return Scope::Unrestricted;
            }
            Scope::Post {
                district: district.clone(),
                control_post: control_post.clone(),
            }
        }

        CallerClass::Root => Scope::Unrestricted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer(district: &str, post: &str, enforcement_only: bool) -> Identity {
        Identity {
            user_uuid: "u-1".to_string(),
            username: "officer1".to_string(),
            privileges: vec![],
            class: CallerClass::Officer {
                district: district.to_string(),
                control_post: post.to_string(),
                enforcement_only,
            },
        }
    }

    #[test]
    fn test_farmer_scoped_to_linked_companies() {
        let identity = Identity {
            user_uuid: "u-2".to_string(),
            username: "farmer1".to_string(),
            privileges: vec![],
            class: CallerClass::Farmer {
                ic_number: "880101-01-1234".to_string(),
                company_uuids: vec!["c-1".to_string(), "c-2".to_string()],
            },
        };

        assert_eq!(
            scope_for(&identity, None),
            Scope::Companies(vec!["c-1".to_string(), "c-2".to_string()])
        );
        // The sentinel never widens a farmer's visibility.
        assert_eq!(
            scope_for(&identity, Some(ALL_POINTS_OF_ENTRY)),
            Scope::Companies(vec!["c-1".to_string(), "c-2".to_string()])
        );
    }

    #[test]
    fn test_district_officer_scoped_to_post() {
        let identity = officer("Kuching", "Tebedu", false);
        assert_eq!(
            scope_for(&identity, None),
            Scope::Post {
                district: "Kuching".to_string(),
                control_post: "Tebedu".to_string(),
            }
        );
    }

    #[test]
    fn test_enforcement_officer_unrestricted() {
        let identity = officer("Kuching", "Tebedu", true);
        assert_eq!(scope_for(&identity, None), Scope::Unrestricted);
    }

    #[test]
    fn test_all_sentinel_lifts_post_predicate() {
        let identity = officer("Kuching", "Tebedu", false);
        assert_eq!(
            scope_for(&identity, Some(ALL_POINTS_OF_ENTRY)),
            Scope::Unrestricted
        );
        // A concrete point of entry does not lift the scope; it is applied as
        // an ordinary filter on top of it.
        assert_ne!(scope_for(&identity, Some("Tebedu")), Scope::Unrestricted);
    }

    #[test]
    fn test_root_unrestricted() {
        let identity = Identity {
            user_uuid: "u-0".to_string(),
            username: "root".to_string(),
            privileges: vec!["*".to_string()],
            class: CallerClass::Root,
        };
        assert_eq!(scope_for(&identity, None), Scope::Unrestricted);
    }

    #[test]
    fn test_unassigned_officer_unrestricted() {
        let identity = officer("", "", false);
        assert_eq!(scope_for(&identity, None), Scope::Unrestricted);
    }
}
