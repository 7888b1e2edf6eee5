use serde::{Deserialize, Serialize};

/// Snapshot of the acting user embedded into records and audit entries.
/// Deliberately not a foreign key: attribution survives later changes to the
/// actor's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub uuid: String,
    pub username: String,
}

/// Visibility class of the caller, resolved once at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerClass {
    /// Superuser; sees everything.
    Root,

    /// District/control-post scoped officer. Enforcement officers see
    /// cross-district data.
    Officer {
        district: String,
        control_post: String,
        enforcement_only: bool,
    },

    /// Farmer, restricted to the companies linked to their IC number.
    /// The company list is resolved at session-build time via the
    /// farmer_companies reverse lookup.
    Farmer {
        ic_number: String,
        company_uuids: Vec<String>,
    },
}

/// Authenticated caller context carried in the cookie session and injected
/// into every resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_uuid: String,
    pub username: String,
    pub privileges: Vec<String>,
    pub class: CallerClass,
}

impl Identity {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor {
            uuid: self.user_uuid.clone(),
            username: self.username.clone(),
        }
    }
}
