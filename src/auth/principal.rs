use serde::{Deserialize, Serialize};

use crate::auth::role::Role;

/// The caller's identity as reported by the identity provider.
///
/// This is the *result of authentication only*: it carries no role and no
/// profile data. Authorization must go through [`AuthenticatedPrincipal`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque, immutable account id issued by the provider.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Descriptive profile metadata. Never an authorization source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
}

/// A fully resolved, authenticated caller.
///
/// # Overview
///
/// Produced only by [`SessionResolver`](crate::auth::resolver::SessionResolver)
/// after the identity, session, role claim and profile row have all been
/// checked against each other.
///
/// `role` always comes from the decoded `user_role` session-token claim. The
/// profile row may disagree with it (for example right after an admin changed
/// someone's role); the claim wins until the session is re-issued.
///
/// ```rust
/// use rbac_gate::auth::principal::{AuthenticatedPrincipal, Identity, Profile};
/// use rbac_gate::auth::role::Role;
///
/// let principal = AuthenticatedPrincipal::new(
///     Identity::new("7f1c"),
///     Role::Admin,
///     Profile { username: "root".into() },
/// );
/// assert!(principal.is_admin());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthenticatedPrincipal {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub profile: Profile,
}

impl AuthenticatedPrincipal {
    pub fn new(identity: Identity, role: Role, profile: Profile) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            role,
            profile,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }
}
