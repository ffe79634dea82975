//! # Route Gate decision
//!
//! The single decision function shared by both enforcement points. It is
//! pure: given where the check runs, how the path is classified and who (if
//! anyone) the caller is, it says whether to let the request through.

use crate::auth::principal::AuthenticatedPrincipal;
use crate::gate::path::PathClass;

pub const LOGIN_PATH: &str = "/auth/login";
pub const PROTECTED_HOME_PATH: &str = "/protected";

/// Where the check is being enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enforcement {
    /// Edge middleware in front of every route.
    Middleware,
    /// Guard wrapping the admin subtree at render time.
    AdminLayout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Fixed redirect destinations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTargets {
    /// Where unauthenticated callers go.
    pub login: String,
    /// Where authenticated but unauthorized callers go.
    pub protected_home: String,
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self {
            login: LOGIN_PATH.into(),
            protected_home: PROTECTED_HOME_PATH.into(),
        }
    }
}

/// Decides the outcome of one request at one enforcement point.
///
/// - Middleware lets public paths through without looking at the principal,
///   sends anonymous callers to login, and sends non-admins away from the
///   admin area to the protected home (they are authenticated, just not
///   authorized).
/// - The admin layout only ever guards the admin area: anything short of an
///   admin principal goes to the protected home.
///
/// ## Arguments
/// - `enforcement`: which gate is asking.
/// - `class`: the request path's class, from [`PathClass::of`].
/// - `principal`: the resolved caller, `None` when anonymous.
/// - `targets`: the login and protected-home redirect paths.
///
/// ## Returns
/// [`Decision::Allow`] or [`Decision::Redirect`] with one of `targets`. This
/// function is pure and cannot fail.
pub fn decide(
    enforcement: Enforcement,
    class: PathClass,
    principal: Option<&AuthenticatedPrincipal>,
    targets: &RouteTargets,
) -> Decision {
    match enforcement {
        Enforcement::Middleware => match (class, principal) {
            (PathClass::Public, _) => Decision::Allow,
            (_, None) => Decision::Redirect(targets.login.clone()),
            (PathClass::Admin, Some(p)) if !p.is_admin() => {
                Decision::Redirect(targets.protected_home.clone())
            }
            _ => Decision::Allow,
        },
        Enforcement::AdminLayout => match principal {
            Some(p) if p.is_admin() => Decision::Allow,
            _ => Decision::Redirect(targets.protected_home.clone()),
        },
    }
}
