//! # Path classification
//!
//! Every request path falls into exactly one [`PathClass`]:
//!
//! | Path | Class |
//! |------|-------|
//! | `/` | `Public` |
//! | anything starting with `/auth` | `Public` |
//! | anything starting with `/admin` | `Admin` |
//! | anything else | `Protected` |
//!
//! Prefixes are plain string prefixes, not path segments: `/authors` is
//! `Public` and `/administrator` belongs to the admin area.

pub const AUTH_PREFIX: &str = "/auth";
pub const ADMIN_PREFIX: &str = "/admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathClass {
    Public,
    Protected,
    Admin,
}

impl PathClass {
    /// Classifies a request path (without query string).
    ///
    /// ```
    /// use rbac_gate::gate::path::PathClass;
    ///
    /// assert_eq!(PathClass::of("/"), PathClass::Public);
    /// assert_eq!(PathClass::of("/auth/login"), PathClass::Public);
    /// assert_eq!(PathClass::of("/admin/users"), PathClass::Admin);
    /// assert_eq!(PathClass::of("/protected"), PathClass::Protected);
    /// ```
    pub fn of(path: &str) -> Self {
        if path == "/" || path.starts_with(AUTH_PREFIX) {
            PathClass::Public
        } else if path.starts_with(ADMIN_PREFIX) {
            PathClass::Admin
        } else {
            PathClass::Protected
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, PathClass::Public)
    }
}
