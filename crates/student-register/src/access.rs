//! Role-based access to roster mutations.
//!
//! Every call that changes the store takes an [`AccessContext`] so the
//! caller decides, explicitly, who is acting. Admins may change records;
//! any other role is view-only.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// The role a user is acting under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May add, edit, and remove records and restore backups.
    Admin,
    /// Read-only access.
    #[default]
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessContext {
    role: Role,
}

impl AccessContext {
    /// A context acting under the given role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// An admin context.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// A guest (view-only) context.
    #[must_use]
    pub fn guest() -> Self {
        Self::new(Role::Guest)
    }

    /// Resolve a PIN against the configured PINs.
    ///
    /// No PIN means guest access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncorrectPin`] if a PIN is given and matches neither role.
    pub fn from_pin(pin: Option<&str>, auth: &AuthConfig) -> Result<Self> {
        let role = match pin.map(str::trim) {
            None => Role::Guest,
            Some(pin) if pin == auth.admin_pin => Role::Admin,
            Some(pin) if pin == auth.guest_pin => Role::Guest,
            Some(_) => return Err(Error::IncorrectPin),
        };
        debug!(%role, "Resolved access role");
        Ok(Self::new(role))
    }

    /// The role of this context.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this context may change records.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless this context may change records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] naming `action` for non-admins.
    pub fn require_edit(&self, action: &'static str) -> Result<()> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(Error::PermissionDenied { action })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pin_is_guest() {
        let ctx = AccessContext::from_pin(None, &AuthConfig::default()).unwrap();
        assert_eq!(ctx.role(), Role::Guest);
        assert!(!ctx.can_edit());
    }

    #[test]
    fn test_admin_pin() {
        let auth = AuthConfig::default();
        let ctx = AccessContext::from_pin(Some(&auth.admin_pin), &auth).unwrap();
        assert_eq!(ctx.role(), Role::Admin);
        assert!(ctx.can_edit());
    }

    #[test]
    fn test_guest_pin() {
        let auth = AuthConfig::default();
        let ctx = AccessContext::from_pin(Some(&auth.guest_pin), &auth).unwrap();
        assert_eq!(ctx.role(), Role::Guest);
    }

    #[test]
    fn test_wrong_pin() {
        let err = AccessContext::from_pin(Some("9999"), &AuthConfig::default()).unwrap_err();
        assert!(matches!(err, Error::IncorrectPin));
    }

    #[test]
    fn test_require_edit() {
        assert!(AccessContext::admin().require_edit("add student").is_ok());

        let err = AccessContext::guest()
            .require_edit("add student")
            .unwrap_err();
        assert!(err.to_string().contains("add student"));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Guest.to_string(), "guest");
        assert_eq!(Role::default(), Role::Guest);
    }
}
