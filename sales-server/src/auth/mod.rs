//! Authentication and authorization
//!
//! Bearer-token (JWT) authentication plus role-based authorization.
//! Every protected route is gated by [`middleware::require_permission`];
//! a user with no role and no superuser flag is denied everywhere.

pub mod jwt;
pub mod middleware;

pub use middleware::{require_auth, require_permission};

use shared::models::Role;

/// Authenticated user, injected into request extensions by `require_auth`
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Option<Role>,
    pub is_superuser: bool,
}

impl CurrentUser {
    /// Check whether this user holds a `resource:action` permission.
    ///
    /// Superusers bypass the check. A user without a role holds no
    /// permissions at all (fail-closed).
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_superuser {
            return true;
        }
        let Some(role) = self.role else {
            return false;
        };
        role.permissions().contains(&permission)
    }

    /// Whether product reads for this user include the `stock` field
    pub fn stock_visible(&self) -> bool {
        self.is_superuser || self.role.is_some_and(|r| r.stock_visible())
    }
}

impl From<jwt::Claims> for CurrentUser {
    fn from(claims: jwt::Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            is_superuser: claims.su,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Option<Role>, is_superuser: bool) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "test".to_string(),
            role,
            is_superuser,
        }
    }

    #[test]
    fn test_superuser_bypasses_all_checks() {
        let su = user(None, true);
        assert!(su.has_permission("products:write"));
        assert!(su.has_permission("orders:write"));
        assert!(su.stock_visible());
    }

    #[test]
    fn test_no_role_is_denied_everything() {
        let norole = user(None, false);
        assert!(!norole.has_permission("products:read"));
        assert!(!norole.has_permission("orders:read"));
        assert!(!norole.stock_visible());
    }

    #[test]
    fn test_seller_permissions() {
        let seller = user(Some(Role::Seller), false);
        assert!(seller.has_permission("orders:write"));
        assert!(!seller.has_permission("products:write"));
    }

    #[test]
    fn test_viewer_never_sees_stock() {
        let viewer = user(Some(Role::Viewer), false);
        assert!(viewer.has_permission("products:read"));
        assert!(!viewer.stock_visible());
    }
}
