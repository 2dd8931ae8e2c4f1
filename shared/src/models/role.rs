//! Roles and their permission sets
//!
//! Permissions are `resource:action` strings checked by the server's
//! authorization middleware. A user with no role has no permissions at
//! all (fail-closed); the superuser flag on the account bypasses role
//! checks entirely and is not modeled as a role.

use serde::{Deserialize, Serialize};

/// Assignable roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Manager,
    Seller,
    Viewer,
}

/// Manager: full access to every resource
const MANAGER_PERMISSIONS: &[&str] = &[
    "products:read",
    "products:write",
    "customers:read",
    "customers:write",
    "orders:read",
    "orders:write",
];

/// Seller: sells from the catalog but cannot modify it
const SELLER_PERMISSIONS: &[&str] = &[
    "products:read",
    "customers:read",
    "customers:write",
    "orders:read",
    "orders:write",
];

/// Viewer: read-only, and never sees inventory counts
const VIEWER_PERMISSIONS: &[&str] = &[
    "products:read",
    "customers:read",
    "orders:read",
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Seller => "SELLER",
            Self::Viewer => "VIEWER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MANAGER" => Some(Self::Manager),
            "SELLER" => Some(Self::Seller),
            "VIEWER" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// The permission set granted by this role
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Self::Manager => MANAGER_PERMISSIONS,
            Self::Seller => SELLER_PERMISSIONS,
            Self::Viewer => VIEWER_PERMISSIONS,
        }
    }

    /// Whether product reads for this role include the `stock` field
    pub fn stock_visible(&self) -> bool {
        match self {
            Self::Manager | Self::Seller => true,
            Self::Viewer => false,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_has_all_writes() {
        let perms = Role::Manager.permissions();
        assert!(perms.contains(&"products:write"));
        assert!(perms.contains(&"customers:write"));
        assert!(perms.contains(&"orders:write"));
    }

    #[test]
    fn test_seller_cannot_write_catalog() {
        let perms = Role::Seller.permissions();
        assert!(!perms.contains(&"products:write"));
        assert!(perms.contains(&"orders:write"));
        assert!(perms.contains(&"customers:write"));
    }

    #[test]
    fn test_viewer_is_read_only() {
        let perms = Role::Viewer.permissions();
        assert!(perms.iter().all(|p| p.ends_with(":read")));
    }

    #[test]
    fn test_stock_visibility() {
        assert!(Role::Manager.stock_visible());
        assert!(Role::Seller.stock_visible());
        assert!(!Role::Viewer.stock_visible());
    }

    #[test]
    fn test_parse_round_trip() {
        for role in [Role::Manager, Role::Seller, Role::Viewer] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ADMIN"), None);
    }
}
