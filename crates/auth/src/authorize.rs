use std::collections::{HashMap, HashSet};

use thiserror::Error;

use bazaar_core::VendorId;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: resource belongs to another vendor")]
    VendorMismatch,
}

/// Role → permission mapping.
///
/// The default policy mirrors the marketplace's two dashboards: admins hold the
/// wildcard, vendors manage their own catalog and fulfil their own orders.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    grants: HashMap<Role, Vec<Permission>>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        let mut grants = HashMap::new();
        grants.insert(Role::ADMIN, vec![Permission::WILDCARD]);
        grants.insert(
            Role::VENDOR,
            vec![
                Permission::PRODUCTS_SUBMIT,
                Permission::PRODUCTS_DELETE,
                Permission::ORDERS_FULFIL,
            ],
        );
        grants.insert(Role::CUSTOMER, Vec::new());
        Self { grants }
    }
}

impl RolePolicy {
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    pub fn grant(mut self, role: Role, permission: Permission) -> Self {
        self.grants.entry(role).or_default().push(permission);
        self
    }

    /// Effective permissions of a principal across all its roles.
    pub fn permissions_of(&self, principal: &Principal) -> HashSet<Permission> {
        principal
            .roles
            .iter()
            .filter_map(|role| self.grants.get(role))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn authorize(
        &self,
        principal: &Principal,
        required: &Permission,
    ) -> Result<(), AuthzError> {
        let perms = self.permissions_of(principal);
        if perms.contains(&Permission::WILDCARD) || perms.contains(required) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden(required.as_str().to_string()))
        }
    }
}

/// Authorize a principal against the default role policy.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    RolePolicy::default().authorize(principal, required)
}

/// Vendors may only act on resources they own; admins act on any vendor's.
pub fn ensure_vendor_scope(principal: &Principal, owner: VendorId) -> Result<(), AuthzError> {
    if principal.is_admin() {
        return Ok(());
    }
    match principal.vendor_id {
        Some(vendor_id) if vendor_id == owner => Ok(()),
        _ => Err(AuthzError::VendorMismatch),
    }
}
