use serde::{Deserialize, Serialize};

use bazaar_core::{UserId, VendorId};

use crate::Role;

/// The signed-in actor a dashboard acts on behalf of.
///
/// Vendors carry the vendor account they operate; admins do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub roles: Vec<Role>,
    pub vendor_id: Option<VendorId>,
}

impl Principal {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: vec![Role::ADMIN],
            vendor_id: None,
        }
    }

    pub fn vendor(user_id: UserId, vendor_id: VendorId) -> Self {
        Self {
            user_id,
            roles: vec![Role::VENDOR],
            vendor_id: Some(vendor_id),
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::ADMIN)
    }
}
