use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "products.review").
/// The wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));

    /// Approve, reject or request changes on pending products.
    pub const PRODUCTS_REVIEW: Permission = Permission(Cow::Borrowed("products.review"));
    /// Create, edit and submit own products.
    pub const PRODUCTS_SUBMIT: Permission = Permission(Cow::Borrowed("products.submit"));
    pub const PRODUCTS_DELETE: Permission = Permission(Cow::Borrowed("products.delete"));
    /// Move orders through fulfilment (process, ship, deliver, cancel).
    pub const ORDERS_FULFIL: Permission = Permission(Cow::Borrowed("orders.fulfil"));
    pub const ORDERS_REFUND: Permission = Permission(Cow::Borrowed("orders.refund"));
    pub const USERS_MANAGE: Permission = Permission(Cow::Borrowed("users.manage"));
    pub const FINANCE_READ: Permission = Permission(Cow::Borrowed("finance.read"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
