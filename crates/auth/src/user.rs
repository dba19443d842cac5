//! Admin-panel user directory: account records, status changes and list filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, Filter, UserId, matches_search};

use crate::Role;

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User can sign in and act.
    #[default]
    Active,
    /// User deactivated their account (or was never activated).
    Inactive,
    /// User was blocked by an admin.
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the user management table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub joined_at: DateTime<Utc>,
}

/// Apply an admin's status change to an account.
///
/// Admins cannot change their own status (no self-lockout), and setting the
/// current status again is a conflict.
pub fn change_user_status(
    acting_admin: UserId,
    account: &mut UserAccount,
    status: UserStatus,
) -> Result<(), DomainError> {
    if account.id == acting_admin {
        return Err(DomainError::invariant("admins cannot change their own status"));
    }
    if account.status == status {
        return Err(DomainError::conflict(format!("user is already {status}")));
    }
    account.status = status;
    Ok(())
}

/// User list filter: search (name/email) AND role AND status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Filter<UserAccount> for UserFilter {
    fn matches(&self, user: &UserAccount) -> bool {
        matches_search(self.search.as_deref(), &[&user.name, &user.email])
            && self.role.as_ref().is_none_or(|role| &user.role == role)
            && self.status.is_none_or(|status| user.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn account(name: &str, email: &str, role: Role, status: UserStatus) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            joined_at: Utc::now(),
        }
    }

    fn seeded_users() -> Vec<UserAccount> {
        vec![
            account("Amina Yusuf", "amina@bazaar.test", Role::ADMIN, UserStatus::Active),
            account("Bruno Costa", "bruno@bazaar.test", Role::ADMIN, UserStatus::Suspended),
            account("Chen Wei", "chen@vendors.test", Role::VENDOR, UserStatus::Active),
            account("Dana Levi", "dana@bazaar.test", Role::ADMIN, UserStatus::Active),
        ]
    }

    #[test]
    fn role_and_status_filters_intersect() {
        let users = seeded_users();
        let filter = UserFilter::default().role(Role::ADMIN).status(UserStatus::Active);
        let names: Vec<_> = filter.select(&users).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Amina Yusuf", "Dana Levi"]);
    }

    #[test]
    fn search_matches_name_or_email_case_insensitively() {
        let users = seeded_users();
        assert_eq!(UserFilter::default().search("VENDORS.test").select(&users).len(), 1);
        assert_eq!(UserFilter::default().search("bruno").select(&users).len(), 1);
        assert_eq!(UserFilter::default().select(&users).len(), 4);
    }

    #[test]
    fn admin_cannot_change_own_status() {
        let mut me = account("Me", "me@bazaar.test", Role::ADMIN, UserStatus::Active);
        let err = change_user_status(me.id, &mut me, UserStatus::Suspended).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(me.status, UserStatus::Active);
    }

    #[test]
    fn suspending_twice_is_a_conflict() {
        let admin = UserId::new();
        let mut user = account("Eve", "eve@bazaar.test", Role::VENDOR, UserStatus::Active);
        change_user_status(admin, &mut user, UserStatus::Suspended).unwrap();
        assert_eq!(user.status, UserStatus::Suspended);
        let err = change_user_status(admin, &mut user, UserStatus::Suspended).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::ADMIN), Just(Role::VENDOR), Just(Role::CUSTOMER)]
    }

    fn arb_status() -> impl Strategy<Value = UserStatus> {
        prop_oneof![
            Just(UserStatus::Active),
            Just(UserStatus::Inactive),
            Just(UserStatus::Suspended)
        ]
    }

    proptest! {
        /// Property: the combined filter equals the intersection of the single filters.
        #[test]
        fn combined_filter_is_intersection(
            rows in prop::collection::vec(("[a-e]{1,6}", arb_role(), arb_status()), 0..40),
            term in proptest::option::of("[a-e]{1,2}"),
            role in proptest::option::of(arb_role()),
            status in proptest::option::of(arb_status()),
        ) {
            let users: Vec<UserAccount> = rows
                .into_iter()
                .map(|(name, role, status)| account(&name, &format!("{name}@x.test"), role, status))
                .collect();

            let combined = UserFilter { search: term.clone(), role: role.clone(), status };
            let by_search = UserFilter { search: term, ..UserFilter::default() };
            let by_role = UserFilter { role, ..UserFilter::default() };
            let by_status = UserFilter { status, ..UserFilter::default() };

            let expected: Vec<UserId> = users
                .iter()
                .filter(|u| by_search.matches(u) && by_role.matches(u) && by_status.matches(u))
                .map(|u| u.id)
                .collect();
            let actual: Vec<UserId> = combined.select(&users).into_iter().map(|u| u.id).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
