//! Session identity.
//!
//! Holds the currently authenticated user, restored from its storage
//! snapshot at open. The session gates which aggregation scope applies; it
//! carries no tokens and never expires.

use crate::models::{User, UserRole};

/// The current authenticated user, if any
#[derive(Debug, Default)]
pub struct Session {
    current: Option<User>,
}

impl Session {
    pub(crate) fn restore(user: Option<User>) -> Self {
        Self { current: user }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// True when the session user holds one of the given roles
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        self.current
            .as_ref()
            .map(|u| roles.contains(&u.role))
            .unwrap_or(false)
    }

    pub(crate) fn set(&mut self, user: User) {
        self.current = Some(user);
    }

    pub(crate) fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(role: UserRole) -> User {
        User {
            id: "user-00000001".into(),
            name: "A".into(),
            email: "a@example.com".into(),
            password: "pw".into(),
            role,
            avatar: String::new(),
            department: String::new(),
            phone: String::new(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_has_role() {
        let session = Session::restore(Some(user(UserRole::ProjectManager)));
        assert!(session.has_role(&[UserRole::Admin, UserRole::ProjectManager]));
        assert!(!session.has_role(&[UserRole::Admin]));
    }

    #[test]
    fn test_unauthenticated_has_no_role() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(!session.has_role(&[UserRole::Admin]));
    }
}
