use super::SecondaryIndex;
use crate::model::{RecordId, User};
use std::collections::HashMap;

/// Maps a login name to the user that declares it.
///
/// Logins are not enforced unique: when two users share one, the user
/// inserted last wins. Builds insert in ascending id order, so that is the
/// highest id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginIndex {
    logins: HashMap<String, RecordId>,
}

impl LoginIndex {
    pub fn lookup(&self, login: &str) -> Option<RecordId> {
        self.logins.get(login).copied()
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl SecondaryIndex<User> for LoginIndex {
    fn insert(&mut self, id: RecordId, user: &User) {
        if !user.login.is_empty() {
            self.logins.insert(user.login.clone(), id);
        }
    }
}
