//! User representations.

use serde::{Deserialize, Serialize};

/// A single user record, as stored.
///
/// The password is returned verbatim; the directory does not hash anything.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct User {
    /// The unique, server-assigned id of the user.
    pub id: String,
    /// The name of the user.
    pub name: String,
    /// The password of the user.
    pub password: String,
    /// How much money they have.
    pub money: i64,
    /// Whether the user is an admin.
    pub admin: bool,
}

/// The user returned by a successful `/login`.
///
/// Everything but the id and name is withheld.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
}

impl From<User> for LoginUser {
    fn from(value: User) -> Self {
        LoginUser {
            id: value.id,
            name: value.name,
        }
    }
}
