//! User request bodies.

use garde::Validate;

use serde::{Deserialize, Serialize};

/// Request body for creating or replacing a user.
///
/// `money` and `admin` fall back to `0` and `false` when omitted.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct UserRequest {
    /// The name of the user.
    #[garde(length(min = 1))]
    pub name: String,
    /// The password of the user.
    #[garde(length(min = 1))]
    pub password: String,
    /// The starting balance.
    #[serde(default)]
    #[garde(skip)]
    pub money: i64,
    /// The admin flag.
    #[serde(default)]
    #[garde(skip)]
    pub admin: bool,
}

/// Request body for registering.
///
/// Any `money` or `admin` fields sent along are ignored.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// Login credentials.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
