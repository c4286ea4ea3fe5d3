//! API message and error structs.

use derive_more::{Display, Error};

use serde::{Deserialize, Serialize};

/// A confirmation message.
///
/// `status` repeats the HTTP status code the message was sent with.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiMessage {
    pub message: String,
    pub status: u16,
}

impl ApiMessage {
    /// Creates a new `200 OK` message.
    pub fn ok(message: impl Into<String>) -> ApiMessage {
        ApiMessage {
            message: message.into(),
            status: 200,
        }
    }
}

/// An API error.
#[derive(Clone, Debug, Display, Deserialize, Error, Serialize, PartialEq, Eq)]
#[display("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}
