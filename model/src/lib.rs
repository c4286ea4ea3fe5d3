//! API model representations.

pub mod error;
pub mod request;
pub mod user;

pub use error::{ApiError, ApiMessage};
pub use user::{LoginUser, User};
