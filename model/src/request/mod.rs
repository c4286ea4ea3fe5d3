//! Request bodies.

pub mod user;
