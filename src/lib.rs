//! Account directory backend.
//!
//! Stores user records and exposes them over HTTP, with a login check and
//! self-service registration.

pub mod app;
pub mod cli;
pub mod config;
pub mod directory;
pub mod routes;
pub mod store;
