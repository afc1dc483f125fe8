//! Client for the Keycloak admin REST API.
//!
//! Admin operations are data: a versioned service description maps each
//! command name to an HTTP request template. [`KeycloakClient`] resolves
//! commands against it, scopes every command to the configured realm and
//! sends it with a bearer token obtained by the [`RefreshToken`] middleware.

pub mod client;
pub mod command;
pub mod config;
pub mod description;
pub mod error;
pub mod middleware;
mod operations;

pub use client::KeycloakClient;
pub use command::{Command, Params};
pub use config::Config;
pub use description::ServiceDescription;
pub use error::{Error, ErrorKind, Result};
pub use middleware::{Middleware, RefreshToken, Transport};
