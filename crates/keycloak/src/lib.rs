//! OpenID Connect token grants against a Keycloak server and a small
//! deadline cache for keeping the resulting tokens fresh.

pub mod login;
pub mod updater;
