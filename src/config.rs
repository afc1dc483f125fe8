use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_REALM: &str = "master";
pub const DEFAULT_VERSION: &str = "1.0";

/// Client configuration.
///
/// Every key is optional. [`parse_config`] fills the missing ones from
/// [`Config::defaults`] when the client is built.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub realm: Option<String>,
    pub version: Option<String>,
    pub base_uri: Option<String>,
    /// OAuth client used for token grants, `admin-cli` when unset
    pub client_id: Option<String>,
    /// Enables the client credentials grant when no username/password is set
    pub client_secret: Option<String>,
    /// Realm whose token endpoint issues admin tokens, `master` when unset
    pub auth_realm: Option<String>,
}

impl Config {
    pub fn defaults() -> Self {
        Config {
            username: None,
            password: None,
            realm: Some(DEFAULT_REALM.to_string()),
            version: Some(DEFAULT_VERSION.to_string()),
            base_uri: None,
            ..Config::default()
        }
    }

    /// Read the configuration from `KEYCLOAK_*` environment variables.
    ///
    /// Unset variables stay `None`; call `dotenvy::dotenv()` beforehand to
    /// pick up a `.env` file.
    pub fn from_env() -> Self {
        Config {
            username: env::var("KEYCLOAK_USERNAME").ok(),
            password: env::var("KEYCLOAK_PASSWORD").ok(),
            realm: env::var("KEYCLOAK_REALM").ok(),
            version: env::var("KEYCLOAK_VERSION").ok(),
            base_uri: env::var("KEYCLOAK_BASE_URI").ok(),
            client_id: env::var("KEYCLOAK_CLIENT_ID").ok(),
            client_secret: env::var("KEYCLOAK_CLIENT_SECRET").ok(),
            auth_realm: env::var("KEYCLOAK_AUTH_REALM").ok(),
        }
    }
}

/// Apply `defaults` to every key of `config` that is absent or empty.
///
/// Only `None` and `""` count as empty, so values like `"0"` survive.
/// There is no nesting to merge: each key is replaced or kept as a whole.
pub fn parse_config(config: Config, defaults: &Config) -> Config {
    Config {
        username: or_default(config.username, &defaults.username),
        password: or_default(config.password, &defaults.password),
        realm: or_default(config.realm, &defaults.realm),
        version: or_default(config.version, &defaults.version),
        base_uri: or_default(config.base_uri, &defaults.base_uri),
        client_id: or_default(config.client_id, &defaults.client_id),
        client_secret: or_default(config.client_secret, &defaults.client_secret),
        auth_realm: or_default(config.auth_realm, &defaults.auth_realm),
    }
}

fn or_default(value: Option<String>, default: &Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => default.clone(),
    }
}
