//! Named admin operations of the bundled 1.0 service description.
//!
//! Each method is a plain call to [`KeycloakClient::invoke`] with the
//! operation's name; parameters and response are passed through untouched.

use crate::client::KeycloakClient;
use crate::command::Params;
use crate::error::Result;
use serde_json::Value;

impl KeycloakClient {
    /// Clear login failures for all users of the realm, releasing temporarily disabled users.
    pub async fn clear_all_login_failures(&self, params: Params) -> Result<Value> {
        self.invoke("clearAllLoginFailures", params).await
    }

    /// Brute force detection status of a user. Requires `userId`.
    pub async fn get_brute_force_user_status(&self, params: Params) -> Result<Value> {
        self.invoke("getBruteForceUserStatus", params).await
    }

    /// Clear login failures of one user. Requires `userId`.
    pub async fn clear_user_login_failures(&self, params: Params) -> Result<Value> {
        self.invoke("clearUserLoginFailures", params).await
    }

    pub async fn get_authenticator_providers(&self, params: Params) -> Result<Value> {
        self.invoke("getAuthenticatorProviders", params).await
    }

    pub async fn get_client_authenticator_providers(&self, params: Params) -> Result<Value> {
        self.invoke("getClientAuthenticatorProviders", params).await
    }

    /// Configuration description of an authenticator provider. Requires `providerId`.
    pub async fn get_authenticator_config_info(&self, params: Params) -> Result<Value> {
        self.invoke("getAuthenticatorConfigInfo", params).await
    }

    /// Requires `id`.
    pub async fn get_authenticator_config(&self, params: Params) -> Result<Value> {
        self.invoke("getAuthenticatorConfig", params).await
    }

    /// Requires `id`; `alias` and `config` are sent in the body.
    pub async fn update_authenticator_config(&self, params: Params) -> Result<Value> {
        self.invoke("updateAuthenticatorConfig", params).await
    }

    /// Requires `id`.
    pub async fn delete_authenticator_config(&self, params: Params) -> Result<Value> {
        self.invoke("deleteAuthenticatorConfig", params).await
    }

    /// Create a user. Requires `username`; any other parameter is sent as part of the user representation.
    pub async fn create_user(&self, params: Params) -> Result<Value> {
        self.invoke("createUser", params).await
    }

    /// List users, filtered by `search`, `username`, `email`, `firstName`, `lastName` and paged with `first`/`max`.
    pub async fn get_users(&self, params: Params) -> Result<Value> {
        self.invoke("getUsers", params).await
    }

    /// Requires `id`.
    pub async fn get_user(&self, params: Params) -> Result<Value> {
        self.invoke("getUser", params).await
    }

    /// List clients, optionally filtered by `clientId`.
    pub async fn get_clients(&self, params: Params) -> Result<Value> {
        self.invoke("getClients", params).await
    }

    /// Users holding a client role. Requires `id` (client UUID) and `roleName`.
    pub async fn get_client_role_users(&self, params: Params) -> Result<Value> {
        self.invoke("getClientRoleUsers", params).await
    }

    /// Requires `id` (client UUID).
    pub async fn get_client_roles(&self, params: Params) -> Result<Value> {
        self.invoke("getClientRoles", params).await
    }

    /// Requires `id` (client UUID) and `roleName`.
    pub async fn get_client_role(&self, params: Params) -> Result<Value> {
        self.invoke("getClientRole", params).await
    }
}
