use base64::Engine;
use serde::Deserialize;
use std::time::{Duration, SystemTime};

pub struct ClientCredentialsParams {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

pub struct PasswordParams {
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub url: String,
}

pub struct RefreshParams {
    pub client_id: String,
    pub refresh_token: String,
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Response {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u32,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_expires_in: u32,
    #[serde(default)]
    pub token_type: String,
}

impl Response {
    /// Decode the claims section of the access token JWT.
    ///
    /// The signature is not verified; the server that issued the token is the
    /// one we send it back to.
    pub fn claims(&self) -> Result<serde_json::Value, String> {
        // JWT format: header.payload.signature
        let parts: Vec<&str> = self.access_token.split('.').collect();
        if parts.len() != 3 {
            return Err("Invalid JWT format".to_string());
        }

        // Keycloak emits URL-safe base64 without padding, but tolerate padded payloads
        let payload = parts[1].trim_end_matches('=');
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| format!("Failed to decode JWT payload: {}", e))?;

        serde_json::from_slice(&decoded)
            .map_err(|e| format!("Failed to parse JWT payload JSON: {}", e))
    }

    /// Expiry of the access token.
    ///
    /// Uses `expires_in` when the server sent it, otherwise the `exp` claim of
    /// the token itself. Returns `None` when neither is available.
    pub fn expires_at(&self, issued_at: SystemTime) -> Option<SystemTime> {
        if self.expires_in > 0 {
            return Some(issued_at + Duration::from_secs(u64::from(self.expires_in)));
        }

        let exp = self.claims().ok()?.get("exp")?.as_u64()?;
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(exp))
    }

    /// Expiry of the refresh token, `None` if the server did not bound it.
    pub fn refresh_expires_at(&self, issued_at: SystemTime) -> Option<SystemTime> {
        if self.refresh_token.is_empty() || self.refresh_expires_in == 0 {
            return None;
        }
        Some(issued_at + Duration::from_secs(u64::from(self.refresh_expires_in)))
    }
}

pub async fn client_credentials(params: ClientCredentialsParams) -> Result<Response, String> {
    let client = reqwest::Client::new();
    client_credentials_with_client(params, &client).await
}

pub async fn client_credentials_with_client(
    params: ClientCredentialsParams,
    client: &reqwest::Client,
) -> Result<Response, String> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", &*params.client_id),
        ("client_secret", &*params.client_secret),
    ];

    log::debug!("Requesting token (client_credentials) from {}", params.url);
    let res = client
        .post(params.url)
        .form(&form)
        .send()
        .await
        .map_err(|e| format!("Keycloak client_credentials login request error: {}", e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| format!("Failed to read response (client_credentials): {}", e))?;
    if !status.is_success() {
        return Err(format!(
            "Failed to get token (client_credentials) [{}]: {}",
            status, body
        ));
    }
    let response: Response = serde_json::from_str(&body)
        .map_err(|e| format!("Failed to parse response (client_credentials): {}", e))?;

    Ok(response)
}

pub async fn password(params: PasswordParams) -> Result<Response, String> {
    let client = reqwest::Client::new();
    password_with_client(params, &client).await
}

pub async fn password_with_client(
    params: PasswordParams,
    client: &reqwest::Client,
) -> Result<Response, String> {
    let form = [
        ("grant_type", "password"),
        ("client_id", &*params.client_id),
        ("username", &*params.username),
        ("password", &*params.password),
    ];

    log::debug!(
        "Requesting token (password) for {} from {}",
        params.username,
        params.url
    );
    let res = client
        .post(params.url)
        .form(&form)
        .send()
        .await
        .map_err(|e| format!("Keycloak password login request error: {}", e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;
    if !status.is_success() {
        return Err(format!(
            "Failed to get token (password) [{}]: {}",
            status, body
        ));
    }
    let response: Response = serde_json::from_str(&body)
        .map_err(|e| format!("Failed to parse response (password): {}", e))?;

    Ok(response)
}

pub async fn refresh(params: RefreshParams) -> Result<Response, String> {
    let client = reqwest::Client::new();
    refresh_with_client(params, &client).await
}

pub async fn refresh_with_client(
    params: RefreshParams,
    client: &reqwest::Client,
) -> Result<Response, String> {
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", &*params.client_id),
        ("refresh_token", &*params.refresh_token),
    ];

    log::debug!("Refreshing token at {}", params.url);
    let res = client
        .post(params.url)
        .form(&form)
        .send()
        .await
        .map_err(|e| format!("Keycloak refresh token request error: {}", e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| format!("Failed to read response (refresh): {}", e))?;
    if !status.is_success() {
        return Err(format!("Failed to refresh token [{}]: {}", status, body));
    }
    let response: Response = serde_json::from_str(&body)
        .map_err(|e| format!("Failed to parse response (refresh): {}", e))?;

    Ok(response)
}

/// Token endpoint of `realm`, relative to the server's base URI.
///
/// `base_uri` is the same root the admin API lives under, e.g.
/// `https://sso.example.com/auth` on servers that still use the `/auth` prefix.
pub fn token_url(base_uri: &str, realm: &str) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/token",
        base_uri.trim_end_matches('/'),
        realm
    )
}

pub fn token_master_url(base_uri: &str) -> String {
    token_url(base_uri, "master")
}
