//! Request middleware and the transport that runs it.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use keycloak::login;
use keycloak::updater::DeadlineUpdater;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

pub const DEFAULT_CLIENT_ID: &str = "admin-cli";
pub const DEFAULT_AUTH_REALM: &str = "master";

/// Tokens are treated as expired this long before the server says they are.
const TOKEN_EXPIRY_LEEWAY: Duration = Duration::from_secs(10);

/// A step every outgoing request passes through before it is sent.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Return the request to send in place of `request`.
    ///
    /// `config` is the client configuration at the time of the call, and
    /// `client` may be used for any requests the middleware needs to make
    /// itself.
    async fn handle(
        &self,
        client: &reqwest::Client,
        config: &Config,
        request: Request,
    ) -> Result<Request>;

    /// Called when the server rejected a request as unauthorized.
    async fn unauthorized(&self) {}
}

/// A reqwest client and the middleware stack applied to each request.
#[derive(Clone, Default)]
pub struct Transport {
    client: reqwest::Client,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Transport {
    pub fn new(client: reqwest::Client) -> Self {
        Transport {
            client,
            middleware: Vec::new(),
        }
    }

    /// Append `middleware` to the stack. Middleware runs in push order.
    pub fn push<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.push(Arc::new(middleware));
    }

    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.push(middleware);
        self
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn send(&self, config: &Config, mut request: Request) -> Result<Response> {
        for middleware in &self.middleware {
            request = middleware.handle(&self.client, config, request).await?;
        }

        let response = self.client.execute(request).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            for middleware in &self.middleware {
                middleware.unauthorized().await;
            }
        }
        Ok(response)
    }
}

#[derive(Clone)]
struct Session {
    access_token: String,
    refresh_token: Option<String>,
    refresh_deadline: Option<SystemTime>,
}

impl Session {
    fn from_response(response: login::Response) -> (SystemTime, Session) {
        let now = SystemTime::now();
        let expires_at = response.expires_at(now).unwrap_or(now);
        let deadline = expires_at
            .checked_sub(TOKEN_EXPIRY_LEEWAY)
            .filter(|deadline| *deadline > now)
            .unwrap_or(now);

        let refresh_deadline = response.refresh_expires_at(now);
        let refresh_token = Some(response.refresh_token).filter(|token| !token.is_empty());

        (
            deadline,
            Session {
                access_token: response.access_token,
                refresh_token,
                refresh_deadline,
            },
        )
    }

    fn refresh_token(&self) -> Option<&str> {
        let usable = self
            .refresh_deadline
            .is_none_or(|deadline| SystemTime::now() < deadline);
        self.refresh_token.as_deref().filter(|_| usable)
    }
}

/// Attaches a bearer token to every request, logging in or refreshing the
/// token against the server's OpenID Connect endpoint when needed.
#[derive(Default)]
pub struct RefreshToken {
    session: DeadlineUpdater<Session>,
}

impl RefreshToken {
    pub fn new() -> Self {
        Self::default()
    }

    async fn access_token(&self, client: &reqwest::Client, config: &Config) -> Result<String> {
        let session = self
            .session
            .get(|previous| renew(client, config, previous))
            .await
            .map_err(Error::Authentication)?;
        Ok(session.access_token)
    }
}

#[async_trait]
impl Middleware for RefreshToken {
    async fn handle(
        &self,
        client: &reqwest::Client,
        config: &Config,
        mut request: Request,
    ) -> Result<Request> {
        let token = self.access_token(client, config).await?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Authentication(format!("Unusable access token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(request)
    }

    async fn unauthorized(&self) {
        log::debug!("Server rejected the access token, forcing a new one on the next request");
        self.session.expire().await;
    }
}

async fn renew(
    client: &reqwest::Client,
    config: &Config,
    previous: Option<Session>,
) -> std::result::Result<(SystemTime, Session), String> {
    let base_uri = config
        .base_uri
        .as_deref()
        .ok_or_else(|| "No baseUri configured for the token endpoint".to_string())?;
    let url = login::token_url(
        base_uri,
        config.auth_realm.as_deref().unwrap_or(DEFAULT_AUTH_REALM),
    );
    let client_id = config
        .client_id
        .clone()
        .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());

    if let Some(refresh_token) = previous.as_ref().and_then(Session::refresh_token) {
        let refreshed = login::refresh_with_client(
            login::RefreshParams {
                client_id: client_id.clone(),
                refresh_token: refresh_token.to_string(),
                url: url.clone(),
            },
            client,
        )
        .await;

        match refreshed {
            Ok(response) => return Ok(Session::from_response(response)),
            Err(e) => log::warn!("Token refresh failed, logging in again: {}", e),
        }
    }

    let response = match (&config.username, &config.password, &config.client_secret) {
        (Some(username), Some(password), _) => {
            login::password_with_client(
                login::PasswordParams {
                    client_id,
                    username: username.clone(),
                    password: password.clone(),
                    url,
                },
                client,
            )
            .await?
        }
        (_, _, Some(client_secret)) => {
            login::client_credentials_with_client(
                login::ClientCredentialsParams {
                    url,
                    client_id,
                    client_secret: client_secret.clone(),
                },
                client,
            )
            .await?
        }
        _ => {
            return Err(
                "No credentials configured: set username and password, or clientSecret"
                    .to_string(),
            );
        }
    };

    Ok(Session::from_response(response))
}
