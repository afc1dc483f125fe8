use crate::command::{self, Command, Params};
use crate::config::{self, Config};
use crate::description::ServiceDescription;
use crate::error::{Error, Result};
use crate::middleware::{RefreshToken, Transport};
use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use serde_json::Value;

/// Client for the Keycloak admin REST API.
///
/// Commands are looked up by name in the service description selected by
/// the configured API version, and always run against the configured realm.
pub struct KeycloakClient {
    config: Config,
    description: ServiceDescription,
    transport: Transport,
}

impl KeycloakClient {
    /// Build a client from a (possibly partial) configuration.
    ///
    /// Missing keys take their defaults (`realm` = `"master"`,
    /// `version` = `"1.0"`). Requests go through a transport with the
    /// [`RefreshToken`] middleware, which logs in with the configured
    /// credentials on first use. Nothing is sent over the network here.
    ///
    /// # Example
    /// ```no_run
    /// use keycloak_admin::{Config, KeycloakClient};
    ///
    /// # async fn run() -> keycloak_admin::Result<()> {
    /// let client = KeycloakClient::factory(Config {
    ///     username: Some("admin".to_string()),
    ///     password: Some("admin".to_string()),
    ///     realm: Some("demo".to_string()),
    ///     base_uri: Some("http://localhost:8080/auth".to_string()),
    ///     ..Config::default()
    /// })?;
    ///
    /// let users = client.get_users(Default::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn factory(config: Config) -> Result<Self> {
        let transport = Transport::new(reqwest::Client::new()).with(RefreshToken::new());
        Self::with_transport(config, transport)
    }

    /// Like [`KeycloakClient::factory`], with a caller-supplied transport.
    pub fn with_transport(config: Config, transport: Transport) -> Result<Self> {
        let config = config::parse_config(config, &Config::defaults());
        let version = config
            .version
            .as_deref()
            .unwrap_or(config::DEFAULT_VERSION);
        let description = ServiceDescription::for_version(version)?;

        Ok(Self::with_description(config, transport, description))
    }

    /// Build a client around an already loaded service description.
    ///
    /// The injected description decides which operations exist, even when its
    /// `apiVersion` differs from the configured `version`; `get_version` keeps
    /// reporting the configured value.
    pub fn with_description(
        config: Config,
        transport: Transport,
        description: ServiceDescription,
    ) -> Self {
        let config = config::parse_config(config, &Config::defaults());
        if config.version.as_deref() != Some(description.api_version.as_str()) {
            log::warn!(
                "Configured API version {:?} differs from service description version {}; using the description",
                config.version,
                description.api_version
            );
        }
        log::debug!(
            "Keycloak client for realm {:?}, API version {:?}",
            config.realm,
            config.version
        );

        KeycloakClient {
            config,
            description,
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }

    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.config.base_uri = Some(base_uri.into());
    }

    pub fn get_base_uri(&self) -> Option<&str> {
        self.config.base_uri.as_deref()
    }

    pub fn set_realm(&mut self, realm: impl Into<String>) {
        self.config.realm = Some(realm.into());
    }

    pub fn get_realm(&self) -> &str {
        self.config.realm.as_deref().unwrap_or(config::DEFAULT_REALM)
    }

    /// Record a new API version.
    ///
    /// The service description is chosen when the client is built; build a
    /// new client to switch to the operations of another version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.config.version = Some(version.into());
    }

    pub fn get_version(&self) -> &str {
        self.config
            .version
            .as_deref()
            .unwrap_or(config::DEFAULT_VERSION)
    }

    /// Resolve the command `name` with `params`, scoped to the client's realm.
    ///
    /// Any `realm` entry in `params` is replaced by [`KeycloakClient::get_realm`].
    pub fn get_command(&self, name: &str, params: Params) -> Result<Command> {
        let params = with_realm(params, self.get_realm());

        let operation = self.description.operation(name).ok_or_else(|| {
            Error::Resolution(format!(
                "Command {} is not part of service description {} {}",
                name, self.description.name, self.description.api_version
            ))
        })?;

        command::resolve(name, operation, params)
    }

    /// Send `command` and decode the JSON response.
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let url = self.request_url(&command.uri)?;

        let mut builder = self
            .transport
            .client()
            .request(command.method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        for (name, value) in &command.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Resolution(format!("Invalid header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Resolution(format!("Invalid value for {}: {}", name, e)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &command.body {
            builder = builder.json(body);
        }
        let request = builder.build()?;

        log::debug!("{} {} ({})", command.method, url, command.name);
        let response = self.transport.send(&self.config, request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                status,
                url: url.to_string(),
                body,
            });
        }

        decode_body(&body, command.empty_response)
    }

    /// Resolve and execute the command `name`.
    pub async fn invoke(&self, name: &str, params: Params) -> Result<Value> {
        let command = self.get_command(name, params)?;
        self.execute(command).await
    }

    fn request_url(&self, uri: &str) -> Result<url::Url> {
        let base_uri = self
            .get_base_uri()
            .ok_or_else(|| Error::Configuration("No baseUri configured".to_string()))?;

        // Join against a directory URL so the base path is kept
        let base = format!("{}/", base_uri.trim_end_matches('/'));
        let base = url::Url::parse(&base)
            .map_err(|e| Error::Configuration(format!("Invalid baseUri {}: {}", base_uri, e)))?;

        base.join(uri)
            .map_err(|e| Error::Resolution(format!("Invalid request URI {}: {}", uri, e)))
    }
}

/// Copy of `params` with `realm` set to `realm`, whatever the caller passed.
pub fn with_realm(mut params: Params, realm: &str) -> Params {
    params.insert("realm".to_string(), Value::String(realm.to_string()));
    params
}

/// Decode a response body as JSON.
///
/// An empty body decodes to `null` only when `allow_empty` is set; otherwise
/// it is a decode error like any other invalid JSON.
pub fn decode_body(body: &str, allow_empty: bool) -> Result<Value> {
    if allow_empty && body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}
