//! Client configuration and the places it can be read from.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use aws_config::BehaviorVersion;
use serde::Deserialize;

use crate::errors::Error;

const LIVE_HOST: &str = "https://api.datagraphs.io";
const DEV_HOST: &str = "https://api-dev.datagraphs.io";
const LOCALHOST_API_HOST: &str = "http://localhost:3001";

pub enum ConfigLocation {
    File(String),
    Env,
    Secret(String),
}

/// Deployment the client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Live,
    Dev,
    Localhost,
}

impl Environment {
    pub fn auth_host(&self) -> &'static str {
        match self {
            Environment::Live => LIVE_HOST,
            Environment::Dev | Environment::Localhost => DEV_HOST,
        }
    }

    pub fn api_host(&self) -> &'static str {
        match self {
            Environment::Live => LIVE_HOST,
            Environment::Dev => DEV_HOST,
            Environment::Localhost => LOCALHOST_API_HOST,
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Environment::Live),
            "dev" => Ok(Environment::Dev),
            "localhost" => Ok(Environment::Localhost),
            other => Err(Error::Config(format!(
                "Unknown environment '{}'; expected 'live', 'dev' or 'localhost'",
                other
            ))),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct Config {
    pub project_id: String,
    pub api_key: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub environment: Environment,
    /// Overrides the environment's API host.
    #[serde(default)]
    pub api_host: Option<String>,
    /// Overrides the environment's authentication host.
    #[serde(default)]
    pub auth_host: Option<String>,
    /// Static bearer token that bypasses the authentication endpoint.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Skip TLS certificate validation, for deployments behind a self-signed balancer.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

// Secrets are reduced to whether they are set.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }
        f.debug_struct("Config")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("environment", &self.environment)
            .field("api_host", &self.api_host)
            .field("auth_host", &self.auth_host)
            .field("access_token", &redact(&self.access_token))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl Config {
    pub fn from_values(
        project_id: impl Into<String>,
        api_key: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            client_id,
            client_secret,
            ..Self::default()
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_hosts(mut self, api_host: impl Into<String>, auth_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self.auth_host = Some(auth_host.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// # ENV Vars
    /// * `DATAGRAPHS_PROJECT_ID` - Target project (falls back to `DATAGRAPHS_ACCOUNT_KEY`)
    /// * `DATAGRAPHS_API_KEY` - Application API key
    /// * `DATAGRAPHS_CLIENT_ID` / `DATAGRAPHS_CLIENT_SECRET` - Optional delegated-auth credentials
    /// * `DATAGRAPHS_ENV` - `live` (default), `dev` or `localhost`
    /// * `DATAGRAPHS_ACCESS_TOKEN` - Optional static bearer token for local development
    /// * `DATAGRAPHS_ACCEPT_INVALID_CERTS` - `true`/`1` to skip certificate validation
    pub fn from_env() -> Result<Self, Error> {
        let project_id = std::env::var("DATAGRAPHS_PROJECT_ID")
            .or_else(|_| std::env::var("DATAGRAPHS_ACCOUNT_KEY"))
            .map_err(|_| Error::Config("Missing DATAGRAPHS_PROJECT_ID env var".to_string()))?;
        let api_key = std::env::var("DATAGRAPHS_API_KEY")
            .map_err(|_| Error::Config("Missing DATAGRAPHS_API_KEY env var".to_string()))?;
        let environment = match std::env::var("DATAGRAPHS_ENV") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Environment::default(),
        };
        let accept_invalid_certs = std::env::var("DATAGRAPHS_ACCEPT_INVALID_CERTS")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        Ok(Self {
            project_id,
            api_key,
            client_id: std::env::var("DATAGRAPHS_CLIENT_ID").ok(),
            client_secret: std::env::var("DATAGRAPHS_CLIENT_SECRET").ok(),
            environment,
            api_host: None,
            auth_host: None,
            access_token: std::env::var("DATAGRAPHS_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            accept_invalid_certs,
        })
    }

    /// Reads a JSON config document stored in AWS Secrets Manager.
    pub async fn from_secret(secret_arn: &str) -> Result<Self, Error> {
        let client = aws_sdk_secretsmanager::Client::new(
            &aws_config::load_defaults(BehaviorVersion::latest()).await,
        );
        let resp = client
            .get_secret_value()
            .secret_id(secret_arn)
            .send()
            .await
            .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
        let secret = resp.secret_string().ok_or_else(|| {
            Error::Config("Failed to get secret string, returned None".to_string())
        })?;
        Ok(serde_json::from_str(secret)?)
    }

    pub fn api_host(&self) -> &str {
        self.api_host
            .as_deref()
            .unwrap_or_else(|| self.environment.api_host())
            .trim_end_matches('/')
    }

    pub fn auth_host(&self) -> &str {
        self.auth_host
            .as_deref()
            .unwrap_or_else(|| self.environment.auth_host())
            .trim_end_matches('/')
    }

    /// True when delegated-auth bearer tokens should be attached to requests.
    pub fn uses_delegated_auth(&self) -> bool {
        self.client_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Checks the credentials every request needs.
    pub fn validate(&self) -> Result<(), Error> {
        if self.project_id.is_empty() {
            return Err(Error::Config("Project Id is required".into()));
        }
        if self.api_key.is_empty() {
            return Err(Error::Config("API Key is required".into()));
        }
        Ok(())
    }

    /// Checks the delegated-auth pair needed for token refresh and mutating calls.
    pub fn require_client_credentials(&self) -> Result<(&str, &str), Error> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(Error::Config(
                "clientId and clientSecret are required to invoke this operation".into(),
            )),
        }
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    match loc {
        ConfigLocation::File(path) => Config::from_file(path),
        ConfigLocation::Env => Config::from_env(),
        ConfigLocation::Secret(arn) => Config::from_secret(&arn).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_values(
            "proj",
            "api-key-value",
            Some("client".into()),
            Some("secret-value".into()),
        )
        .with_access_token("token-value");
        let printed = format!("{config:?}");
        assert!(printed.contains("proj"));
        assert!(printed.contains("client"));
        for secret in ["api-key-value", "secret-value", "token-value"] {
            assert!(!printed.contains(secret), "{secret} leaked: {printed}");
        }
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn validate_requires_project_and_api_key() {
        let err = Config::from_values("", "key", None, None)
            .validate()
            .expect_err("project id required");
        assert!(matches!(err, Error::Config(msg) if msg.contains("Project Id")));

        let err = Config::from_values("proj", "", None, None)
            .validate()
            .expect_err("api key required");
        assert!(matches!(err, Error::Config(msg) if msg.contains("API Key")));

        assert!(Config::from_values("proj", "key", None, None).validate().is_ok());
    }

    #[test]
    fn client_credentials_checked_lazily() {
        let cfg = Config::from_values("proj", "key", Some("client".into()), None);
        assert!(cfg.validate().is_ok());
        assert!(matches!(
            cfg.require_client_credentials(),
            Err(Error::Config(_))
        ));

        let cfg = Config::from_values("proj", "key", Some("client".into()), Some("secret".into()));
        assert_eq!(cfg.require_client_credentials().unwrap(), ("client", "secret"));
    }

    #[test]
    fn hosts_follow_environment_unless_overridden() {
        let cfg = Config::from_values("proj", "key", None, None);
        assert_eq!(cfg.api_host(), "https://api.datagraphs.io");

        let cfg = cfg.with_environment(Environment::Localhost);
        assert_eq!(cfg.api_host(), "http://localhost:3001");
        assert_eq!(cfg.auth_host(), "https://api-dev.datagraphs.io");

        let cfg = cfg.with_hosts("http://127.0.0.1:8080/", "http://127.0.0.1:9090");
        assert_eq!(cfg.api_host(), "http://127.0.0.1:8080");
        assert_eq!(cfg.auth_host(), "http://127.0.0.1:9090");
    }

    #[test]
    fn deserializes_minimal_document() {
        let cfg: Config = serde_json::from_str(
            r#"{"project_id":"proj","api_key":"key","environment":"dev"}"#,
        )
        .unwrap();
        assert_eq!(cfg.environment, Environment::Dev);
        assert!(!cfg.accept_invalid_certs);
        assert!(!cfg.uses_delegated_auth());
    }

    #[test]
    fn unknown_environment_rejected() {
        assert!(matches!("staging".parse::<Environment>(), Err(Error::Config(_))));
        assert_eq!("LIVE".parse::<Environment>().unwrap(), Environment::Live);
    }
}
