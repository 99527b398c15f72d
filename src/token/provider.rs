use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::Error;
use crate::response::check_response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Obtains fresh bearer tokens from the authentication endpoint.
#[derive(Clone)]
pub struct CredentialProvider {
    http: Client,
    auth_host: String,
    api_key: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    override_token: Option<String>,
}

impl CredentialProvider {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            auth_host: config.auth_host().to_string(),
            api_key: config.api_key.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            override_token: config.access_token.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Static token configured to bypass the authentication endpoint.
    pub fn override_token(&self) -> Option<&str> {
        self.override_token.as_deref()
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_host)
    }

    /// Returns the configured override token, or exchanges the client
    /// credentials for a new access token.
    pub async fn fetch_new_token(&self) -> Result<String, Error> {
        if let Some(token) = &self.override_token {
            debug!("using configured access token override");
            return Ok(token.clone());
        }

        let (client_id, client_secret) =
            match (self.client_id.as_deref(), self.client_secret.as_deref()) {
                (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
                _ => {
                    return Err(Error::Config(
                        "clientId and clientSecret are required to obtain an access token".into(),
                    ));
                }
            };

        let url = self.token_url();
        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&TokenRequest {
                client_id,
                client_secret,
            })
            .send()
            .await?;
        let bytes = check_response(resp).await?.bytes().await?;
        let body: TokenResponse = serde_json::from_slice(&bytes)?;

        if let Some(error) = body.error {
            return Err(Error::Auth(body.error_description.unwrap_or(error)));
        }
        let token = body
            .access_token
            .ok_or_else(|| Error::Auth("token response carried no access_token".into()))?;
        info!("access token acquired (len={})", token.len());
        Ok(token)
    }
}
