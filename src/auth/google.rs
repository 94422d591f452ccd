//! Google OAuth 2.0 authorization-code client

use serde::Deserialize;
use url::Url;

use crate::config::OAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Requested scopes
pub const SCOPES: &str = "openid profile email";

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("invalid OAuth endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} answered {status}")]
    Rejected {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Token endpoint response; only the access token is used
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OpenID Connect userinfo
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GoogleProfile {
    /// Stable account id
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl GoogleProfile {
    /// Full name, falling back to given + family name, then email
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        self.email.clone().unwrap_or_else(|| self.sub.clone())
    }
}

/// Client for the three Google endpoints of the sign-in flow
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
    http: reqwest::Client,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuth {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }

    /// Point the client at other endpoints (local test servers)
    pub fn with_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Consent screen URL carrying the CSRF `state`
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&self.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        Ok(url)
    }

    /// Trade an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthError::Rejected {
                endpoint: "token endpoint",
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }

    /// Profile of the signed-in account
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, OAuthError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthError::Rejected {
                endpoint: "userinfo endpoint",
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }
}
