//! Client-credentials token exchange.
//!
//! The token is fetched once per pipeline run and passed by value into the
//! browse client. It is never refreshed; a request rejected for an expired
//! token ends the run.

use std::fmt;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Credentials;
use crate::error::{Result, TrendsError};

/// Bearer token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(<{} chars>)", self.0.len())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Exchanges client credentials for a [`BearerToken`].
pub struct TokenProvider<'a> {
    http: &'a Client,
    credentials: &'a Credentials,
}

impl<'a> TokenProvider<'a> {
    pub fn new(http: &'a Client, credentials: &'a Credentials) -> Self {
        Self { http, credentials }
    }

    /// POST `grant_type=client_credentials` and `scope` with basic auth.
    ///
    /// Any non-success status is a [`TrendsError::Auth`] carrying the status
    /// code and response body.
    pub fn fetch_token(&self) -> Result<BearerToken> {
        let creds = self.credentials;
        tracing::debug!(url = %creds.token_url, "requesting access token");

        let resp = self
            .http
            .post(&creds.token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", creds.scope.as_str()),
            ])
            .send()?;

        let status = resp.status().as_u16();
        let body = resp.text()?;
        let token = parse_token_response(status, &body)?;
        tracing::info!("access token acquired");
        Ok(token)
    }
}

/// Interpret a token endpoint response.
pub fn parse_token_response(status: u16, body: &str) -> Result<BearerToken> {
    if !(200..300).contains(&status) {
        return Err(TrendsError::Auth {
            status,
            body: body.to_string(),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(body)?;
    if parsed.access_token.is_empty() {
        return Err(TrendsError::Auth {
            status,
            body: format!("response has no access_token: {}", body),
        });
    }
    Ok(BearerToken(parsed.access_token))
}
