use log::error;
use serde::Deserialize;

use crate::config::Config;
use crate::errors::AppError;

const TOKEN_FAILURE: &str = "Failed to obtain access token";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges this service's own client credentials for an access token.
pub struct TokenIssuer {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl TokenIssuer {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http,
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
    }

    pub async fn issue_token(&self) -> Result<String, AppError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        // `form` sets the x-www-form-urlencoded content type.
        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| {
                error!("Token endpoint unreachable: {err}");
                bad_gateway()
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to obtain access token: {body}");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: TOKEN_FAILURE.to_string(),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|err| {
            error!("Unreadable token response: {err}");
            bad_gateway()
        })?;

        token.access_token.ok_or_else(|| {
            error!("Token response carried no access_token");
            bad_gateway()
        })
    }
}

fn bad_gateway() -> AppError {
    AppError::Upstream {
        status: 502,
        message: TOKEN_FAILURE.to_string(),
    }
}
