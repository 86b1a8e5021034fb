use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::credentials::{Credentials, Token, TokenRetrieval, MAX_EXPIRES_IN};
use crate::error::{FailureKind, GeocodingError, ProviderError};
use crate::executor::ClientExecutor;
use crate::http_client::HttpRequest;

pub const TOKEN_URL: &str = "https://www.arcgis.com/sharing/rest/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<OAuthError>,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OAuthError {
    fn describe(&self) -> String {
        let detail = self
            .error_description
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .unwrap_or("token request rejected");
        match self.code {
            Some(code) => format!("{detail} (code {code})"),
            None => detail.to_owned(),
        }
    }
}

/// Client-credentials token exchange against the ArcGIS OAuth endpoint.
#[derive(Clone)]
pub struct ArcGisTokenRetrieval {
    executor: ClientExecutor,
    token_url: String,
}

impl ArcGisTokenRetrieval {
    pub fn new(executor: ClientExecutor) -> Self {
        Self {
            executor,
            token_url: TOKEN_URL.to_owned(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    async fn exchange(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Token, GeocodingError> {
        let provider = self.executor.provider();
        let request = HttpRequest::post_form(
            self.token_url.as_str(),
            [
                ("client_id", credentials.client_id()),
                ("client_secret", credentials.client_secret()),
                ("grant_type", "client_credentials"),
                ("f", "json"),
            ],
        );

        let response: TokenResponse = match self.executor.send(request, cancel).await {
            Ok(response) => response,
            // The auth endpoint refusing us is a credential problem, not a lookup failure.
            Err(GeocodingError::Provider(error)) if error.kind() == FailureKind::Status => {
                return Err(error.with_kind(FailureKind::Credential).into());
            }
            Err(error) => return Err(error),
        };

        if let Some(error) = response.error {
            let mut failure = ProviderError::credential(provider, error.describe());
            if let Some(code) = error.code.and_then(|code| u16::try_from(code).ok()) {
                failure = failure.with_status(code);
            }
            return Err(failure.into());
        }

        let access_token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ProviderError::credential(provider, "token response has no access_token"))?;
        let expires_in = match response.expires_in {
            Some(seconds) if seconds > 0 && seconds <= MAX_EXPIRES_IN => seconds,
            Some(seconds) => {
                return Err(ProviderError::credential(
                    provider,
                    format!("token response expires_in {seconds} is outside 1..={MAX_EXPIRES_IN}"),
                )
                .into());
            }
            None => {
                return Err(ProviderError::credential(provider, "token response has no expires_in").into());
            }
        };
        Ok(Token::new(access_token, expires_in))
    }
}

impl TokenRetrieval for ArcGisTokenRetrieval {
    fn retrieve<'a>(
        &'a self,
        credentials: &'a Credentials,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Token, GeocodingError>> + Send + 'a>> {
        Box::pin(self.exchange(credentials, cancel))
    }
}
