//! Shared HTTP call primitive used by every provider service.
//!
//! [`ClientExecutor`] performs one request, reads the body as text and decodes
//! it into the caller's type. Every failure on the way out is translated into
//! [`GeocodingError`]: transport, status and parse failures become a
//! [`ProviderError`] tagged with the executor's provider, cancellation stays a
//! distinct [`GeocodingError::Cancelled`], and an empty URI is rejected before
//! any I/O.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{GeocodingError, ProviderError, ValidationError};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::ProviderId;

/// Outcome of a single HTTP exchange before it is translated for the caller.
#[derive(Debug)]
pub struct CallResult<T> {
    pub is_successful: bool,
    pub result: Option<T>,
    pub status: u16,
    pub body: String,
    decode_error: Option<serde_json::Error>,
}

impl<T: DeserializeOwned> CallResult<T> {
    /// Decodes `response` into `T` when the status is a success.
    pub fn from_response(response: HttpResponse) -> Self {
        let is_success = response.is_success();
        let HttpResponse { status, body } = response;
        if !is_success {
            return Self {
                is_successful: false,
                result: None,
                status,
                body,
                decode_error: None,
            };
        }

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Self {
                is_successful: true,
                result: Some(value),
                status,
                body,
                decode_error: None,
            },
            Err(error) => Self {
                is_successful: false,
                result: None,
                status,
                body,
                decode_error: Some(error),
            },
        }
    }
}

impl<T> CallResult<T> {
    pub fn into_result(self, provider: ProviderId) -> Result<T, GeocodingError> {
        if let Some(error) = self.decode_error {
            return Err(ProviderError::parse(provider, self.status, self.body, error).into());
        }
        match self.result {
            Some(value) if self.is_successful => Ok(value),
            _ => Err(ProviderError::status(provider, self.status, self.body).into()),
        }
    }
}

/// GET + JSON decode with unified failure translation for one provider.
#[derive(Clone)]
pub struct ClientExecutor {
    provider: ProviderId,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl ClientExecutor {
    pub fn new(provider: ProviderId, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            provider,
            http_client,
            timeout_ms: HttpRequest::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Issues a GET against a fully formed `uri` and decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// - [`GeocodingError::InvalidArgument`] when `uri` is blank (no request is made)
    /// - [`GeocodingError::Cancelled`] when `cancel` fires first
    /// - [`GeocodingError::Provider`] for transport, status and decode failures
    pub async fn call<T>(&self, uri: &str, cancel: &CancellationToken) -> Result<T, GeocodingError>
    where
        T: DeserializeOwned,
    {
        self.send(HttpRequest::get(uri), cancel).await
    }

    /// Like [`call`](Self::call) for a prepared request (headers, form bodies).
    pub async fn send<T>(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<T, GeocodingError>
    where
        T: DeserializeOwned,
    {
        if request.url.trim().is_empty() {
            return Err(ValidationError::EmptyUri.into());
        }
        if cancel.is_cancelled() {
            return Err(GeocodingError::Cancelled);
        }

        let request = request.with_timeout_ms(self.timeout_ms);
        debug!(
            provider = %self.provider,
            method = ?request.method,
            url = request.redacted_url(),
            "sending request"
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeocodingError::Cancelled),
            response = self.http_client.execute(request) => response,
        };

        let response = response.map_err(|error: HttpError| {
            debug!(provider = %self.provider, kind = ?error.kind(), "transport failure");
            ProviderError::transport(self.provider, error)
        })?;

        debug!(
            provider = %self.provider,
            status = response.status,
            bytes = response.body.len(),
            "response received"
        );

        CallResult::<T>::from_response(response).into_result(self.provider)
    }
}
