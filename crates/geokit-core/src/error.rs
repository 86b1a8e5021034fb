use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::ProviderId;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Input problems detected before any network activity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query text cannot be empty")]
    EmptyQuery,
    #[error("request uri cannot be empty")]
    EmptyUri,
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange { value: String },
    #[error("longitude {value} is outside [-180, 180]")]
    LongitudeOutOfRange { value: String },
    #[error("limit must be greater than zero")]
    ZeroLimit,
    #[error("country code '{value}' must be 2 or 3 ASCII letters")]
    InvalidCountryCode { value: String },
    #[error(
        "unknown provider '{value}', expected one of arcgis, bing, google, here, mapbox, mapquest, positionstack, radar"
    )]
    UnknownProvider { value: String },
}

/// Classification of a failure that crossed a provider's network/parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// DNS, connect, TLS, timeout or malformed request.
    Transport,
    /// The provider answered with a non-success HTTP status.
    Status,
    /// The body could not be read as the expected JSON shape.
    Parse,
    /// Token or key retrieval failed, or a write-once key was set twice.
    Credential,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Parse => "parse",
            Self::Credential => "credential",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified provider failure carrying diagnostics for the caller.
#[derive(Debug)]
pub struct ProviderError {
    provider: ProviderId,
    kind: FailureKind,
    message: String,
    status: Option<u16>,
    body: Option<String>,
    source: Option<BoxError>,
}

impl ProviderError {
    pub fn new(provider: ProviderId, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    pub fn transport(provider: ProviderId, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(provider, FailureKind::Transport, cause.to_string()).with_source(cause)
    }

    pub fn status(provider: ProviderId, status: u16, body: impl Into<String>) -> Self {
        Self::new(
            provider,
            FailureKind::Status,
            format!("upstream returned status {status}"),
        )
        .with_status(status)
        .with_body(body)
    }

    pub fn parse(
        provider: ProviderId,
        status: u16,
        body: impl Into<String>,
        cause: serde_json::Error,
    ) -> Self {
        Self::new(
            provider,
            FailureKind::Parse,
            format!("failed to decode response: {cause}"),
        )
        .with_status(status)
        .with_body(body)
        .with_source(cause)
    }

    pub fn credential(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Credential, message)
    }

    /// Reclassifies the failure, keeping status, body and cause.
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_source(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(cause));
        self
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status_code(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn code(&self) -> String {
        format!("{}.{}", self.provider, self.kind)
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Top-level error for every public operation.
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GeocodingError {
    /// Provider failure kind, if this error crossed a provider boundary.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Provider(error) => Some(error.kind()),
            _ => None,
        }
    }

    pub fn as_provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(error) => Some(error),
            _ => None,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn parse_error_keeps_status_body_and_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{oops").expect_err("invalid json");
        let error = ProviderError::parse(ProviderId::Google, 200, "{oops", cause);

        assert_eq!(error.kind(), FailureKind::Parse);
        assert_eq!(error.status_code(), Some(200));
        assert_eq!(error.body(), Some("{oops"));
        assert!(error.source().is_some());
        assert_eq!(error.code(), "google.parse");
    }

    #[test]
    fn failure_kind_is_absent_for_cancellation_and_validation() {
        assert_eq!(GeocodingError::Cancelled.failure_kind(), None);
        assert_eq!(
            GeocodingError::from(ValidationError::EmptyQuery).failure_kind(),
            None
        );

        let provider = GeocodingError::from(ProviderError::credential(ProviderId::Arcgis, "denied"));
        assert_eq!(provider.failure_kind(), Some(FailureKind::Credential));
    }
}
