use geokit_core::{GeocodingError, ProviderError, ProviderId, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{provider} is not configured, set its credentials (see `geokit --help`)")]
    NotConfigured { provider: ProviderId },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<GeocodingError> for CliError {
    fn from(error: GeocodingError) -> Self {
        match error {
            GeocodingError::InvalidArgument(error) => Self::Validation(error),
            GeocodingError::Cancelled => Self::Cancelled,
            GeocodingError::Provider(error) => Self::Provider(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::NotConfigured { .. } => 2,
            Self::Provider(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
            Self::Cancelled => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use geokit_core::FailureKind;

    use super::*;

    #[test]
    fn geocoding_errors_keep_their_category() {
        let cancelled = CliError::from(GeocodingError::Cancelled);
        assert_eq!(cancelled.exit_code(), 130);

        let invalid = CliError::from(GeocodingError::from(ValidationError::EmptyQuery));
        assert_eq!(invalid.exit_code(), 2);

        let provider = CliError::from(GeocodingError::from(ProviderError::new(
            ProviderId::Here,
            FailureKind::Status,
            "upstream returned status 503",
        )));
        assert_eq!(provider.exit_code(), 3);
        assert_eq!(provider.to_string(), "upstream returned status 503 (here.status)");
    }
}
