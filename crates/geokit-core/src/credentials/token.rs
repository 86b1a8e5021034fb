use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{GeocodingError, ProviderError};
use crate::ProviderId;

/// Tokens are treated as expired this long before the provider says they are.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::seconds(60);

/// Longest `expires_in` (one leap year, in seconds) a token is trusted for.
pub const MAX_EXPIRES_IN: i64 = 366 * 24 * 60 * 60;

/// Bearer token issued by an OAuth client-credentials exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    expires_in: i64,
    issued_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl Token {
    /// Token received now.
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self::issued_at(access_token, expires_in, OffsetDateTime::now_utc())
    }

    /// Token received at `issued_at`. The usable lifetime is `expires_in`
    /// seconds minus [`EXPIRY_SAFETY_MARGIN`], never ending before `issued_at`.
    ///
    /// `expires_in` is clamped to `0..=MAX_EXPIRES_IN`. If the expiry cannot be
    /// represented the token expires at `issued_at`.
    pub fn issued_at(
        access_token: impl Into<String>,
        expires_in: i64,
        issued_at: OffsetDateTime,
    ) -> Self {
        let trusted = Duration::seconds(expires_in.clamp(0, MAX_EXPIRES_IN));
        let lifetime = (trusted - EXPIRY_SAFETY_MARGIN).max(Duration::ZERO);
        Self {
            access_token: access_token.into(),
            expires_in,
            issued_at,
            expires_at: issued_at.checked_add(lifetime).unwrap_or(issued_at),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub const fn expires_in(&self) -> i64 {
        self.expires_in
    }

    pub const fn issued_at_time(&self) -> OffsetDateTime {
        self.issued_at
    }

    pub const fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// OAuth client credentials used to request new tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Exchanges credentials for a fresh [`Token`] at a provider's auth endpoint.
pub trait TokenRetrieval: Send + Sync {
    fn retrieve<'a>(
        &'a self,
        credentials: &'a Credentials,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Token, GeocodingError>> + Send + 'a>>;
}

/// Holds one provider's bearer token and refreshes it on demand.
///
/// The slot is an async mutex held for the whole refresh, so concurrent
/// callers that find the token expired queue behind the first one and pick up
/// the token it stored instead of issuing their own request.
pub struct TokenContainer {
    provider: ProviderId,
    credentials: Credentials,
    retrieval: Arc<dyn TokenRetrieval>,
    slot: Mutex<Option<Token>>,
}

impl TokenContainer {
    pub fn new(
        provider: ProviderId,
        credentials: Credentials,
        retrieval: Arc<dyn TokenRetrieval>,
    ) -> Self {
        Self {
            provider,
            credentials,
            retrieval,
            slot: Mutex::new(None),
        }
    }

    /// Seeds the container with an already issued token.
    pub fn with_token(mut self, token: Token) -> Self {
        self.slot = Mutex::new(Some(token));
        self
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Returns a token that is valid now, refreshing it first if needed.
    ///
    /// # Errors
    ///
    /// Retrieval failures are returned as-is and leave the container without a
    /// token, so the next call retries. A retrieved token that is already
    /// expired is a [`Credential`](crate::FailureKind::Credential) failure and
    /// is not stored.
    ///
    /// Cancellation while waiting for another caller's refresh or during our
    /// own refresh yields [`GeocodingError::Cancelled`] and leaves the slot
    /// unchanged, including an expired token that was about to be replaced.
    pub async fn token(&self, cancel: &CancellationToken) -> Result<Token, GeocodingError> {
        let mut slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeocodingError::Cancelled),
            slot = self.slot.lock() => slot,
        };

        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(OffsetDateTime::now_utc()) {
                return Ok(token.clone());
            }
            debug!(provider = %self.provider, expired_at = %token.expires_at(), "token expired");
        }

        info!(provider = %self.provider, "requesting new access token");
        let refreshed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeocodingError::Cancelled),
            refreshed = self.retrieval.retrieve(&self.credentials, cancel) => refreshed,
        };

        match refreshed {
            Ok(token) if !token.is_valid_at(OffsetDateTime::now_utc()) => {
                warn!(
                    provider = %self.provider,
                    expires_in = token.expires_in(),
                    "retrieved token is already expired"
                );
                *slot = None;
                Err(ProviderError::credential(
                    self.provider,
                    format!(
                        "{} issued a token that expires within the safety margin (expires_in {})",
                        self.provider,
                        token.expires_in()
                    ),
                )
                .into())
            }
            Ok(token) => {
                info!(
                    provider = %self.provider,
                    expires_at = %token.expires_at(),
                    "access token refreshed"
                );
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(error) => {
                warn!(provider = %self.provider, %error, "token refresh failed");
                *slot = None;
                Err(error)
            }
        }
    }

    /// Drops the cached token so the next [`token`](Self::token) call refreshes.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    /// Cached token, if any, without refreshing.
    pub async fn cached(&self) -> Option<Token> {
        self.slot.lock().await.clone()
    }
}

impl Debug for TokenContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenContainer")
            .field("provider", &self.provider)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{FailureKind, ProviderError};

    struct CountingRetrieval {
        calls: AtomicUsize,
        fail_first: bool,
        delay: std::time::Duration,
        expires_in: i64,
    }

    impl CountingRetrieval {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: false,
                delay: std::time::Duration::from_millis(20),
                expires_in: 7_200,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenRetrieval for CountingRetrieval {
        fn retrieve<'a>(
            &'a self,
            credentials: &'a Credentials,
            _cancel: &'a CancellationToken,
        ) -> Pin<Box<dyn Future<Output = Result<Token, GeocodingError>> + Send + 'a>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(self.delay).await;
                if self.fail_first && call == 1 {
                    return Err(ProviderError::credential(ProviderId::Arcgis, "invalid_client").into());
                }
                Ok(Token::new(
                    format!("{}-token-{call}", credentials.client_id()),
                    self.expires_in,
                ))
            })
        }
    }

    fn container(retrieval: Arc<CountingRetrieval>) -> TokenContainer {
        TokenContainer::new(
            ProviderId::Arcgis,
            Credentials::new("client", "secret"),
            retrieval,
        )
    }

    #[test]
    fn expiry_subtracts_safety_margin() {
        let issued = OffsetDateTime::UNIX_EPOCH;
        let token = Token::issued_at("abc", 3_600, issued);
        assert_eq!(token.expires_at(), issued + Duration::seconds(3_540));
        assert!(token.is_valid_at(issued + Duration::seconds(3_539)));
        assert!(!token.is_valid_at(issued + Duration::seconds(3_540)));
    }

    #[test]
    fn short_lived_token_never_expires_before_issue() {
        let issued = OffsetDateTime::UNIX_EPOCH;
        let token = Token::issued_at("abc", 10, issued);
        assert_eq!(token.expires_at(), issued);
        assert!(!token.is_valid_at(issued));
    }

    #[test]
    fn out_of_range_expires_in_is_clamped_instead_of_overflowing() {
        let issued = OffsetDateTime::UNIX_EPOCH;

        let huge = Token::issued_at("abc", i64::MAX, issued);
        assert_eq!(
            huge.expires_at(),
            issued + Duration::seconds(MAX_EXPIRES_IN) - EXPIRY_SAFETY_MARGIN
        );
        assert_eq!(huge.expires_in(), i64::MAX);

        let negative = Token::issued_at("abc", i64::MIN, issued);
        assert_eq!(negative.expires_at(), issued);
    }

    #[test]
    fn unrepresentable_expiry_counts_as_expired() {
        let issued = time::PrimitiveDateTime::MAX.assume_utc();
        let token = Token::issued_at("abc", 3_600, issued);

        assert_eq!(token.expires_at(), issued);
        assert!(!token.is_valid_at(issued));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!(
            "{:?} {:?}",
            Token::new("live-token", 60),
            Credentials::new("id", "hunter2")
        );
        assert!(!rendered.contains("live-token"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn valid_token_is_served_without_retrieval() {
        let retrieval = Arc::new(CountingRetrieval::new());
        let tokens = container(retrieval.clone()).with_token(Token::new("cached", 7_200));

        let token = tokens
            .token(&CancellationToken::new())
            .await
            .expect("token");
        assert_eq!(token.access_token(), "cached");
        assert_eq!(retrieval.calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let retrieval = Arc::new(CountingRetrieval::new());
        let expired = Token::issued_at(
            "stale",
            3_600,
            OffsetDateTime::now_utc() - Duration::hours(2),
        );
        let tokens = Arc::new(container(retrieval.clone()).with_token(expired));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tokens = tokens.clone();
            handles.push(tokio::spawn(async move {
                tokens.token(&CancellationToken::new()).await
            }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            let token = handle.await.expect("task joins").expect("token");
            seen.push(token.access_token().to_owned());
        }

        assert_eq!(retrieval.calls(), 1);
        assert!(seen.iter().all(|value| value == "client-token-1"));
    }

    #[tokio::test]
    async fn failed_refresh_leaves_no_token_and_next_call_retries() {
        let retrieval = Arc::new(CountingRetrieval {
            fail_first: true,
            ..CountingRetrieval::new()
        });
        let tokens = container(retrieval.clone());

        let error = tokens
            .token(&CancellationToken::new())
            .await
            .expect_err("first refresh fails");
        assert_eq!(error.failure_kind(), Some(FailureKind::Credential));
        assert!(tokens.cached().await.is_none());

        let token = tokens
            .token(&CancellationToken::new())
            .await
            .expect("second refresh succeeds");
        assert_eq!(token.access_token(), "client-token-2");
        assert_eq!(retrieval.calls(), 2);
    }

    #[tokio::test]
    async fn cancelled_refresh_does_not_store_a_token() {
        let retrieval = Arc::new(CountingRetrieval {
            delay: std::time::Duration::from_secs(30),
            ..CountingRetrieval::new()
        });
        let tokens = container(retrieval);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let error = tokens.token(&cancel).await.expect_err("cancelled");
        assert!(error.is_cancelled());
        assert!(tokens.cached().await.is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_refresh() {
        let retrieval = Arc::new(CountingRetrieval::new());
        let tokens = container(retrieval.clone()).with_token(Token::new("cached", 7_200));

        tokens.invalidate().await;
        let token = tokens
            .token(&CancellationToken::new())
            .await
            .expect("token");

        assert_eq!(token.access_token(), "client-token-1");
        assert_eq!(retrieval.calls(), 1);
    }

    #[tokio::test]
    async fn already_expired_token_from_retrieval_is_rejected() {
        let retrieval = Arc::new(CountingRetrieval {
            expires_in: 0,
            ..CountingRetrieval::new()
        });
        let tokens = container(retrieval.clone());

        let error = tokens
            .token(&CancellationToken::new())
            .await
            .expect_err("expired on arrival");

        assert_eq!(error.failure_kind(), Some(FailureKind::Credential));
        assert!(tokens.cached().await.is_none());
        assert_eq!(retrieval.calls(), 1);
    }

    #[tokio::test]
    async fn cancelled_refresh_keeps_the_previous_token_in_place() {
        let retrieval = Arc::new(CountingRetrieval {
            delay: std::time::Duration::from_secs(30),
            ..CountingRetrieval::new()
        });
        let expired = Token::issued_at(
            "stale",
            3_600,
            OffsetDateTime::now_utc() - Duration::hours(2),
        );
        let tokens = container(retrieval).with_token(expired.clone());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let error = tokens.token(&cancel).await.expect_err("cancelled");

        assert!(error.is_cancelled());
        assert_eq!(tokens.cached().await, Some(expired));
    }
}
