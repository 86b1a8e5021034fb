//! Behaviour tests for failure reporting and credential hygiene
//!
//! These tests pin down what a caller sees when the network, the provider or
//! the caller's own input goes wrong, and that keys never leak into diagnostics.

use std::time::Duration;

use geokit_core::providers::{GoogleService, MapQuestService, PositionstackService};
use geokit_core::{
    Coordinate, FailureKind, GeocodeRequest, GeocodingError, HttpError, HttpErrorKind,
    HttpRequest, ReverseRequest, ValidationError,
};
use geokit_tests::{executor, keys, Arc, Geocoder, HttpResponse, ProviderId, ScriptedHttpClient};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

fn google(client: &Arc<ScriptedHttpClient>) -> GoogleService {
    GoogleService::new(
        executor(ProviderId::Google, client),
        keys(ProviderId::Google, "secret-google-key"),
    )
}

fn request() -> GeocodeRequest {
    GeocodeRequest::new("1600 Amphitheatre Pkwy", 1).expect("valid request")
}

// =============================================================================
// Error Handling: Transport
// =============================================================================

#[tokio::test]
async fn when_connection_fails_caller_receives_transport_failure_with_cause() {
    // Given: A transport that cannot connect
    let client = Arc::new(ScriptedHttpClient::failing(HttpError::new(
        HttpErrorKind::Connect,
        "connection refused",
    )));

    // When: A geocode is attempted
    let error = Geocoder::geocode(&google(&client), &request(), &CancellationToken::new())
        .await
        .expect_err("transport failure");

    // Then: It is classified as transport and keeps the underlying cause
    let provider_error = error.as_provider_error().expect("provider error");
    assert_eq!(provider_error.kind(), FailureKind::Transport);
    assert_eq!(provider_error.provider(), ProviderId::Google);
    assert!(std::error::Error::source(provider_error).is_some());
    assert_eq!(provider_error.code(), "google.transport");
}

#[tokio::test]
async fn when_provider_returns_server_error_status_and_body_are_preserved() {
    // Given: Positionstack answering with a 500
    let client = Arc::new(ScriptedHttpClient::new().then_reply(HttpResponse::with_status(
        500,
        r#"{"error":{"code":"internal_error"}}"#,
    )));
    let service = PositionstackService::new(
        executor(ProviderId::Positionstack, &client),
        keys(ProviderId::Positionstack, "ps-key"),
    );

    // When: A geocode is attempted
    let error = Geocoder::geocode(&service, &request(), &CancellationToken::new())
        .await
        .expect_err("status failure");

    // Then: The status and body reach the caller for diagnosis
    let provider_error = error.as_provider_error().expect("provider error");
    assert_eq!(provider_error.kind(), FailureKind::Status);
    assert_eq!(provider_error.status_code(), Some(500));
    assert!(provider_error.body().is_some_and(|body| body.contains("internal_error")));
}

#[tokio::test]
async fn when_body_is_not_the_expected_shape_caller_receives_parse_failure() {
    // Given: A 200 whose body is HTML
    let client = Arc::new(ScriptedHttpClient::replying("<html>maintenance</html>"));

    // When: A geocode is attempted
    let error = Geocoder::geocode(&google(&client), &request(), &CancellationToken::new())
        .await
        .expect_err("parse failure");

    // Then: It is a parse failure that keeps the raw body
    let provider_error = error.as_provider_error().expect("provider error");
    assert_eq!(provider_error.kind(), FailureKind::Parse);
    assert_eq!(provider_error.status_code(), Some(200));
    assert_eq!(provider_error.body(), Some("<html>maintenance</html>"));
}

#[tokio::test]
async fn when_provider_reports_failure_inside_a_200_it_is_not_treated_as_success() {
    // Given: MapQuest signalling a rejected key in its info block
    let client = Arc::new(ScriptedHttpClient::replying(
        r#"{"info":{"statuscode":403,"messages":["This key is not authorized for this service."]},"results":[]}"#,
    ));
    let service = MapQuestService::new(
        executor(ProviderId::Mapquest, &client),
        keys(ProviderId::Mapquest, "mq-key"),
    );

    // When: A geocode is attempted
    let error = Geocoder::geocode(&service, &request(), &CancellationToken::new())
        .await
        .expect_err("embedded failure");

    // Then: The embedded code is surfaced as a credential failure
    assert_eq!(error.failure_kind(), Some(FailureKind::Credential));
}

#[tokio::test]
async fn when_google_finds_nothing_caller_receives_empty_list() {
    let client = Arc::new(ScriptedHttpClient::replying(
        r#"{"results":[],"status":"ZERO_RESULTS"}"#,
    ));

    let places = Geocoder::geocode(&google(&client), &request(), &CancellationToken::new())
        .await
        .expect("zero results is not an error");

    assert!(places.is_empty());
}

// =============================================================================
// Error Handling: Cancellation
// =============================================================================

#[tokio::test]
async fn when_token_is_already_cancelled_no_request_is_sent() {
    // Given: A cancelled token
    let client = Arc::new(ScriptedHttpClient::replying(r#"{"results":[],"status":"OK"}"#));
    let cancel = CancellationToken::new();
    cancel.cancel();

    // When: A geocode is attempted
    let error = Geocoder::geocode(&google(&client), &request(), &cancel)
        .await
        .expect_err("cancelled");

    // Then: The call reports cancellation and the transport was never used
    assert!(error.is_cancelled());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn when_cancelled_mid_flight_call_returns_promptly() {
    // Given: A transport that takes far longer than the test allows
    let client = Arc::new(
        ScriptedHttpClient::replying(r#"{"results":[],"status":"OK"}"#)
            .with_delay(Duration::from_secs(30)),
    );
    let service = google(&client);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    // When: A geocode is attempted and cancelled shortly after
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        Geocoder::geocode(&service, &request(), &cancel),
    )
    .await
    .expect("cancellation ends the call well before the delay");

    // Then: The caller sees cancellation, not a transport failure
    assert!(matches!(outcome, Err(GeocodingError::Cancelled)));
}

// =============================================================================
// Validation happens before the network
// =============================================================================

#[tokio::test]
async fn invalid_inputs_are_rejected_before_any_request() {
    assert!(matches!(
        GeocodeRequest::new("   ", 1),
        Err(ValidationError::EmptyQuery)
    ));
    assert!(matches!(
        GeocodeRequest::new("Berlin", 0),
        Err(ValidationError::ZeroLimit)
    ));
    assert!(matches!(
        request().with_countries(["U5"]),
        Err(ValidationError::InvalidCountryCode { .. })
    ));
    assert!(matches!(
        Coordinate::new(91.0, 0.0),
        Err(ValidationError::LatitudeOutOfRange { .. })
    ));
    assert!(matches!(
        Coordinate::new(0.0, f64::NAN),
        Err(ValidationError::NonFiniteValue { .. })
    ));

    let point = Coordinate::new(0.0, 0.0).expect("valid point");
    assert!(matches!(
        ReverseRequest::new(point, 0),
        Err(ValidationError::ZeroLimit)
    ));
}

#[tokio::test]
async fn blank_uri_is_rejected_without_touching_transport() {
    let client = Arc::new(ScriptedHttpClient::replying("{}"));

    let error = executor(ProviderId::Google, &client)
        .call::<Value>("  ", &CancellationToken::new())
        .await
        .expect_err("blank uri");

    assert!(matches!(
        error,
        GeocodingError::InvalidArgument(ValidationError::EmptyUri)
    ));
    assert_eq!(client.request_count(), 0);
}

// =============================================================================
// Security: credentials stay out of diagnostics
// =============================================================================

#[tokio::test]
async fn key_never_appears_in_error_messages() {
    // Given: A request that fails at transport level
    let client = Arc::new(ScriptedHttpClient::failing(HttpError::new(
        HttpErrorKind::Timeout,
        "operation timed out",
    )));

    // When: The failure is rendered for a user
    let error = Geocoder::geocode(&google(&client), &request(), &CancellationToken::new())
        .await
        .expect_err("timeout");
    let rendered = format!("{error} {error:?}");

    // Then: The key does not show up, although it was on the wire
    assert!(client.requests()[0].url.contains("secret-google-key"));
    assert!(!rendered.contains("secret-google-key"));
}

#[test]
fn redacted_url_drops_the_query_string() {
    let request = HttpRequest::get("https://maps.example.test/geocode/json?address=x&key=secret");

    assert_eq!(request.redacted_url(), "https://maps.example.test/geocode/json");
}

#[test]
fn key_container_debug_output_is_redacted() {
    let rendered = format!("{:?}", keys(ProviderId::Here, "here-secret"));

    assert!(!rendered.contains("here-secret"));
}
