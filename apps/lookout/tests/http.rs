use std::{sync::Arc, time::Duration};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use color_eyre::eyre;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use lookout::{
	routes::{self, ServersResponse},
	state::AppState,
	worker,
};
use lookout_config::{ListingsProviderConfig, NotifierConfig};
use lookout_domain::listing::RawSnapshot;
use lookout_service::{BoxFuture, ListingProvider, LookoutService, Notifier, Providers};
use lookout_storage::db::Db;

struct SampleListings;
impl ListingProvider for SampleListings {
	fn fetch<'a>(
		&'a self,
		_: &'a ListingsProviderConfig,
	) -> BoxFuture<'a, color_eyre::Result<RawSnapshot>> {
		Box::pin(async { Ok(lookout_testkit::sample_snapshot()) })
	}
}

struct SilentNotifier;
impl Notifier for SilentNotifier {
	fn send<'a>(
		&'a self,
		_: &'a NotifierConfig,
		_: &'a str,
		_: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async { Err(eyre::eyre!("Notifications are disabled in tests.")) })
	}
}

async fn test_state() -> AppState {
	let pool = lookout_testkit::memory_pool().await.expect("Failed to open in-memory database.");
	let db = Db::from_pool(pool);

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let providers = Providers::new(Arc::new(SampleListings), Arc::new(SilentNotifier));
	let service =
		LookoutService::with_providers(lookout_testkit::sample_config(), db, providers);

	service.initialize().await.expect("Failed to initialize service.");

	AppState::from_service(service)
}

async fn post_command(app: Router, content: &str) -> (StatusCode, Vec<u8>) {
	let payload = json!({ "author_id": "alice", "channel_id": "chan-1", "content": content });
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/commands")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/commands.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");

	(status, bytes.to_vec())
}

#[tokio::test]
async fn health_ok() {
	let app = routes::router(test_state().await);
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_servers() {
	let app = routes::router(test_state().await);
	let response = app
		.oneshot(
			Request::builder().uri("/v1/servers").body(Body::empty()).expect("Failed to build."),
		)
		.await
		.expect("Failed to call /v1/servers.");

	assert_eq!(response.status(), StatusCode::OK);

	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let parsed: ServersResponse = serde_json::from_slice(&bytes).expect("Invalid JSON body.");

	assert_eq!(parsed.servers, vec!["Cannith".to_string(), "Khyber".to_string()]);
}

#[tokio::test]
async fn command_replies_to_the_channel() {
	let state = test_state().await;
	let (status, body) =
		post_command(routes::router(state.clone()), "lo!lookout Server:Khyber Duration:30m").await;

	assert_eq!(status, StatusCode::OK);

	let reply: serde_json::Value = serde_json::from_slice(&body).expect("Invalid JSON body.");

	assert_eq!(reply["channel_id"], "chan-1");
	assert_eq!(reply["text"], "Lookout query 0 saved for 30m 0s.");
	assert_eq!(state.service.list_queries("alice").await.expect("Failed to list.").len(), 1);
}

#[tokio::test]
async fn non_command_is_no_content() {
	let (status, body) = post_command(routes::router(test_state().await), "good evening").await;

	assert_eq!(status, StatusCode::NO_CONTENT);
	assert!(body.is_empty());
}

#[tokio::test]
async fn malformed_command_body_is_rejected() {
	let app = routes::router(test_state().await);
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/commands")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(json!({ "content": "lo!servers" }).to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/commands.");

	assert!(response.status().is_client_error());
}

#[tokio::test]
async fn worker_stops_on_shutdown() {
	let state = test_state().await;
	let shutdown = CancellationToken::new();
	let handle = tokio::spawn(worker::run_worker(state.service.clone(), shutdown.clone()));

	shutdown.cancel();

	tokio::time::timeout(Duration::from_secs(5), handle)
		.await
		.expect("Worker did not stop.")
		.expect("Worker panicked.");
}
