#![allow(dead_code)]

use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use lookout_config::{Config, ListingsProviderConfig, NotifierConfig};
use lookout_domain::listing::RawSnapshot;
use lookout_service::{
	BoxFuture, ListingProvider, LookoutService, Notifier, Providers, TickReport,
	search::{SearchEngine, SearchError, SearchIndex, SearchMatch, TantivyEngine},
};
use lookout_storage::db::Db;

/// Serves whatever snapshot the test last set; `None` makes every fetch fail.
pub struct StaticListings {
	snapshot: Mutex<Option<RawSnapshot>>,
}
impl StaticListings {
	pub fn new(snapshot: RawSnapshot) -> Self {
		Self { snapshot: Mutex::new(Some(snapshot)) }
	}

	pub fn set(&self, snapshot: Option<RawSnapshot>) {
		*self.snapshot.lock().unwrap_or_else(|err| err.into_inner()) = snapshot;
	}
}
impl ListingProvider for StaticListings {
	fn fetch<'a>(
		&'a self,
		_: &'a ListingsProviderConfig,
	) -> BoxFuture<'a, color_eyre::Result<RawSnapshot>> {
		let current = self.snapshot.lock().unwrap_or_else(|err| err.into_inner()).clone();

		Box::pin(async move { current.ok_or_else(|| eyre::eyre!("Listing provider is offline.")) })
	}
}

pub struct RecordingNotifier {
	tx: mpsc::UnboundedSender<(String, String)>,
}
impl Notifier for RecordingNotifier {
	fn send<'a>(
		&'a self,
		_: &'a NotifierConfig,
		channel_id: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		let sent = self.tx.send((channel_id.to_string(), text.to_string()));

		Box::pin(async move { sent.map_err(|_| eyre::eyre!("Recorder is closed.")) })
	}
}

/// Tantivy search that takes `delay` for every query.
pub struct SlowEngine {
	pub inner: TantivyEngine,
	pub delay: Duration,
}
impl SearchEngine for SlowEngine {
	fn build(
		&self,
		snapshot: &lookout_domain::snapshot::IndexedSnapshot,
	) -> Result<Box<dyn SearchIndex>, SearchError> {
		Ok(Box::new(SlowIndex { inner: self.inner.build(snapshot)?, delay: self.delay }))
	}

	fn validate(&self, query: &str) -> Result<(), SearchError> {
		self.inner.validate(query)
	}
}

/// Tantivy search whose next `failures` index builds fail.
pub struct FlakyEngine {
	pub inner: TantivyEngine,
	pub failures: AtomicUsize,
}
impl FlakyEngine {
	pub fn new() -> Self {
		Self { inner: TantivyEngine::new(), failures: AtomicUsize::new(0) }
	}

	pub fn fail_next_builds(&self, count: usize) {
		self.failures.store(count, Ordering::SeqCst);
	}
}
impl SearchEngine for FlakyEngine {
	fn build(
		&self,
		snapshot: &lookout_domain::snapshot::IndexedSnapshot,
	) -> Result<Box<dyn SearchIndex>, SearchError> {
		let failing = self
			.failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
			.is_ok();

		if failing {
			return Err(SearchError::MissingField { field: "Server" });
		}

		self.inner.build(snapshot)
	}

	fn validate(&self, query: &str) -> Result<(), SearchError> {
		self.inner.validate(query)
	}
}

struct SlowIndex {
	inner: Box<dyn SearchIndex>,
	delay: Duration,
}
impl SearchIndex for SlowIndex {
	fn search(
		&self,
		query: &str,
		restrict_to_fresh: bool,
	) -> Result<Vec<SearchMatch>, SearchError> {
		std::thread::sleep(self.delay);

		self.inner.search(query, restrict_to_fresh)
	}
}

pub struct Harness {
	pub service: LookoutService,
	pub listings: Arc<StaticListings>,
	pub sent: mpsc::UnboundedReceiver<(String, String)>,
}
impl Harness {
	pub async fn tick(&self) -> TickReport {
		self.service.tick(&CancellationToken::new()).await.expect("Tick failed.")
	}

	pub async fn next_notification(&mut self) -> (String, String) {
		tokio::time::timeout(Duration::from_secs(5), self.sent.recv())
			.await
			.expect("Timed out waiting for a notification.")
			.expect("Notifier channel closed.")
	}
}

pub fn test_config() -> Config {
	let mut cfg = lookout_testkit::sample_config();

	// Generous ceiling so unoptimized test builds are never pruned for latency.
	cfg.lookout.search_timeout_ms = 5_000;

	cfg
}

pub async fn test_db() -> Db {
	let pool = lookout_testkit::memory_pool().await.expect("Failed to open in-memory database.");
	let db = Db::from_pool(pool);

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

pub async fn harness_with(cfg: Config) -> Harness {
	let listings = Arc::new(StaticListings::new(lookout_testkit::sample_snapshot()));
	let (tx, sent) = mpsc::unbounded_channel();
	let providers = Providers::new(listings.clone(), Arc::new(RecordingNotifier { tx }));
	let service = LookoutService::with_providers(cfg, test_db().await, providers);

	service.initialize().await.expect("Failed to initialize service.");

	Harness { service, listings, sent }
}

pub async fn harness() -> Harness {
	harness_with(test_config()).await
}
