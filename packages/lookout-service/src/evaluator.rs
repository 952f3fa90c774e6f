//! The periodic pass that refreshes listings and runs every stored query against them.

use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use lookout_domain::{
	format, freshness, ids,
	snapshot::{IndexedListing, IndexedSnapshot},
};
use lookout_storage::{models::QueryEntry, queries};

use crate::{
	Error, LookoutService, Result,
	search::{SearchIndex, SearchMatch},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
	/// Cycle the counter advanced to.
	pub cycle: u32,
	pub snapshot_refreshed: bool,
	/// Listings new or changed since the previous snapshot.
	pub fresh: usize,
	pub evaluated: usize,
	/// Queries saved during this pass, first evaluated on the next one.
	pub skipped: usize,
	pub notified: usize,
	pub pruned: usize,
	pub orphaned: usize,
	pub malformed: usize,
	pub interrupted: bool,
}

impl LookoutService {
	/// Loads the first snapshot; every listing in it starts fresh.
	pub async fn initialize(&self) -> Result<()> {
		let raw = self.providers.listings.fetch(&self.cfg.providers.listings).await?;
		let snapshot = freshness::rebuild(&raw, &IndexedSnapshot::default());

		tracing::info!(
			servers = snapshot.server_names().count(),
			listings = snapshot.len(),
			"Loaded initial listings."
		);

		self.snapshot.replace(Arc::new(snapshot));

		Ok(())
	}

	/// Runs one evaluator pass.
	///
	/// A query saved at cycle `c` is skipped while the counter moves to `c`, searched against
	/// every listing when the previous cycle is `c`, and against fresh listings only afterwards.
	pub async fn tick(&self, shutdown: &CancellationToken) -> Result<TickReport> {
		let previous = self.snapshot.load();
		let (snapshot, snapshot_refreshed) =
			match self.providers.listings.fetch(&self.cfg.providers.listings).await {
				Ok(raw) => (Arc::new(freshness::rebuild(&raw, &previous)), true),
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Listing fetch failed. Reusing previous listings."
					);

					(Arc::new(previous.settled()), false)
				},
			};

		drop(previous);

		// The snapshot becomes current only once the pass can run, so a failed pass is diffed
		// against again by the next one.
		let index = self.build_index(snapshot.clone()).await?;
		let (current_cycle, new_cycle, scan) = {
			let mut cycle = self.cycle.write().await;
			let current_cycle = *cycle;
			let new_cycle = ids::next_cycle(current_cycle);
			let scan = queries::iterate_all(&self.db, OffsetDateTime::now_utc()).await?;

			*cycle = new_cycle;

			self.snapshot.replace(snapshot.clone());

			(current_cycle, new_cycle, scan)
		};
		let mut report = TickReport {
			cycle: new_cycle,
			snapshot_refreshed,
			fresh: snapshot.fresh_count(),
			malformed: scan.malformed.len(),
			..TickReport::default()
		};

		for key in &scan.malformed {
			tracing::warn!(key = %key, "Skipping query with a malformed key.");
		}

		let ceiling = Duration::from_millis(self.cfg.lookout.search_timeout_ms);
		let mut doomed: Vec<&QueryEntry> = Vec::new();

		for entry in &scan.entries {
			if shutdown.is_cancelled() {
				report.interrupted = true;

				break;
			}
			if entry.cycle == new_cycle {
				report.skipped += 1;

				continue;
			}

			let Some(channel_id) = entry.channel_id.as_deref() else {
				tracing::warn!(key = %entry.key, "Skipping query without a return entry.");

				report.orphaned += 1;

				continue;
			};
			let restrict_to_fresh = entry.cycle != current_cycle;
			let (result, elapsed) =
				search_blocking(index.clone(), entry.query_text.clone(), restrict_to_fresh).await;

			report.evaluated += 1;

			let hits = match result {
				Ok(hits) if elapsed <= ceiling => hits,
				Ok(_) => {
					tracing::info!(
						key = %entry.key,
						elapsed_ms = elapsed.as_millis() as u64,
						"Query exceeded the search latency ceiling. Scheduling removal."
					);
					doomed.push(entry);

					continue;
				},
				Err(err) => {
					tracing::info!(
						error = %err,
						key = %entry.key,
						"Query search failed. Scheduling removal."
					);
					doomed.push(entry);

					continue;
				},
			};
			let listings: Vec<&IndexedListing> = hits
				.iter()
				.filter_map(|hit| {
					let listing = snapshot.get(&hit.server, &hit.listing_id);

					if listing.is_none() {
						tracing::warn!(
							server = %hit.server,
							listing_id = %hit.listing_id,
							"Matched listing is not in the snapshot."
						);
					}

					listing
				})
				.collect();

			if listings.is_empty() {
				continue;
			}

			self.dispatch(channel_id.to_string(), format::notification(entry.id, listings));

			report.notified += 1;
		}

		drop(index);

		let now = OffsetDateTime::now_utc();

		for entry in doomed {
			match queries::delete_query(&self.db, &entry.author_id, entry.id, now).await {
				Ok(_) => report.pruned += 1,
				Err(err) => {
					tracing::error!(
						error = %err,
						key = %entry.key,
						"Failed to remove pruned query."
					);
				},
			}
		}

		tracing::info!(
			cycle = report.cycle,
			refreshed = report.snapshot_refreshed,
			fresh = report.fresh,
			evaluated = report.evaluated,
			skipped = report.skipped,
			notified = report.notified,
			pruned = report.pruned,
			orphaned = report.orphaned,
			malformed = report.malformed,
			"Tick complete."
		);

		Ok(report)
	}

	/// Physically removes expired entries.
	pub async fn purge_expired(&self) -> Result<u64> {
		let purged = queries::purge_expired(&self.db, OffsetDateTime::now_utc()).await?;

		Ok(purged)
	}

	async fn build_index(&self, snapshot: Arc<IndexedSnapshot>) -> Result<Arc<dyn SearchIndex>> {
		let engine = self.search.clone();
		let index = tokio::task::spawn_blocking(move || engine.build(&snapshot))
			.await
			.map_err(|err| Error::Search { message: format!("Index build task failed: {err}.") })??;

		Ok(Arc::from(index))
	}

	fn dispatch(&self, channel_id: String, text: String) {
		let notifier = self.providers.notifier.clone();
		let cfg = self.cfg.providers.notifier.clone();

		tokio::spawn(async move {
			if let Err(err) = notifier.send(&cfg, &channel_id, &text).await {
				tracing::warn!(
					error = %err,
					channel_id = %channel_id,
					"Failed to send notification."
				);
			}
		});
	}
}

/// Runs one search off the async workers; the elapsed time excludes queueing.
async fn search_blocking(
	index: Arc<dyn SearchIndex>,
	query: String,
	restrict_to_fresh: bool,
) -> (Result<Vec<SearchMatch>>, Duration) {
	let task = tokio::task::spawn_blocking(move || {
		let started = Instant::now();
		let result = index.search(&query, restrict_to_fresh);

		(result, started.elapsed())
	});

	match task.await {
		Ok((result, elapsed)) => (result.map_err(Error::from), elapsed),
		Err(err) => (
			Err(Error::Search { message: format!("Search task failed: {err}.") }),
			Duration::ZERO,
		),
	}
}
