use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use lookout_domain::ids::TICK_SECONDS;
use lookout_service::LookoutService;

/// Runs a tick every `TICK_SECONDS` and purges expired entries on their own interval until
/// `shutdown` fires.
pub async fn run_worker(service: Arc<LookoutService>, shutdown: CancellationToken) {
	let period = Duration::from_secs(u64::from(TICK_SECONDS));
	let purge_period = Duration::from_secs(service.cfg.lookout.purge_interval_seconds);
	let mut ticker = time::interval_at(Instant::now() + period, period);
	let mut last_purge = Instant::now();

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			_ = shutdown.cancelled() => break,
			_ = ticker.tick() => {},
		}

		match service.tick(&shutdown).await {
			Ok(report) if report.interrupted => {
				tracing::info!(cycle = report.cycle, "Tick interrupted by shutdown.");
			},
			Ok(_) => {},
			Err(err) => tracing::error!(error = %err, "Tick failed."),
		}

		if last_purge.elapsed() >= purge_period {
			match service.purge_expired().await {
				Ok(purged) => {
					tracing::info!(purged, "Purged expired entries.");

					last_purge = Instant::now();
				},
				Err(err) => tracing::error!(error = %err, "Expired entry purge failed."),
			}
		}
	}

	tracing::info!("Worker stopped.");
}
