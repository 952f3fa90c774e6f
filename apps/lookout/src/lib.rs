pub mod routes;
pub mod state;
pub mod worker;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = lookout_cli::VERSION,
	rename_all = "kebab",
	styles = lookout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lookout_config::load(&args.config)?;
	init_tracing(&config)?;
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config).await?;
	let shutdown = CancellationToken::new();

	tokio::spawn(watch_ctrl_c(shutdown.clone()));

	let worker = tokio::spawn(worker::run_worker(state.service.clone(), shutdown.clone()));
	let app = routes::router(state);
	let http_listener = TcpListener::bind(http_addr).await?;
	tracing::info!(%http_addr, "HTTP server listening.");
	let served = axum::serve(http_listener, app)
		.with_graceful_shutdown(shutdown.clone().cancelled_owned())
		.await;

	// The worker also stops when the server exits on its own.
	shutdown.cancel();
	worker.await?;
	served?;

	Ok(())
}

fn init_tracing(config: &lookout_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}

async fn watch_ctrl_c(shutdown: CancellationToken) {
	match tokio::signal::ctrl_c().await {
		Ok(()) => {
			tracing::info!("Shutdown requested.");

			shutdown.cancel();
		},
		Err(err) => tracing::error!(error = %err, "Failed to listen for Ctrl-C."),
	}
}
