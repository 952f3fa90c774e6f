use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;

use lookout_domain::listing::RawSnapshot;

pub async fn fetch_snapshot(cfg: &lookout_config::ListingsProviderConfig) -> Result<RawSnapshot> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client.get(url).send().await?;
	let body = res.error_for_status()?.text().await?;

	parse_snapshot(&body)
}

pub fn parse_snapshot(body: &str) -> Result<RawSnapshot> {
	let snapshot: RawSnapshot = serde_json::from_str(body)
		.map_err(|err| eyre::eyre!("Listing response is not a server list: {err}."))?;

	Ok(snapshot)
}
