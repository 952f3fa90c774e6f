use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;

/// Discord rejects message bodies longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2_000;

/// Posts `text` to a channel, split into as many messages as the length limit requires.
pub async fn send_message(
	cfg: &lookout_config::NotifierConfig,
	channel_id: &str,
	text: &str,
) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/channels/{channel_id}/messages", cfg.api_base);
	let headers =
		crate::auth_headers(&format!("Bot {}", cfg.bot_token), &cfg.default_headers)?;

	for chunk in split_message(text, MESSAGE_LIMIT) {
		let body = serde_json::json!({ "content": chunk });

		client
			.post(&url)
			.headers(headers.clone())
			.json(&body)
			.send()
			.await?
			.error_for_status()?;
	}

	Ok(())
}

/// Splits on blank lines where possible and inside a paragraph only when one paragraph alone is
/// over the limit.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
	let mut chunks = Vec::new();
	let mut current = String::new();
	let mut current_len = 0;

	for paragraph in text.split("\n\n") {
		let paragraph_len = paragraph.chars().count();
		let joined_len =
			if current.is_empty() { paragraph_len } else { current_len + 2 + paragraph_len };

		if joined_len <= limit {
			if !current.is_empty() {
				current.push_str("\n\n");
			}

			current.push_str(paragraph);
			current_len = joined_len;

			continue;
		}
		if !current.is_empty() {
			chunks.push(std::mem::take(&mut current));
		}

		if paragraph_len <= limit {
			current.push_str(paragraph);
			current_len = paragraph_len;

			continue;
		}

		let chars: Vec<char> = paragraph.chars().collect();

		for piece in chars.chunks(limit) {
			chunks.push(piece.iter().collect());
		}

		current_len = 0;
	}

	if !current.is_empty() {
		chunks.push(current);
	}

	chunks
}
