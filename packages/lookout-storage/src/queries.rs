use lookout_domain::{duration::MAX_TTL, ids};
use time::{Duration, OffsetDateTime};

use crate::{
	Error, Result,
	db::Db,
	keys::{self, QUERY_KIND},
	models::{QueryEntry, QueryScan, StoredQuery},
};

type JoinedRow = (String, String, i64, Option<String>);

/// Stores a query and its return entry under the author's lowest free slot.
///
/// Both entries share one expiry. Returns the new query id.
pub async fn save_query(
	db: &Db,
	author_id: &str,
	channel_id: &str,
	query_text: &str,
	ttl: Duration,
	cycle: u32,
	now: OffsetDateTime,
) -> Result<u32> {
	keys::validate_author(author_id)?;

	if ttl <= Duration::ZERO || ttl > MAX_TTL {
		return Err(Error::InvalidTtl);
	}

	let now_ms = unix_ms(now);
	let expires_at = unix_ms(now + ttl);
	let (lower, upper) = keys::prefix_range(&keys::author_prefix(QUERY_KIND, author_id));
	let mut tx = db.pool.begin().await?;
	let live_keys: Vec<String> = sqlx::query_scalar(
		"\
SELECT key
FROM lookout_entries
WHERE key >= ? AND key < ? AND expires_at > ?
ORDER BY key",
	)
	.bind(lower.as_str())
	.bind(upper.as_str())
	.bind(now_ms)
	.fetch_all(&mut *tx)
	.await?;
	let mut occupied = [false; ids::MAX_SLOTS as usize];

	for key in live_keys {
		match keys::parse(&key).and_then(|parsed| {
			ids::decode(parsed.id).map_err(|_| Error::MalformedKey { key: key.clone() })
		}) {
			Ok((slot, _)) => occupied[usize::from(slot)] = true,
			Err(err) => {
				tracing::warn!(
					error = %err,
					key = %key,
					"Ignoring undecodable key during slot scan."
				);
			},
		}
	}

	let Some(slot) = (0..ids::MAX_SLOTS).find(|slot| !occupied[usize::from(*slot)]) else {
		return Err(Error::IndicesFull { author_id: author_id.to_string() });
	};
	let id = ids::encode(slot, cycle).map_err(|err| Error::InvalidArgument(err.to_string()))?;

	let entries = [
		(keys::query_key(author_id, id), query_text),
		(keys::return_key(author_id, id), channel_id),
	];

	for (key, value) in entries {
		let result = sqlx::query(
			"\
INSERT INTO lookout_entries (key, value, expires_at)
VALUES (?, ?, ?)
ON CONFLICT (key) DO UPDATE
SET value = excluded.value, expires_at = excluded.expires_at
WHERE lookout_entries.expires_at <= ?",
		)
		.bind(key.as_str())
		.bind(value)
		.bind(expires_at)
		.bind(now_ms)
		.execute(&mut *tx)
		.await?;

		// The transaction rolls back on drop.
		if result.rows_affected() == 0 {
			return Err(Error::Conflict(format!("Key {key:?} is still live.")));
		}
	}

	tx.commit().await?;

	Ok(id)
}

/// Every live query of one author, ordered by id.
pub async fn find_by_author(
	db: &Db,
	author_id: &str,
	now: OffsetDateTime,
) -> Result<Vec<StoredQuery>> {
	keys::validate_author(author_id)?;

	let now_ms = unix_ms(now);
	let (lower, upper) = keys::prefix_range(&keys::author_prefix(QUERY_KIND, author_id));
	let rows = fetch_joined(db, &lower, &upper, now_ms).await?;
	let mut out = Vec::with_capacity(rows.len());

	for (key, query_text, expires_at, channel_id) in rows {
		let parsed = keys::parse(&key)?;
		let (slot, cycle) =
			ids::decode(parsed.id).map_err(|_| Error::MalformedKey { key: key.clone() })?;
		let ttl = Duration::milliseconds(expires_at - now_ms);

		if ttl > MAX_TTL {
			return Err(Error::CorruptQuery { key });
		}

		let Some(channel_id) = channel_id else {
			return Err(Error::OrphanPair { key });
		};

		out.push(StoredQuery {
			author_id: author_id.to_string(),
			channel_id,
			id: parsed.id,
			slot,
			cycle,
			ttl,
			query_text,
		});
	}

	Ok(out)
}

/// Removes both entries of a query; returns how many live entries were removed.
pub async fn delete_query(db: &Db, author_id: &str, id: u32, now: OffsetDateTime) -> Result<u64> {
	keys::validate_author(author_id)?;

	let mut tx = db.pool.begin().await?;
	let result = sqlx::query(
		"\
DELETE FROM lookout_entries
WHERE key IN (?, ?) AND expires_at > ?",
	)
	.bind(keys::query_key(author_id, id))
	.bind(keys::return_key(author_id, id))
	.bind(unix_ms(now))
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(result.rows_affected())
}

/// Reads every live query entry joined with its return entry in one statement.
pub async fn iterate_all(db: &Db, now: OffsetDateTime) -> Result<QueryScan> {
	let now_ms = unix_ms(now);
	let (lower, upper) = keys::prefix_range(&keys::kind_prefix(QUERY_KIND));
	let rows = fetch_joined(db, &lower, &upper, now_ms).await?;
	let mut scan = QueryScan::default();

	for (key, query_text, _, channel_id) in rows {
		let decoded = keys::parse(&key).ok().and_then(|parsed| {
			ids::decode(parsed.id)
				.ok()
				.map(|(slot, cycle)| (parsed.author_id.to_string(), parsed.id, slot, cycle))
		});
		let Some((author_id, id, slot, cycle)) = decoded else {
			scan.malformed.push(key);

			continue;
		};

		scan.entries.push(QueryEntry { key, author_id, id, slot, cycle, query_text, channel_id });
	}

	Ok(scan)
}

/// Physically deletes every expired entry.
pub async fn purge_expired(db: &Db, now: OffsetDateTime) -> Result<u64> {
	let result = sqlx::query("DELETE FROM lookout_entries WHERE expires_at <= ?")
		.bind(unix_ms(now))
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

async fn fetch_joined(db: &Db, lower: &str, upper: &str, now_ms: i64) -> Result<Vec<JoinedRow>> {
	let rows = sqlx::query_as::<_, JoinedRow>(
		"\
SELECT q.key, q.value, q.expires_at, r.value
FROM lookout_entries q
LEFT JOIN lookout_entries r
	ON r.key = 'return' || substr(q.key, 6) AND r.expires_at > ?
WHERE q.key >= ? AND q.key < ? AND q.expires_at > ?
ORDER BY q.key",
	)
	.bind(now_ms)
	.bind(lower)
	.bind(upper)
	.bind(now_ms)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

fn unix_ms(at: OffsetDateTime) -> i64 {
	(at.unix_timestamp_nanos() / 1_000_000) as i64
}
