use time::Duration;

use lookout_domain::ids::{self, MAX_SLOTS};
use lookout_storage::{Error, db::Db, keys, queries};
use lookout_testkit::fixed_now;

async fn test_db() -> Db {
	let pool = lookout_testkit::memory_pool().await.expect("Failed to open in-memory database.");
	let db = Db::from_pool(pool);

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

async fn entry_count(db: &Db) -> i64 {
	sqlx::query_scalar("SELECT count(*) FROM lookout_entries")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count entries.")
}

async fn save(db: &Db, author: &str, cycle: u32) -> u32 {
	let ttl = Duration::hours(1);

	queries::save_query(db, author, "chan-1", "+Server:Cannith", ttl, cycle, fixed_now())
		.await
		.expect("Failed to save query.")
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
	let db = test_db().await;

	db.ensure_schema().await.expect("Second schema pass failed.");

	assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn saves_use_distinct_slots() {
	let db = test_db().await;

	for _ in 0..4 {
		save(&db, "alice", 7).await;
	}

	let stored = queries::find_by_author(&db, "alice", fixed_now()).await.expect("Find failed.");
	let mut slots: Vec<_> = stored.iter().map(|query| query.slot).collect();

	slots.sort_unstable();
	slots.dedup();

	assert_eq!(stored.len(), 4);
	assert_eq!(slots, vec![0, 1, 2, 3]);
	assert!(stored.iter().all(|query| query.cycle == 7 && query.channel_id == "chan-1"));
	assert!(stored.iter().all(|query| query.ttl == Duration::hours(1)));
}

#[tokio::test]
async fn eleventh_save_is_rejected_without_writes() {
	let db = test_db().await;

	for _ in 0..MAX_SLOTS {
		save(&db, "alice", 1).await;
	}

	let before = entry_count(&db).await;
	let err = queries::save_query(
		&db,
		"alice",
		"chan-1",
		"+Server:Cannith",
		Duration::hours(1),
		2,
		fixed_now(),
	)
	.await
	.expect_err("Expected full slots.");

	assert!(matches!(err, Error::IndicesFull { ref author_id } if author_id == "alice"));
	assert_eq!(entry_count(&db).await, before);
	assert_eq!(before, i64::from(MAX_SLOTS) * 2);
}

#[tokio::test]
async fn deleted_slot_is_recycled_first() {
	let db = test_db().await;
	let mut saved = Vec::new();

	for cycle in 0..4 {
		saved.push(save(&db, "alice", cycle).await);
	}

	let removed =
		queries::delete_query(&db, "alice", saved[1], fixed_now()).await.expect("Delete failed.");

	assert_eq!(removed, 2);

	let id = save(&db, "alice", 99).await;

	assert_eq!(ids::decode(id), Ok((1, 99)));
}

#[tokio::test]
async fn authors_do_not_share_slots() {
	let db = test_db().await;
	let alice = save(&db, "alice", 3).await;
	let bob = save(&db, "bob", 3).await;

	assert_eq!(alice, bob);

	for author in ["alice", "bob"] {
		let stored =
			queries::find_by_author(&db, author, fixed_now()).await.expect("Find failed.");

		assert_eq!(stored.len(), 1);
	}
}

#[tokio::test]
async fn entries_expire_together() {
	let db = test_db().await;
	let id = save(&db, "alice", 0).await;
	let later = fixed_now() + Duration::minutes(59);
	let expired = fixed_now() + Duration::hours(1);

	assert_eq!(queries::find_by_author(&db, "alice", later).await.expect("Find failed.").len(), 1);
	assert!(queries::find_by_author(&db, "alice", expired).await.expect("Find failed.").is_empty());
	assert!(queries::iterate_all(&db, expired).await.expect("Scan failed.").entries.is_empty());
	assert_eq!(queries::delete_query(&db, "alice", id, expired).await.expect("Delete failed."), 0);

	let next = queries::save_query(
		&db,
		"alice",
		"chan-2",
		"+Server:Khyber",
		Duration::hours(2),
		0,
		expired,
	)
	.await
	.expect("Save over expired entries failed.");

	assert_eq!(next, id);
	assert_eq!(queries::purge_expired(&db, expired).await.expect("Purge failed."), 0);
	assert_eq!(
		queries::purge_expired(&db, expired + Duration::hours(2)).await.expect("Purge failed."),
		2
	);
	assert_eq!(entry_count(&db).await, 0);
}

#[tokio::test]
async fn rejects_out_of_range_ttl() {
	let db = test_db().await;

	for ttl in [Duration::ZERO, Duration::seconds(-1), Duration::hours(25)] {
		let err = queries::save_query(&db, "alice", "chan", "text", ttl, 0, fixed_now())
			.await
			.expect_err("Expected invalid ttl.");

		assert!(matches!(err, Error::InvalidTtl));
	}
}

#[tokio::test]
async fn iterate_all_pairs_entries_and_reports_anomalies() {
	let db = test_db().await;
	let paired = save(&db, "alice", 5).await;
	let orphan = save(&db, "bob", 6).await;
	let expires_at = (fixed_now() + Duration::hours(1)).unix_timestamp() * 1_000;

	sqlx::query("DELETE FROM lookout_entries WHERE key = ?")
		.bind(keys::return_key("bob", orphan))
		.execute(&db.pool)
		.await
		.expect("Failed to drop return entry.");
	sqlx::query("INSERT INTO lookout_entries (key, value, expires_at) VALUES (?, 'x', ?)")
		.bind("query/carol/zz")
		.bind(expires_at)
		.execute(&db.pool)
		.await
		.expect("Failed to insert malformed entry.");

	let scan = queries::iterate_all(&db, fixed_now()).await.expect("Scan failed.");

	assert_eq!(scan.entries.len(), 2);
	assert_eq!(scan.malformed, vec!["query/carol/zz".to_string()]);

	let alice = scan.entries.iter().find(|entry| entry.author_id == "alice").expect("alice");
	let bob = scan.entries.iter().find(|entry| entry.author_id == "bob").expect("bob");

	assert_eq!(alice.id, paired);
	assert_eq!((alice.slot, alice.cycle), (0, 5));
	assert_eq!(alice.channel_id.as_deref(), Some("chan-1"));
	assert_eq!(alice.query_text, "+Server:Cannith");
	assert_eq!(bob.channel_id, None);

	let err =
		queries::find_by_author(&db, "bob", fixed_now()).await.expect_err("Expected orphan.");

	assert!(matches!(err, Error::OrphanPair { .. }));
}

#[tokio::test]
async fn find_by_author_flags_corrupt_ttl() {
	let db = test_db().await;
	let id = save(&db, "alice", 0).await;
	let far_future = (fixed_now() + Duration::hours(48)).unix_timestamp() * 1_000;

	sqlx::query("UPDATE lookout_entries SET expires_at = ? WHERE key = ?")
		.bind(far_future)
		.bind(keys::query_key("alice", id))
		.execute(&db.pool)
		.await
		.expect("Failed to corrupt entry.");

	let err =
		queries::find_by_author(&db, "alice", fixed_now()).await.expect_err("Expected corruption.");

	assert!(matches!(err, Error::CorruptQuery { .. }));
}

#[tokio::test]
async fn find_by_author_rejects_malformed_keys() {
	let db = test_db().await;
	let expires_at = (fixed_now() + Duration::hours(1)).unix_timestamp() * 1_000;

	sqlx::query("INSERT INTO lookout_entries (key, value, expires_at) VALUES (?, 'x', ?)")
		.bind("query/alice/0x1")
		.bind(expires_at)
		.execute(&db.pool)
		.await
		.expect("Failed to insert malformed entry.");

	let err = queries::find_by_author(&db, "alice", fixed_now())
		.await
		.expect_err("Expected malformed key.");

	assert!(matches!(err, Error::MalformedKey { .. }));
}

#[tokio::test]
async fn live_entry_is_never_overwritten() {
	let db = test_db().await;
	let id = save(&db, "alice", 0).await;

	// Occupy slot 0 of the same cycle with only a stray return entry, then free the query slot.
	sqlx::query("DELETE FROM lookout_entries WHERE key = ?")
		.bind(keys::query_key("alice", id))
		.execute(&db.pool)
		.await
		.expect("Failed to drop query entry.");

	let err =
		queries::save_query(&db, "alice", "chan-9", "text", Duration::hours(1), 0, fixed_now())
			.await
			.expect_err("Expected conflict.");

	assert!(matches!(err, Error::Conflict(_)));
	assert_eq!(entry_count(&db).await, 1);
}
