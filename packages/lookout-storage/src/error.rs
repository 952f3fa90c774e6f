#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Time to live must be greater than zero and at most twenty-four hours.")]
	InvalidTtl,
	#[error("All query slots for author {author_id} are in use.")]
	IndicesFull { author_id: String },
	#[error("Stored key {key:?} cannot be decoded.")]
	MalformedKey { key: String },
	#[error("Stored query {key:?} outlives the maximum time to live.")]
	CorruptQuery { key: String },
	#[error("Stored query {key:?} has no matching return entry.")]
	OrphanPair { key: String },
	#[error("Conflict: {0}")]
	Conflict(String),
}
