use lookout_domain::query::QueryError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Query(#[from] QueryError),
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("All query slots are in use.")]
	IndicesFull,
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Corrupt data: {message}")]
	Corrupt { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<lookout_storage::Error> for Error {
	fn from(err: lookout_storage::Error) -> Self {
		use lookout_storage::Error as StorageError;

		match err {
			StorageError::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			StorageError::InvalidArgument(message) => Self::InvalidRequest { message },
			StorageError::InvalidTtl => Self::Query(QueryError::DurationOutOfRange),
			StorageError::IndicesFull { .. } => Self::IndicesFull,
			StorageError::Conflict(message) => Self::Conflict { message },
			err @ (StorageError::MalformedKey { .. }
			| StorageError::CorruptQuery { .. }
			| StorageError::OrphanPair { .. }) => Self::Corrupt { message: err.to_string() },
		}
	}
}

impl From<crate::search::SearchError> for Error {
	fn from(err: crate::search::SearchError) -> Self {
		Self::Search { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
