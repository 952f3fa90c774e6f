pub mod duration;
pub mod format;
pub mod freshness;
pub mod ids;
pub mod listing;
pub mod query;
pub mod snapshot;
pub mod translate;
