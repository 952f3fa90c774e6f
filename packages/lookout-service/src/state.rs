use std::sync::{Arc, RwLock};

use tokio::sync::{RwLock as AsyncRwLock, RwLockReadGuard, RwLockWriteGuard};

use lookout_domain::snapshot::IndexedSnapshot;

/// The current indexed snapshot.
///
/// Readers clone the `Arc` and release the lock at once; the writer holds it only for the swap.
#[derive(Debug, Default)]
pub struct SnapshotState {
	current: RwLock<Arc<IndexedSnapshot>>,
}
impl SnapshotState {
	pub fn load(&self) -> Arc<IndexedSnapshot> {
		self.current.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn replace(&self, next: Arc<IndexedSnapshot>) {
		*self.current.write().unwrap_or_else(|err| err.into_inner()) = next;
	}
}

/// The shared evaluation cycle.
///
/// Saves read it for the whole store write and the evaluator writes it across the query scan, so
/// a save lands either entirely before or entirely after one pass.
#[derive(Debug, Default)]
pub struct CycleCounter {
	cycle: AsyncRwLock<u32>,
}
impl CycleCounter {
	pub async fn read(&self) -> RwLockReadGuard<'_, u32> {
		self.cycle.read().await
	}

	pub async fn write(&self) -> RwLockWriteGuard<'_, u32> {
		self.cycle.write().await
	}
}
