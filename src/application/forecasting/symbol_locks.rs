use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::error;

/// One async mutex per symbol, created on first use.
///
/// Guards the artifact load/train/save sequence so a symbol never has two
/// training runs at once and readers never interleave with a write.
/// Different symbols never contend.
#[derive(Debug, Default)]
pub struct SymbolLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SymbolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, symbol: &str) -> OwnedMutexGuard<()> {
        self.lock_for(symbol).lock_owned().await
    }

    /// Non-waiting variant; `None` when the symbol is currently held
    pub fn try_acquire(&self, symbol: &str) -> Option<OwnedMutexGuard<()>> {
        self.lock_for(symbol).try_lock_owned().ok()
    }

    fn lock_for(&self, symbol: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("SymbolLocks: Lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        locks
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
