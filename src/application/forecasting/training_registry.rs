use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

/// Symbols with a training run in flight.
///
/// Counts runs per symbol: a queued run waiting on the symbol lock is
/// counted as well, so the symbol reads as training until every run ends.
#[derive(Debug, Clone, Default)]
pub struct TrainingRegistry {
    in_flight: Arc<Mutex<HashMap<String, usize>>>,
}

/// Marks one run in flight until dropped
#[derive(Debug)]
pub struct TrainingSlot {
    symbol: String,
    in_flight: Arc<Mutex<HashMap<String, usize>>>,
}

impl TrainingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot only if no run is in flight for `symbol`
    pub fn try_begin(&self, symbol: &str) -> Option<TrainingSlot> {
        let mut in_flight = self.lock();
        if in_flight.get(symbol).copied().unwrap_or(0) > 0 {
            return None;
        }
        in_flight.insert(symbol.to_string(), 1);
        Some(self.slot(symbol))
    }

    /// Reserves a slot unconditionally
    pub fn enter(&self, symbol: &str) -> TrainingSlot {
        *self.lock().entry(symbol.to_string()).or_insert(0) += 1;
        self.slot(symbol)
    }

    pub fn is_training(&self, symbol: &str) -> bool {
        self.lock().get(symbol).copied().unwrap_or(0) > 0
    }

    /// Symbols currently training, sorted
    pub fn in_flight(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.lock().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    fn slot(&self, symbol: &str) -> TrainingSlot {
        TrainingSlot {
            symbol: symbol.to_string(),
            in_flight: self.in_flight.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        lock_recovering(&self.in_flight)
    }
}

impl TrainingSlot {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Drop for TrainingSlot {
    fn drop(&mut self) {
        let mut in_flight = lock_recovering(&self.in_flight);
        if let Some(count) = in_flight.get_mut(&self.symbol) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                in_flight.remove(&self.symbol);
            }
        }
    }
}

fn lock_recovering(
    in_flight: &Mutex<HashMap<String, usize>>,
) -> MutexGuard<'_, HashMap<String, usize>> {
    match in_flight.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("TrainingRegistry: Lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
