pub mod core;
pub mod factory;
pub mod mock;
pub mod observability;
pub mod persistence;
pub mod yahoo;

pub use mock::MockPriceHistoryProvider;
pub use persistence::{FileArtifactStore, InMemoryArtifactStore, SqliteArtifactStore};
pub use yahoo::YahooPriceHistoryProvider;
