pub mod file;
pub mod in_memory;
pub mod sqlite;

pub use file::FileArtifactStore;
pub use in_memory::InMemoryArtifactStore;
pub use sqlite::SqliteArtifactStore;
