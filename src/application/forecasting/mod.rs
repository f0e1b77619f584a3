// Feature engineering and windowing
pub mod feature_pipeline;
pub mod windower;

// Training and serving
pub mod forecaster;
pub mod history;
pub mod trainer;

// Per-symbol coordination
pub mod symbol_locks;
pub mod training_registry;

// Multi-symbol requests
pub mod batch;

pub mod request;
pub mod settings;

pub use batch::BatchCoordinator;
pub use forecaster::Forecaster;
pub use settings::ForecastSettings;
pub use trainer::Trainer;
