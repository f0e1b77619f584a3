// Engine wiring
pub mod bootstrap;

// Feature pipeline, training, forecasting and batching
pub mod forecasting;

// Engine facade
pub mod system;

pub use system::ForecastingEngine;
