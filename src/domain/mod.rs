// Domain-specific error types
pub mod errors;

// Trend forecasts and the recommendation policy
pub mod forecasting;

// Price history types
pub mod market;

// Sequence models, normalization and persisted artifacts
pub mod ml;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;
