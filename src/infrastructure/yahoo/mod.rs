pub mod chart;
pub mod provider;

pub use provider::YahooPriceHistoryProvider;
