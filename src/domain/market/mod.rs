// Market data domain
pub mod history_period;
pub mod price_bar;

pub use history_period::HistoryPeriod;
pub use price_bar::PriceBar;
