// Trend forecasting domain
pub mod feature_row;
pub mod forecast;
pub mod model_state;
pub mod recommendation;

pub use feature_row::{CLOSE_INDEX, FEATURE_COUNT, FEATURE_NAMES, FeatureRow};
pub use forecast::ForecastResult;
pub use model_state::{ModelState, PredictionOutcome, TrainStatus};
pub use recommendation::{Confidence, Recommendation};
