pub mod forecast;
pub mod model_info;
pub mod serve;

pub use forecast::{ForecastArgs, forecast};
pub use model_info::model_info;
pub use serve::serve;
