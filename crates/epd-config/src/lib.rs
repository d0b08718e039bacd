pub mod detector;
pub mod engine;
pub mod logging;
mod validate;

pub use detector::DetectorConfig;
pub use engine::EngineConfig;
pub use logging::{LogFormat, LoggingConfig};
