#[macro_use]
mod log_macros;

pub mod bootstrap;
pub mod error;
pub mod tracing_init;
