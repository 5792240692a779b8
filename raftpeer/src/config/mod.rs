#[allow(clippy::module_inception)]
mod config;
mod errors;


pub use config::Config;
pub use errors::ConfigError;
pub(crate) use config::RuntimeConfig;
