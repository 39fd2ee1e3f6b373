mod config_loader;
mod defaults;
mod error;
mod secret;
mod tests;

pub use config_loader::{Config, ConfigLoader, Protocol};
pub use error::ConfigError;
pub use secret::Secret;
