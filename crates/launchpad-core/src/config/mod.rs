//! Launchpad configuration layer
//!
//! Every environment variable read lives here; the pipeline only sees typed
//! config structs and never calls `std::env::var` directly.
//!
//! - `loader`: `.env` loading plus `env_or` / `env_optional` / `env_bool`
//! - `schema`: `LaunchConfig`, `ObservabilityConfig`, `PauseMode`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{ConfigError, LaunchConfig, ObservabilityConfig, PauseMode};
