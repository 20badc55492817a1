//! Configuration module for tabtree
//!
//! Resolution order:
//! 1. Environment variables (TABTREE_*)
//! 2. Config file (`--config`, else `<config dir>/tabtree/config.toml`)
//! 3. Built-in defaults

mod loader;
mod types;

pub use loader::{default_config_path, with_env_overrides, ConfigWarning};
pub use types::{CloseConfig, EngineConfig, PersistenceConfig, SearchConfig};
