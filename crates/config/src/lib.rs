//! Configuration for llamalint.
//!
//! Locates `.llamalint.{yaml,yml,json,toml}` (or the `[tool.llamalint]`
//! table of `pyproject.toml` / the `llamalint` key of `package.json`),
//! parses it, resolves `extends` chains and compiles include/exclude globs.

mod config;
mod error;
mod loader;
mod matcher;
mod resolve;

pub use config::{ExtendsConfig, OptionTable, ProjectConfig};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILES};
pub use matcher::FileFilter;
pub use resolve::{is_path_reference, resolve_config};
