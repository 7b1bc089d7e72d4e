//! The config container and the loaders that fill it.
//!
//! A [`Config`] is what every environment factory returns. Factories fill it
//! from several kinds of source, each merging only upper-case keys:
//!
//! - live objects implementing `serde::Serialize` ([`Config::from_object`])
//! - dotted import paths resolved by a [`SourceLoader`] ([`Config::from_object`] with a string)
//! - YAML or JSON files ([`Config::from_file`])
//! - a file named by an environment variable ([`Config::from_envvar`])
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use settei::config::{Config, MemoryLoader};
//! use std::sync::Arc;
//!
//! let loader = MemoryLoader::new()
//!     .with_object("settings.Base", json!({"DEBUG": false, "name": "ignored"}));
//!
//! let mut config = Config::with_loader(Arc::new(loader));
//! config.from_object("settings.Base").unwrap();
//! config.insert("DEBUG", true);
//!
//! assert_eq!(config["DEBUG"], json!(true));
//! assert!(!config.contains_key("name"));
//! ```

pub mod container;
pub mod loader;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use container::{is_upper_key, Config};
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
