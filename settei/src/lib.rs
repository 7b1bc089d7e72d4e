#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # settei
//!
//! Resolve a named application config from registered environment factories.
//!
//! An application registers one factory per environment (`default`, `dev`,
//! `live`, ...) in a [`Registry`] group. A factory may depend on exactly one
//! other environment by naming it as a parameter; the resolver resolves that
//! environment first and hands its [`Config`] to the factory, which layers its
//! own settings on top.
//!
//! ## Core Types
//!
//! - [`Config`]: the key/value container factories build and return
//! - [`EntryPoint`] and [`Registry`]: registered factories and where they live
//! - [`Resolver`]: dependency resolution with a resettable cache
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use settei::{get_config, Config, EntryPoint, StaticRegistry};
//!
//! fn default(_: settei::Injections) -> settei::Result<Config> {
//!     let mut config = Config::new();
//!     config.insert("QUESTION", "The Ultimate Question");
//!     Ok(config)
//! }
//!
//! fn dev(deps: settei::Injections) -> settei::Result<Config> {
//!     let mut config = deps.into_dependency().unwrap_or_default();
//!     config.insert("ANSWER", 42);
//!     Ok(config)
//! }
//!
//! let registry = StaticRegistry::new()
//!     .with("application", EntryPoint::new("default", &[], default))
//!     .with("application", EntryPoint::new("dev", &["default"], dev));
//!
//! let config = get_config(&registry, "application", Some("dev")).unwrap();
//! assert_eq!(config["ANSWER"], 42);
//! assert_eq!(config["QUESTION"], "The Ultimate Question");
//! ```

pub mod config;
pub mod entry_points;
pub mod environment;
pub mod error;
pub mod resolver;

// Re-export key types at crate root for convenience
pub use config::{Config, FsLoader, MemoryLoader, SourceLoader};
pub use entry_points::{list_entry_points, EntryPoint, Injections, Registry, StaticRegistry};
pub use environment::{resolve_environment_name, DEFAULT_ENVIRONMENT, ENVIRONMENT_VARIABLE};
pub use error::{Error, Result};
pub use resolver::{ResolutionCache, Resolver, ResolverBuilder};

/// Resolves environment `name` of `group` with a fresh resolver.
///
/// Each call starts from an empty cache, so repeated calls construct
/// independent configs. Keep a [`Resolver`] around to reuse resolved
/// environments between calls.
///
/// # Errors
///
/// See [`Resolver::get_config`].
pub fn get_config<R>(registry: &R, group: &str, name: Option<&str>) -> Result<Config>
where
    R: Registry + ?Sized,
{
    Resolver::new(registry).get_config(group, name)
}
