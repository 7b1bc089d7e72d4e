//! Resolution of named environments into configs.
//!
//! Resolving an environment walks its dependency chain: the entry point is
//! looked up, the single environment it depends on is resolved first (through
//! the cache), then the factory runs with that config injected and its result
//! is checked to be a [`Config`].
//!
//! Each resolution moves through the stages looked up, resolving
//! dependencies, invoked and validated; any of them can fail, and a failure
//! leaves nothing behind in the cache, including dependencies resolved on the
//! way.
//!
//! # Examples
//!
//! ```
//! use settei::entry_points::{EntryPoint, StaticRegistry};
//! use settei::{Config, Resolver};
//!
//! let registry = StaticRegistry::new()
//!     .with("application", EntryPoint::new("default", &[], |_| {
//!         let mut config = Config::new();
//!         config.insert("DEBUG", false);
//!         Ok(config)
//!     }))
//!     .with("application", EntryPoint::new("dev", &["default"], |deps| {
//!         let mut config = deps.into_dependency().unwrap_or_default();
//!         config.insert("DEBUG", true);
//!         Ok(config)
//!     }));
//!
//! let mut resolver = Resolver::new(registry);
//! let dev = resolver.get_config("application", Some("dev")).unwrap();
//! assert_eq!(dev["DEBUG"], true);
//!
//! // "default" was resolved on the way and is memoized
//! assert!(resolver.cached("application", "default").is_some());
//! ```

pub mod cache;

pub use cache::{CacheKey, ResolutionCache};

use crate::config::{Config, FsLoader, SourceLoader};
use crate::entry_points::{list_entry_points, EntryPoint, Injections, Registry};
use crate::environment::{EnvironmentSelector, ENVIRONMENT_VARIABLE};
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`Resolver`].
///
/// # Examples
///
/// ```
/// use settei::entry_points::StaticRegistry;
/// use settei::ResolverBuilder;
///
/// let resolver = ResolverBuilder::new()
///     .with_environment_variable("MYAPP_ENV")
///     .with_root("/etc/myapp")
///     .build(StaticRegistry::new());
/// assert_eq!(resolver.selector().variable(), "MYAPP_ENV");
/// ```
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    environment_variable: String,
    loader: Option<Arc<dyn SourceLoader>>,
}

impl ResolverBuilder {
    /// Creates a builder with the default selector variable and loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment_variable: ENVIRONMENT_VARIABLE.to_string(),
            loader: None,
        }
    }

    /// Sets the variable read when no environment name is passed.
    #[must_use]
    pub fn with_environment_variable(mut self, variable: impl Into<String>) -> Self {
        self.environment_variable = variable.into();
        self
    }

    /// Sets the loader handed to factories that declare the `loader` parameter
    /// and bound to the dependency config they receive.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn SourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Uses a filesystem loader rooted at `root`.
    #[must_use]
    pub fn with_root(self, root: impl Into<PathBuf>) -> Self {
        self.with_loader(Arc::new(FsLoader::new(root)))
    }

    /// Builds a resolver over `registry`.
    #[must_use]
    pub fn build<R: Registry>(self, registry: R) -> Resolver<R> {
        Resolver {
            registry,
            selector: EnvironmentSelector::new(self.environment_variable),
            loader: self
                .loader
                .unwrap_or_else(|| Arc::new(FsLoader::current_dir())),
            cache: ResolutionCache::new(),
        }
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves environments of a [`Registry`], memoizing results until cleared.
pub struct Resolver<R> {
    registry: R,
    selector: EnvironmentSelector,
    loader: Arc<dyn SourceLoader>,
    cache: ResolutionCache,
}

impl<R: Registry> Resolver<R> {
    /// Creates a resolver with default settings.
    #[must_use]
    pub fn new(registry: R) -> Self {
        ResolverBuilder::new().build(registry)
    }

    /// The registry entry points are looked up in.
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// The environment selector.
    #[must_use]
    pub fn selector(&self) -> &EnvironmentSelector {
        &self.selector
    }

    /// The resolution cache.
    #[must_use]
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// The memoized config for `name` in `group`, if resolved since the last clear.
    #[must_use]
    pub fn cached(&self, group: &str, name: &str) -> Option<&Config> {
        self.cache.get(group, name)
    }

    /// Forgets every memoized config.
    pub fn clear(&mut self) {
        log::debug!("clearing {} memoized config(s)", self.cache.len());
        self.cache.clear();
    }

    /// Resolves environment `name` of `group`.
    ///
    /// Without a name, the selector variable decides.
    ///
    /// # Errors
    ///
    /// - [`Error::EnvironmentNotSpecified`] when no name is available
    /// - [`Error::EnvironmentIsMissing`] when the environment or one it depends on is not registered
    /// - [`Error::DuplicateEntryPoint`] when a name is registered more than once
    /// - [`Error::MoreThanOneDependencyInjection`] when a factory declares two dependencies
    /// - [`Error::DependencyCycle`] when dependencies loop
    /// - [`Error::WrongConfigType`] when a factory returns something other than a [`Config`]
    /// - any error a factory returns, such as [`Error::ImportString`] or [`Error::Io`]
    pub fn get_config(&mut self, group: &str, name: Option<&str>) -> Result<Config> {
        let name = self.selector.select(name)?;
        log::debug!("resolving environment '{name}' of group '{group}'");

        self.cache.begin();
        let outcome = self.resolve(group, &name);
        if outcome.is_ok() {
            self.cache.commit();
        } else {
            self.cache.rollback();
        }
        outcome
    }

    fn resolve(&mut self, group: &str, name: &str) -> Result<Config> {
        if let Some(config) = self.cache.get(group, name) {
            log::debug!("'{name}' already resolved, using memoized config");
            return Ok(config.clone());
        }

        let key = CacheKey::new(group, name);
        self.cache.enter(key.clone())?;
        let outcome = self.resolve_uncached(group, name);
        self.cache.leave(&key, outcome.as_ref().ok().cloned());

        if let Err(e) = &outcome {
            log::debug!("resolution of '{name}' failed: {e}");
        }
        outcome
    }

    fn resolve_uncached(&mut self, group: &str, name: &str) -> Result<Config> {
        let entry_point = self.look_up(group, name)?;
        log::debug!("looked up '{name}': {entry_point:?}");

        let loader = entry_point
            .wants_loader()
            .then(|| Arc::clone(&self.loader));

        let dependency = match entry_point.dependency()? {
            Some(parent) => {
                log::debug!("'{name}' depends on '{parent}'");
                let mut config = self.resolve(group, parent)?;
                if let Some(loader) = &loader {
                    config.set_loader(Arc::clone(loader));
                }
                Some((parent.to_string(), config))
            }
            None => None,
        };

        let produced = entry_point.invoke(Injections::new(dependency, loader))?;
        log::debug!("invoked factory of '{name}'");

        let config = produced
            .downcast::<Config>()
            .map_err(|_| Error::WrongConfigType {
                name: name.to_string(),
                found: entry_point.returns().to_string(),
            })?;
        log::debug!("'{name}' validated with {} key(s)", config.len());
        Ok(*config)
    }

    fn look_up(&self, group: &str, name: &str) -> Result<EntryPoint> {
        let mut matches = list_entry_points(&self.registry, group, Some(name))?;
        match matches.len() {
            0 => Err(Error::EnvironmentIsMissing {
                group: group.to_string(),
                name: name.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(Error::DuplicateEntryPoint {
                group: group.to_string(),
                name: name.to_string(),
                count,
            }),
        }
    }
}
