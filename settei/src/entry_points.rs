//! Registered environment factories and the registry they are discovered in.
//!
//! An [`EntryPoint`] is one named factory in a group. It declares the names
//! of its parameters up front; every parameter other than
//! [`LOADER_PARAMETER`] names another environment of the same group whose
//! resolved config is injected when the factory runs.
//!
//! # Examples
//!
//! ```
//! use settei::entry_points::{list_entry_points, EntryPoint, StaticRegistry};
//! use settei::Config;
//!
//! let registry = StaticRegistry::new()
//!     .with("application", EntryPoint::new("default", &[], |_| Ok(Config::new())))
//!     .with(
//!         "application",
//!         EntryPoint::new("dev", &["default"], |deps| {
//!             let mut config = deps.into_dependency().unwrap_or_default();
//!             config.insert("DEBUG", true);
//!             Ok(config)
//!         }),
//!     );
//!
//! let found = list_entry_points(&registry, "application", Some("dev")).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].parameters(), ["default"]);
//! ```

use crate::config::{Config, SourceLoader};
use crate::error::{Error, Result};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Parameter name that asks for the resolver's source loader.
///
/// It never counts as a dependency on another environment.
pub const LOADER_PARAMETER: &str = "loader";

type FactoryFn = dyn Fn(Injections) -> Result<Box<dyn Any>> + Send + Sync;

/// One registered environment factory.
#[derive(Clone)]
pub struct EntryPoint {
    name: String,
    parameters: Vec<String>,
    factory: Arc<FactoryFn>,
    returns: &'static str,
}

impl EntryPoint {
    /// Creates an entry point named `name` declaring `parameters`.
    ///
    /// The factory may return any type; resolution rejects anything that is
    /// not a [`Config`] with [`Error::WrongConfigType`].
    pub fn new<F, R>(name: impl Into<String>, parameters: &[&str], factory: F) -> Self
    where
        F: Fn(Injections) -> Result<R> + Send + Sync + 'static,
        R: Any,
    {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
            factory: Arc::new(move |injections: Injections| {
                factory(injections).map(|value| Box::new(value) as Box<dyn Any>)
            }),
            returns: std::any::type_name::<R>(),
        }
    }

    /// The environment name this entry point provides.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Type name of the factory's return value.
    #[must_use]
    pub fn returns(&self) -> &'static str {
        self.returns
    }

    /// Returns true when the factory declares [`LOADER_PARAMETER`].
    #[must_use]
    pub fn wants_loader(&self) -> bool {
        self.parameters.iter().any(|p| p == LOADER_PARAMETER)
    }

    /// The single environment this factory depends on, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MoreThanOneDependencyInjection`] when more than one
    /// parameter names another environment.
    pub fn dependency(&self) -> Result<Option<&str>> {
        let dependencies: Vec<&str> = self
            .parameters
            .iter()
            .map(String::as_str)
            .filter(|p| *p != LOADER_PARAMETER)
            .collect();

        match dependencies.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(Error::MoreThanOneDependencyInjection {
                name: self.name.clone(),
                parameters: dependencies.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Runs the factory.
    ///
    /// # Errors
    ///
    /// Propagates whatever the factory returns.
    pub fn invoke(&self, injections: Injections) -> Result<Box<dyn Any>> {
        (self.factory)(injections)
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Arguments handed to a factory when it runs.
#[derive(Debug, Default)]
pub struct Injections {
    dependency: Option<(String, Config)>,
    loader: Option<Arc<dyn SourceLoader>>,
}

impl Injections {
    /// Injections carrying nothing, as given to factories without parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Injections carrying the resolved config of environment `name`.
    #[must_use]
    pub fn with_dependency(name: impl Into<String>, config: Config) -> Self {
        Self {
            dependency: Some((name.into(), config)),
            loader: None,
        }
    }

    pub(crate) fn new(
        dependency: Option<(String, Config)>,
        loader: Option<Arc<dyn SourceLoader>>,
    ) -> Self {
        Self { dependency, loader }
    }

    /// Name of the injected environment.
    #[must_use]
    pub fn dependency_name(&self) -> Option<&str> {
        self.dependency.as_ref().map(|(name, _)| name.as_str())
    }

    /// The injected config, if it belongs to environment `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Config> {
        self.dependency
            .as_ref()
            .filter(|(injected, _)| injected == name)
            .map(|(_, config)| config)
    }

    /// Takes ownership of the injected config.
    #[must_use]
    pub fn into_dependency(self) -> Option<Config> {
        self.dependency.map(|(_, config)| config)
    }

    /// The resolver's loader, present when the factory declares [`LOADER_PARAMETER`].
    #[must_use]
    pub fn loader(&self) -> Option<&Arc<dyn SourceLoader>> {
        self.loader.as_ref()
    }

    /// A fresh config bound to the injected loader, or the default loader.
    #[must_use]
    pub fn new_config(&self) -> Config {
        match &self.loader {
            Some(loader) => Config::with_loader(Arc::clone(loader)),
            None => Config::new(),
        }
    }
}

/// A directory of named factories, grouped per application.
///
/// The registry may ignore `name` and return the whole group;
/// [`list_entry_points`] filters again.
pub trait Registry {
    /// Lists the entry points of `group`, optionally only those named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry itself cannot be read.
    fn iter_entries(&self, group: &str, name: Option<&str>) -> Result<Vec<EntryPoint>>;
}

impl<R: Registry + ?Sized> Registry for &R {
    fn iter_entries(&self, group: &str, name: Option<&str>) -> Result<Vec<EntryPoint>> {
        (**self).iter_entries(group, name)
    }
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn iter_entries(&self, group: &str, name: Option<&str>) -> Result<Vec<EntryPoint>> {
        (**self).iter_entries(group, name)
    }
}

/// An in-memory [`Registry`].
///
/// Registering the same name twice in a group is allowed; resolving that
/// name then fails with [`Error::DuplicateEntryPoint`].
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    groups: BTreeMap<String, Vec<EntryPoint>>,
}

impl StaticRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry point to `group`.
    pub fn register(&mut self, group: impl Into<String>, entry_point: EntryPoint) -> &mut Self {
        self.groups.entry(group.into()).or_default().push(entry_point);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, group: impl Into<String>, entry_point: EntryPoint) -> Self {
        self.register(group, entry_point);
        self
    }
}

impl Registry for StaticRegistry {
    fn iter_entries(&self, group: &str, name: Option<&str>) -> Result<Vec<EntryPoint>> {
        Ok(self
            .groups
            .get(group)
            .into_iter()
            .flatten()
            .filter(|ep| name.map_or(true, |n| ep.name() == n))
            .cloned()
            .collect())
    }
}

/// Lists the entry points registered in `group`, optionally only those named `name`.
///
/// # Errors
///
/// Propagates registry failures.
pub fn list_entry_points<R>(registry: &R, group: &str, name: Option<&str>) -> Result<Vec<EntryPoint>>
where
    R: Registry + ?Sized,
{
    let entries = registry.iter_entries(group, name)?;
    Ok(entries
        .into_iter()
        .filter(|ep| name.map_or(true, |n| ep.name() == n))
        .collect())
}
