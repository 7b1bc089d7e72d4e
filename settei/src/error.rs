//! Error types for the settei library.
//!
//! Every failure a resolution can end in is a distinct variant of [`Error`],
//! built with `thiserror`. Resolution is all-or-nothing: when any step fails
//! the caller gets one of these and no partial config.

use thiserror::Error;

/// Result type alias for operations that may fail with a settei error.
///
/// # Examples
///
/// ```
/// use settei::{Config, Result};
///
/// fn build() -> Result<Config> {
///     Ok(Config::new())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the settei library.
#[derive(Debug, Error)]
pub enum Error {
    /// No environment name was passed and the selector variable is unset or empty.
    #[error("environment not specified: pass a name or set {variable}")]
    EnvironmentNotSpecified {
        /// The variable that was consulted.
        variable: String,
    },

    /// No entry point in the group carries the requested name.
    #[error("environment '{name}' is missing from group '{group}'")]
    EnvironmentIsMissing {
        /// The entry-point group that was searched.
        group: String,
        /// The environment name that was requested.
        name: String,
    },

    /// More than one entry point in the group carries the requested name.
    #[error("environment '{name}' is registered {count} times in group '{group}'")]
    DuplicateEntryPoint {
        /// The entry-point group that was searched.
        group: String,
        /// The ambiguous environment name.
        name: String,
        /// How many entry points matched.
        count: usize,
    },

    /// A factory declares more than one dependency parameter.
    #[error(
        "environment '{name}' declares more than one dependency injection: {}",
        parameters.join(", ")
    )]
    MoreThanOneDependencyInjection {
        /// The environment whose factory is at fault.
        name: String,
        /// The dependency parameters it declares.
        parameters: Vec<String>,
    },

    /// A factory returned something other than a [`Config`](crate::Config).
    #[error("environment '{name}' returned {found}, expected a Config")]
    WrongConfigType {
        /// The environment whose factory is at fault.
        name: String,
        /// Type name of the value the factory returned.
        found: String,
    },

    /// A dotted import path or source file could not be loaded.
    #[error("import of '{import_name}' failed: {source}")]
    ImportString {
        /// The dotted path or file that was being imported.
        import_name: String,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A variable meant to hold a config file path is unset or empty.
    #[error("environment variable {variable} is not set, it should point to a config file")]
    ConfigPathUnset {
        /// The variable that was read.
        variable: String,
    },

    /// Dependencies between environments form a loop.
    #[error("dependency cycle in group '{group}': {}", chain.join(" -> "))]
    DependencyCycle {
        /// The entry-point group being resolved.
        group: String,
        /// Environment names in the order they were entered, ending with the repeat.
        chain: Vec<String>,
    },

    /// A live object could not be serialized into config values.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds an [`Error::ImportString`] from any error or message.
    ///
    /// # Examples
    ///
    /// ```
    /// use settei::Error;
    ///
    /// let err = Error::import("settings.Database", "no such object");
    /// assert!(err.is_import_error());
    /// assert!(err.to_string().contains("settings.Database"));
    /// ```
    #[must_use]
    pub fn import<E>(import_name: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::ImportString {
            import_name: import_name.into(),
            source: source.into(),
        }
    }

    /// Check if error indicates the requested environment does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use settei::Error;
    ///
    /// let err = Error::EnvironmentIsMissing {
    ///     group: "application".to_string(),
    ///     name: "staging".to_string(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EnvironmentIsMissing { .. })
    }

    /// Check if error came from importing a dotted path or source file.
    #[must_use]
    pub fn is_import_error(&self) -> bool {
        matches!(self, Self::ImportString { .. })
    }
}
