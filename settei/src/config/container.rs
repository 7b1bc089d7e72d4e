//! The mutable key/value container that environment factories build.

use crate::config::loader::{FsLoader, SourceLoader};
use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::io;
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;

/// Returns true when `key` has at least one cased character and no lower-case ones.
///
/// Only keys passing this check are pulled in by the `from_*` loaders.
///
/// # Examples
///
/// ```
/// use settei::config::is_upper_key;
///
/// assert!(is_upper_key("DATABASE_URL"));
/// assert!(is_upper_key("V2"));
/// assert!(!is_upper_key("Debug"));
/// assert!(!is_upper_key("__"));
/// ```
#[must_use]
pub fn is_upper_key(key: &str) -> bool {
    key.chars().any(char::is_uppercase) && !key.chars().any(char::is_lowercase)
}

/// An ordered mapping of config keys to values.
///
/// Factories create one, fill it through [`update`](Self::update),
/// [`insert`](Self::insert) and the `from_*` loaders, and return it. Two
/// configs are equal when their key/value sets are equal; the attached
/// [`SourceLoader`] plays no part in equality.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use settei::Config;
///
/// let mut config = Config::new();
/// config.update([("QUESTION", json!("six by nine"))]);
/// config.insert("ANSWER", 42);
///
/// assert_eq!(config["ANSWER"], json!(42));
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Clone)]
pub struct Config {
    values: BTreeMap<String, Value>,
    loader: Arc<dyn SourceLoader>,
}

#[allow(clippy::wrong_self_convention)]
impl Config {
    /// Creates an empty config that loads sources relative to the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_loader(Arc::new(FsLoader::current_dir()))
    }

    /// Creates an empty config that loads sources through `loader`.
    #[must_use]
    pub fn with_loader(loader: Arc<dyn SourceLoader>) -> Self {
        Self {
            values: BTreeMap::new(),
            loader,
        }
    }

    /// The loader used by [`from_object`](Self::from_object) and [`from_file`](Self::from_file).
    #[must_use]
    pub fn loader(&self) -> &Arc<dyn SourceLoader> {
        &self.loader
    }

    /// Replaces the loader, keeping every value.
    pub fn set_loader(&mut self, loader: Arc<dyn SourceLoader>) {
        self.loader = loader;
    }

    /// Merges every pair from `items`, overwriting existing keys.
    pub fn update<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(items.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Sets a single key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the config holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over key/value pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.values.keys()
    }

    /// Merges the upper-case keys of `items`, ignoring the rest.
    ///
    /// Returns how many keys were merged.
    pub fn from_mapping<I, K, V>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut merged = 0;
        for (key, value) in items {
            let key = key.into();
            if is_upper_key(&key) {
                log::trace!("merging config key {key}");
                self.values.insert(key, value.into());
                merged += 1;
            }
        }
        merged
    }

    /// Copies the upper-case attributes of an object into the config.
    ///
    /// `object` is serialized with serde; its upper-case fields (use
    /// `#[serde(rename_all = "SCREAMING_SNAKE_CASE")]` on plain structs) are
    /// merged. An object that serializes to a string is taken as a dotted
    /// import path and resolved through the config's [`SourceLoader`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportString`] when an import path cannot be resolved
    /// and [`Error::Serialization`] when `object` cannot be serialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Serialize;
    /// use settei::Config;
    ///
    /// #[derive(Serialize)]
    /// #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    /// struct Defaults {
    ///     debug: bool,
    ///     answer: u32,
    /// }
    ///
    /// let mut config = Config::new();
    /// config.from_object(&Defaults { debug: true, answer: 43 }).unwrap();
    /// assert_eq!(config["ANSWER"], 43);
    /// ```
    pub fn from_object<T>(&mut self, object: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(object)? {
            Value::String(import_name) => {
                let imported = self.loader.import_object(&import_name)?;
                self.merge_source(&import_name, imported);
            }
            value => self.merge_source("object", value),
        }
        Ok(())
    }

    /// Loads a config source file and merges its upper-case keys.
    ///
    /// Relative paths resolve against the loader's root. With `silent`, a
    /// missing file returns `Ok(false)` instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be opened and
    /// [`Error::ImportString`] when it does not parse.
    pub fn from_file(&mut self, path: impl AsRef<Path>, silent: bool) -> Result<bool> {
        let path = path.as_ref();
        match self.loader.load_file(path) {
            Ok(value) => {
                self.merge_source(&path.display().to_string(), value);
                Ok(true)
            }
            Err(Error::Io(e)) if silent && e.kind() == io::ErrorKind::NotFound => {
                log::debug!("config file {} not found, skipping", path.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Loads the config file named by the environment variable `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigPathUnset`] when the variable is unset or empty
    /// (unless `silent`), otherwise the errors of [`from_file`](Self::from_file).
    pub fn from_envvar(&mut self, variable: &str, silent: bool) -> Result<bool> {
        let path = match env::var(variable) {
            Ok(path) if !path.is_empty() => path,
            _ if silent => return Ok(false),
            _ => {
                return Err(Error::ConfigPathUnset {
                    variable: variable.to_string(),
                })
            }
        };
        self.from_file(path, silent)
    }

    /// Collects the keys starting with `prefix`.
    ///
    /// With `trim_namespace` the prefix is cut from the returned keys, with
    /// `lowercase` they are lower-cased.
    ///
    /// # Examples
    ///
    /// ```
    /// use settei::Config;
    ///
    /// let mut config = Config::new();
    /// config.insert("DB_HOST", "localhost");
    /// config.insert("DB_PORT", 5432);
    /// config.insert("DEBUG", true);
    ///
    /// let db = config.get_namespace("DB_", true, true);
    /// assert_eq!(db.len(), 2);
    /// assert_eq!(db["port"], 5432);
    /// ```
    #[must_use]
    pub fn get_namespace(
        &self,
        prefix: &str,
        lowercase: bool,
        trim_namespace: bool,
    ) -> BTreeMap<String, Value> {
        self.values
            .iter()
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(prefix)?;
                let key = if trim_namespace { rest } else { key.as_str() };
                let key = if lowercase {
                    key.to_lowercase()
                } else {
                    key.to_string()
                };
                Some((key, value.clone()))
            })
            .collect()
    }

    fn merge_source(&mut self, source: &str, value: Value) {
        match value {
            Value::Object(map) => {
                let merged = self.from_mapping(map);
                log::debug!("merged {merged} key(s) from {source}");
            }
            Value::Null => log::debug!("{source} is empty, nothing to merge"),
            other => log::warn!(
                "{source} is a {} rather than a mapping, nothing to merge",
                kind_of(&other)
            ),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("values", &self.values)
            .field("root", &self.loader.root())
            .finish()
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl Index<&str> for Config {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &str) -> &Value {
        &self.values[key]
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        config.update(iter);
        config
    }
}

impl IntoIterator for Config {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
