//! Source loading for dotted import paths and config files.
//!
//! A [`Config`](crate::Config) never touches the filesystem itself. It asks its
//! [`SourceLoader`] to turn a dotted import name or a file path into a value,
//! then copies the upper-case keys of that value into itself.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extensions tried, in order, when resolving a module of a dotted path.
pub const MODULE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Maps import names and file paths to config source values.
///
/// Implementations decide where sources live. The returned value is usually a
/// JSON object; anything else carries no upper-case attributes and merges
/// nothing.
pub trait SourceLoader: fmt::Debug + Send + Sync {
    /// Directory that relative paths are resolved against.
    fn root(&self) -> &Path;

    /// Resolves a dotted import name such as `settings.production.Database`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportString`] when the module or the attribute
    /// cannot be found, or the module source does not parse.
    fn import_object(&self, import_name: &str) -> Result<Value>;

    /// Reads and parses a config source file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be opened and
    /// [`Error::ImportString`] when it does not parse.
    fn load_file(&self, path: &Path) -> Result<Value>;
}

/// Loads sources from YAML and JSON files below a root directory.
///
/// A dotted path `a.b.C` names the module file `a/b.yaml` (or `.yml`, `.json`)
/// and its top-level key `C`. When no such attribute exists, the whole name is
/// tried as a module, so `a.b` may also load `a/b.yaml` as a whole.
///
/// # Examples
///
/// ```no_run
/// use settei::config::{FsLoader, SourceLoader};
///
/// let loader = FsLoader::new("/etc/myapp");
/// let database = loader.import_object("settings.Database").unwrap();
/// println!("{database}");
/// ```
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a loader rooted at the process working directory.
    #[must_use]
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn find_module(&self, module_name: &str) -> Option<PathBuf> {
        if module_name.split('.').any(str::is_empty) {
            return None;
        }
        let base = module_name
            .split('.')
            .fold(self.root.clone(), |path, segment| path.join(segment));
        MODULE_EXTENSIONS
            .iter()
            .map(|ext| base.with_extension(ext))
            .find(|candidate| candidate.is_file())
    }
    fn no_module(&self, import_name: &str, module_name: &str) -> Error {
        Error::import(
            import_name,
            format!(
                "no module named '{module_name}' under {}",
                self.root.display()
            ),
        )
    }

    fn read_module(&self, import_name: &str, module_path: &Path) -> Result<Value> {
        log::debug!(
            "importing '{import_name}' from {}",
            module_path.display()
        );
        fs::read_to_string(module_path)
            .map_err(|e| Error::import(import_name, e))
            .and_then(|contents| parse_source(module_path, &contents))
    }

    fn import_attribute(&self, import_name: &str, module_name: &str, attr: &str) -> Result<Value> {
        let module_path = self
            .find_module(module_name)
            .ok_or_else(|| self.no_module(import_name, module_name))?;
        let module = self.read_module(import_name, &module_path)?;
        module.get(attr).cloned().ok_or_else(|| {
            Error::import(
                import_name,
                format!("module '{module_name}' has no attribute '{attr}'"),
            )
        })
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl SourceLoader for FsLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn import_object(&self, import_name: &str) -> Result<Value> {
        let attribute_lookup = match import_name.rsplit_once('.') {
            Some((module_name, attr)) => self.import_attribute(import_name, module_name, attr),
            None => Err(self.no_module(import_name, import_name)),
        };

        // `a.b` may also name the module file `a/b.yaml` itself
        attribute_lookup.or_else(|err| match self.find_module(import_name) {
            Some(module_path) => self.read_module(import_name, &module_path),
            None => Err(err),
        })
    }

    fn load_file(&self, path: &Path) -> Result<Value> {
        let path = self.resolve(path);
        let contents = fs::read_to_string(&path)?;
        parse_source(&path, &contents)
    }
}

/// Parses file contents by extension: `.json` as JSON, anything else as YAML.
///
/// Blank files parse as `null`.
///
/// # Errors
///
/// Returns [`Error::ImportString`] naming the file when parsing fails.
pub fn parse_source(path: &Path, contents: &str) -> Result<Value> {
    if contents.trim().is_empty() {
        return Ok(Value::Null);
    }

    let import_name = path.display().to_string();
    match path.extension().and_then(OsStr::to_str) {
        Some("json") => serde_json::from_str(contents).map_err(|e| Error::import(import_name, e)),
        _ => serde_yaml::from_str(contents).map_err(|e| Error::import(import_name, e)),
    }
}

/// An in-memory loader keyed by import name and file path.
///
/// Useful for embedding sources in a binary and for tests.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use settei::config::{MemoryLoader, SourceLoader};
///
/// let loader = MemoryLoader::new().with_object("settings.Base", json!({"DEBUG": false}));
/// assert_eq!(loader.import_object("settings.Base").unwrap()["DEBUG"], json!(false));
/// assert!(loader.import_object("settings.Other").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    root: PathBuf,
    objects: BTreeMap<String, Value>,
    files: BTreeMap<PathBuf, Value>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object reachable by dotted import name.
    #[must_use]
    pub fn with_object(mut self, import_name: impl Into<String>, value: Value) -> Self {
        self.objects.insert(import_name.into(), value);
        self
    }

    /// Adds a file reachable by path.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, value: Value) -> Self {
        self.files.insert(path.into(), value);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn root(&self) -> &Path {
        &self.root
    }

    fn import_object(&self, import_name: &str) -> Result<Value> {
        self.objects
            .get(import_name)
            .cloned()
            .ok_or_else(|| Error::import(import_name, "no such object"))
    }

    fn load_file(&self, path: &Path) -> Result<Value> {
        self.files.get(path).cloned().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }
}
