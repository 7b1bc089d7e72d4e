//! Common test utilities for integration tests.
//!
//! Provides a registry of environment factories shaped like a real
//! application's, plus helpers for fixtures and environment variables.

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use settei::{
    Config, EntryPoint, Injections, Resolver, ResolverBuilder, Result, StaticRegistry,
    DEFAULT_ENVIRONMENT,
};

/// Group every fixture environment is registered under.
pub const GROUP: &str = "application";

/// Variable the from-envvar factories point at their source file.
pub const PATH_VARIABLE: &str = "SETTEI_TEST_PATH_TO_OBJECT";

/// Helper to get path to test fixtures.
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// Live counterpart of the `settings.SettingsHandler` fixture object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SettingsHandler {
    pub debug: bool,
    pub answer: u32,
}

impl SettingsHandler {
    pub const DEBUG: bool = true;
    pub const ANSWER: u32 = 43;

    pub fn new() -> Self {
        Self {
            debug: Self::DEBUG,
            answer: Self::ANSWER,
        }
    }
}

pub fn default(_: Injections) -> Result<Config> {
    let mut config = Config::new();
    config.update([(
        "QUESTION",
        "The Ultimate Question of Life, the Universe, and Everything",
    )]);
    Ok(config)
}

pub fn dev(deps: Injections) -> Result<Config> {
    let mut config = deps.into_dependency().unwrap_or_default();
    config.insert("ANSWER", 42);
    Ok(config)
}

fn settings_from_object(deps: Injections) -> Result<Config> {
    let mut config = deps.into_dependency().unwrap_or_default();
    config.from_object(&SettingsHandler::new())?;
    Ok(config)
}

fn import_into_default(deps: Injections, import_name: &str) -> Result<Config> {
    let mut config = deps.into_dependency().unwrap_or_default();
    config.from_object(import_name)?;
    Ok(config)
}

fn load_envvar_into_default(deps: Injections, source: &str) -> Result<Config> {
    env::set_var(PATH_VARIABLE, fixture_path(source));
    let mut config = deps.into_dependency().unwrap_or_default();
    config.from_envvar(PATH_VARIABLE, false)?;
    Ok(config)
}

/// Builds the registry every integration test resolves against.
pub fn fixture_registry() -> StaticRegistry {
    StaticRegistry::new()
        .with(GROUP, EntryPoint::new(DEFAULT_ENVIRONMENT, &[], default))
        .with(GROUP, EntryPoint::new("dev", &["default"], dev))
        .with(
            GROUP,
            EntryPoint::new("live", &["default", "dev"], |_| Ok(Config::new())),
        )
        .with(
            GROUP,
            EntryPoint::new("settings_from_object", &["default"], settings_from_object),
        )
        .with(
            GROUP,
            EntryPoint::new(
                "settings_from_object_with_path_to_object",
                &["loader", "default"],
                |deps| import_into_default(deps, "settings.SettingsHandler"),
            ),
        )
        .with(
            GROUP,
            EntryPoint::new(
                "settings_from_object_with_invalid_path_to_object",
                &["loader", "default"],
                |deps| import_into_default(deps, "settings.SuperSettingsHandler"),
            ),
        )
        .with(
            GROUP,
            EntryPoint::new("settings_from_envvar", &["default"], |deps| {
                load_envvar_into_default(deps, "sources/envvar_settings.yaml")
            }),
        )
        .with(
            GROUP,
            EntryPoint::new("settings_from_invalid_path", &["default"], |deps| {
                load_envvar_into_default(deps, "sources/missing.yaml")
            }),
        )
        .with(
            GROUP,
            EntryPoint::new("settings_from_unparseable_file", &["default"], |deps| {
                load_envvar_into_default(deps, "sources/broken.yaml")
            }),
        )
        .with(
            GROUP,
            EntryPoint::new("settings_without_config_content", &["default"], |deps| {
                load_envvar_into_default(deps, "sources/no_settings.yaml")
            }),
        )
        .with(
            GROUP,
            EntryPoint::new("wrong_config_object", &[], |_| {
                Ok(std::collections::HashMap::<String, String>::new())
            }),
        )
}

/// A resolver over [`fixture_registry`] whose loader is rooted at the fixtures.
pub fn fixture_resolver() -> Resolver<StaticRegistry> {
    ResolverBuilder::new()
        .with_root(fixture_path(""))
        .build(fixture_registry())
}

/// RAII guard for setting and restoring environment variables.
///
/// Tests using environment variables should be marked `#[serial]`.
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

impl EnvGuard {
    #[allow(dead_code)]
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    /// Create a guard that removes the env var.
    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}
