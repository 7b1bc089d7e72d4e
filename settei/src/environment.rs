//! Choosing which environment to resolve.
//!
//! An explicit name always wins. Without one, the name is read from a
//! selector variable, `CONFIG_ENVIRONMENT` unless configured otherwise.

use crate::error::{Error, Result};
use std::env;

/// Name of the base environment other environments usually build on.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Variable consulted when no environment name is passed.
pub const ENVIRONMENT_VARIABLE: &str = "CONFIG_ENVIRONMENT";

/// Picks the environment name for a resolution.
///
/// # Examples
///
/// ```
/// use settei::environment::EnvironmentSelector;
///
/// let selector = EnvironmentSelector::new("MYAPP_ENV");
/// assert_eq!(selector.select(Some("live")).unwrap(), "live");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSelector {
    variable: String,
}

impl EnvironmentSelector {
    /// Creates a selector reading `variable`.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    /// The variable this selector reads.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Returns `explicit` when it is non-empty, otherwise the variable's value.
    ///
    /// An explicit name is used as given. Surrounding whitespace is trimmed
    /// from the variable's value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvironmentNotSpecified`] when neither yields a name.
    pub fn select(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(name) = explicit.filter(|n| !n.is_empty()) {
            return Ok(name.to_string());
        }

        match env::var(&self.variable) {
            Ok(value) if !value.trim().is_empty() => {
                log::debug!("environment '{}' selected by {}", value.trim(), self.variable);
                Ok(value.trim().to_string())
            }
            _ => Err(Error::EnvironmentNotSpecified {
                variable: self.variable.clone(),
            }),
        }
    }
}

impl Default for EnvironmentSelector {
    fn default() -> Self {
        Self::new(ENVIRONMENT_VARIABLE)
    }
}

/// Resolves the environment name using [`ENVIRONMENT_VARIABLE`].
///
/// # Errors
///
/// Returns [`Error::EnvironmentNotSpecified`] when `explicit` is absent or
/// empty and the variable is unset or empty.
pub fn resolve_environment_name(explicit: Option<&str>) -> Result<String> {
    EnvironmentSelector::default().select(explicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_VARIABLE: &str = "SETTEI_TEST_SELECTOR";

    #[test]
    fn test_explicit_name_wins() {
        let selector = EnvironmentSelector::new(TEST_VARIABLE);
        assert_eq!(selector.select(Some("dev")).unwrap(), "dev");
    }

    #[test]
    #[serial]
    fn test_explicit_name_ignores_variable() {
        env::set_var(TEST_VARIABLE, "live");
        let selected = EnvironmentSelector::new(TEST_VARIABLE).select(Some("dev"));
        env::remove_var(TEST_VARIABLE);

        assert_eq!(selected.unwrap(), "dev");
    }

    #[test]
    #[serial]
    fn test_explicit_name_used_verbatim() {
        env::set_var(TEST_VARIABLE, "live");
        let selector = EnvironmentSelector::new(TEST_VARIABLE);
        let blank = selector.select(Some("  "));
        let padded = selector.select(Some("dev "));
        env::remove_var(TEST_VARIABLE);

        assert_eq!(blank.unwrap(), "  ");
        assert_eq!(padded.unwrap(), "dev ");
    }

    #[test]
    #[serial]
    fn test_falls_back_to_variable() {
        env::set_var(TEST_VARIABLE, " dev ");
        let selector = EnvironmentSelector::new(TEST_VARIABLE);
        let from_none = selector.select(None);
        let from_empty = selector.select(Some(""));
        env::remove_var(TEST_VARIABLE);

        assert_eq!(from_none.unwrap(), "dev");
        assert_eq!(from_empty.unwrap(), "dev");
    }

    #[test]
    #[serial]
    fn test_not_specified() {
        env::remove_var(TEST_VARIABLE);
        let selector = EnvironmentSelector::new(TEST_VARIABLE);

        match selector.select(None) {
            Err(Error::EnvironmentNotSpecified { variable }) => assert_eq!(variable, TEST_VARIABLE),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_empty_variable_is_not_specified() {
        env::set_var(TEST_VARIABLE, "");
        let selected = EnvironmentSelector::new(TEST_VARIABLE).select(None);
        env::remove_var(TEST_VARIABLE);

        assert!(matches!(selected, Err(Error::EnvironmentNotSpecified { .. })));
    }

    #[test]
    fn test_default_selector_variable() {
        assert_eq!(EnvironmentSelector::default().variable(), ENVIRONMENT_VARIABLE);
    }
}
