//! Memo of resolved environments.
//!
//! The cache belongs to one [`Resolver`](super::Resolver). It remembers every
//! config resolved since the last [`clear`](ResolutionCache::clear) and the
//! chain of environments currently being resolved, which is how cycles are
//! caught. Entries memoized during a top-level call are journaled so a failed
//! call can drop them again.

use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Identifies one environment of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    group: String,
    name: String,
}

impl CacheKey {
    /// Creates a key for environment `name` in `group`.
    #[must_use]
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// The entry-point group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The environment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolved configs plus the environments still in flight.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    resolved: HashMap<CacheKey, Config>,
    in_flight: Vec<CacheKey>,
    journal: Vec<CacheKey>,
}

impl ResolutionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized config for `name` in `group`.
    #[must_use]
    pub fn get(&self, group: &str, name: &str) -> Option<&Config> {
        self.resolved.get(&CacheKey::new(group, name))
    }

    /// Number of memoized configs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Returns true when nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Forgets every memoized config.
    pub fn clear(&mut self) {
        self.resolved.clear();
        self.in_flight.clear();
        self.journal.clear();
    }

    /// Starts journaling the entries memoized from now on.
    pub(crate) fn begin(&mut self) {
        self.journal.clear();
    }

    /// Keeps every journaled entry.
    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Drops every entry memoized since [`begin`](Self::begin).
    pub(crate) fn rollback(&mut self) {
        for key in self.journal.drain(..) {
            self.resolved.remove(&key);
        }
        self.in_flight.clear();
    }

    /// Marks `key` as being resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DependencyCycle`] when `key` is already in flight.
    pub(crate) fn enter(&mut self, key: CacheKey) -> Result<()> {
        if self.in_flight.contains(&key) {
            let chain = self
                .in_flight
                .iter()
                .filter(|k| k.group == key.group)
                .map(|k| k.name.clone())
                .chain(std::iter::once(key.name.clone()))
                .collect();
            return Err(Error::DependencyCycle {
                group: key.group,
                chain,
            });
        }
        self.in_flight.push(key);
        Ok(())
    }

    /// Ends the resolution of `key`, memoizing `resolved` when it succeeded.
    pub(crate) fn leave(&mut self, key: &CacheKey, resolved: Option<Config>) {
        if let Some(pos) = self.in_flight.iter().rposition(|k| k == key) {
            self.in_flight.remove(pos);
        }
        if let Some(config) = resolved {
            if self.resolved.insert(key.clone(), config).is_none() {
                self.journal.push(key.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave_memoizes() {
        let mut cache = ResolutionCache::new();
        let key = CacheKey::new("application", "default");

        cache.enter(key.clone()).unwrap();
        assert!(cache.get("application", "default").is_none());

        cache.leave(&key, Some(Config::new()));
        assert!(cache.get("application", "default").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_resolution_not_memoized() {
        let mut cache = ResolutionCache::new();
        let key = CacheKey::new("application", "dev");

        cache.enter(key.clone()).unwrap();
        cache.leave(&key, None);

        assert!(cache.is_empty());
        // no longer in flight, so entering again is fine
        cache.enter(key).unwrap();
    }

    #[test]
    fn test_reentry_is_cycle() {
        let mut cache = ResolutionCache::new();
        cache.enter(CacheKey::new("application", "a")).unwrap();
        cache.enter(CacheKey::new("application", "b")).unwrap();

        match cache.enter(CacheKey::new("application", "a")) {
            Err(Error::DependencyCycle { group, chain }) => {
                assert_eq!(group, "application");
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_groups_are_separate() {
        let mut cache = ResolutionCache::new();
        cache.enter(CacheKey::new("one", "default")).unwrap();
        cache.enter(CacheKey::new("two", "default")).unwrap();
    }

    #[test]
    fn test_rollback_drops_journaled_entries() {
        let mut cache = ResolutionCache::new();
        let base = CacheKey::new("application", "default");
        cache.enter(base.clone()).unwrap();
        cache.leave(&base, Some(Config::new()));

        cache.begin();
        let dev = CacheKey::new("application", "dev");
        cache.enter(dev.clone()).unwrap();
        cache.leave(&dev, Some(Config::new()));
        cache.rollback();

        assert!(cache.get("application", "default").is_some());
        assert!(cache.get("application", "dev").is_none());
    }

    #[test]
    fn test_commit_keeps_entries() {
        let mut cache = ResolutionCache::new();
        cache.begin();
        let key = CacheKey::new("application", "default");
        cache.enter(key.clone()).unwrap();
        cache.leave(&key, Some(Config::new()));
        cache.commit();
        cache.rollback();

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = ResolutionCache::new();
        let key = CacheKey::new("application", "default");
        cache.enter(key.clone()).unwrap();
        cache.leave(&key, Some(Config::new()));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("application", "default").is_none());
    }
}
