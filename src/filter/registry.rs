//! Name → factory registry used to instantiate filters from documents.

use super::node::AnyFilter;
use super::Filter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Creates fresh filter instances
pub trait FilterFactory: Send + Sync {
    fn create(&self) -> AnyFilter;
}

impl<F> FilterFactory for F
where
    F: Fn() -> AnyFilter + Send + Sync,
{
    fn create(&self) -> AnyFilter {
        self()
    }
}

/// What happens when a name is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverridePolicy {
    /// The newer registration wins
    #[default]
    Replace,
    /// The first registration wins
    KeepExisting,
}

/// Outcome of [`FilterManager::register_factory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    Replaced,
    Rejected,
}

/// A bundle of filters registered together
pub trait FilterLibrary {
    fn name(&self) -> &str;

    fn register_filters(&self, manager: &mut FilterManager);
}

/// Registry mapping filter class names to factories
#[derive(Default)]
pub struct FilterManager {
    factories: HashMap<String, Box<dyn FilterFactory>>,
    policy: OverridePolicy,
}

impl FilterManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: OverridePolicy) -> Self {
        Self {
            factories: HashMap::new(),
            policy,
        }
    }

    /// A registry holding every built-in filter
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        manager.load_library(&crate::filters::CoreFilters);
        manager
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: OverridePolicy) {
        self.policy = policy;
    }

    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl FilterFactory + 'static,
    ) -> Registration {
        let name = name.into();
        match (self.factories.contains_key(&name), self.policy) {
            (false, _) => {
                self.factories.insert(name, Box::new(factory));
                Registration::Inserted
            }
            (true, OverridePolicy::Replace) => {
                tracing::warn!("Filter '{}' registered twice, replacing previous factory", name);
                self.factories.insert(name, Box::new(factory));
                Registration::Replaced
            }
            (true, OverridePolicy::KeepExisting) => {
                tracing::warn!("Filter '{}' registered twice, keeping previous factory", name);
                Registration::Rejected
            }
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn load_library(&mut self, library: &dyn FilterLibrary) {
        let before = self.factories.len();
        library.register_filters(self);
        tracing::debug!(
            "Loaded filter library '{}' ({} new filters)",
            library.name(),
            self.factories.len().saturating_sub(before)
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn factory(&self, name: &str) -> Option<&dyn FilterFactory> {
        self.factories.get(name).map(|f| f.as_ref())
    }

    /// Instantiate the filter registered under `name`
    pub fn create_filter(&self, name: &str) -> Option<Filter> {
        self.factory(name).map(|f| Filter::new(f.create()))
    }

    /// Registered names in sorted order
    pub fn filter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered names whose filters belong to `group`, sorted
    pub fn filter_names_in_group(&self, group: &str) -> Vec<&str> {
        self.filter_names()
            .into_iter()
            .filter(|name| {
                self.factory(name)
                    .map(|f| f.create().group_name() == group)
                    .unwrap_or(false)
            })
            .collect()
    }
}

impl fmt::Debug for FilterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterManager")
            .field("filters", &self.filter_names())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{EmptyFilter, ReadImage, RgbToGray};

    #[test]
    fn test_builtins_registered() {
        let manager = FilterManager::with_builtins();
        for name in [
            "ReadImage",
            "RGBToGray",
            "EMMPMFilter",
            "MultiEmmpmFilter",
            "CreateDataArray",
            "RenameAttributeArray",
            "ArrayCalculator",
            "EmptyFilter",
        ] {
            assert!(manager.contains(name), "missing {}", name);
            let filter = manager.create_filter(name).unwrap();
            assert_eq!(filter.filter_name(), name);
        }
        assert!(manager.create_filter("NoSuchFilter").is_none());
    }

    #[test]
    fn test_replace_policy_last_wins() {
        let mut manager = FilterManager::new();
        assert_eq!(
            manager.register_factory("ReadImage", || AnyFilter::from(ReadImage::new())),
            Registration::Inserted
        );
        assert_eq!(
            manager.register_factory("ReadImage", || AnyFilter::from(RgbToGray::new())),
            Registration::Replaced
        );
        let filter = manager.create_filter("ReadImage").unwrap();
        assert_eq!(filter.filter_name(), "RGBToGray");
    }

    #[test]
    fn test_keep_existing_policy() {
        let mut manager = FilterManager::with_policy(OverridePolicy::KeepExisting);
        manager.register_factory("ReadImage", || AnyFilter::from(ReadImage::new()));
        assert_eq!(
            manager.register_factory("ReadImage", || AnyFilter::from(RgbToGray::new())),
            Registration::Rejected
        );
        let filter = manager.create_filter("ReadImage").unwrap();
        assert_eq!(filter.filter_name(), "ReadImage");
    }

    #[test]
    fn test_groups_and_names() {
        let manager = FilterManager::with_builtins();
        let names = manager.filter_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(manager.filter_names_in_group("IO").contains(&"ReadImage"));
        assert!(!manager.filter_names_in_group("IO").contains(&"RGBToGray"));
    }

    #[test]
    fn test_unregister() {
        let mut manager = FilterManager::new();
        manager.register_factory("EmptyFilter", || AnyFilter::from(EmptyFilter::default()));
        assert!(manager.unregister("EmptyFilter"));
        assert!(!manager.unregister("EmptyFilter"));
        assert!(manager.is_empty());
    }
}
