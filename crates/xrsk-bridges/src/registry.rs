//! Collector registry: name → constructor.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::collector::{Collector, DefiLlamaCollector};
use crate::config::UpstreamConfig;
use crate::types::{BridgeError, BridgeResult};

/// Builds a fresh collector instance.
pub type CollectorCtor = Arc<dyn Fn() -> BridgeResult<Arc<dyn Collector>> + Send + Sync>;

/// Registered collectors, ordered by name.
#[derive(Clone)]
pub struct CollectorRegistry {
    ctors: BTreeMap<String, CollectorCtor>,
}

impl CollectorRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            ctors: BTreeMap::new(),
        }
    }

    /// A registry holding the production upstream, configured with `config`.
    pub fn with_defaults(config: UpstreamConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(DefiLlamaCollector::NAME, move || {
            Ok(Arc::new(DefiLlamaCollector::new(config.clone())?) as Arc<dyn Collector>)
        });
        registry
    }

    /// Register a constructor, replacing any previous entry with that name.
    pub fn register<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> BridgeResult<Arc<dyn Collector>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.ctors.insert(name.clone(), Arc::new(ctor)).is_some() {
            tracing::debug!(%name, "replaced collector registration");
        }
    }

    /// Construct a new instance of the named collector.
    pub fn get(&self, name: &str) -> BridgeResult<Arc<dyn Collector>> {
        match self.ctors.get(name) {
            Some(ctor) => ctor(),
            None => Err(BridgeError::UnknownCollector {
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.ctors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::with_defaults(UpstreamConfig::default())
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("names", &self.names())
            .finish()
    }
}
