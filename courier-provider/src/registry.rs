//! Adapter constructor registry keyed by adapter name.

use std::sync::Arc;

use courier_common::provider::ProviderType;
use dashmap::DashMap;
use tracing::warn;

use crate::{Provider, ProviderError, ProviderFactory};

type Constructor =
    Arc<dyn Fn(&ProviderType) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// The default `ProviderFactory`: a map from adapter key to constructor.
///
/// Hosts register every adapter implementation they ship at startup;
/// provider rows then select one through their `adapter` field.
#[derive(Default, Clone)]
pub struct FactoryRegistry {
    constructors: Arc<DashMap<String, Constructor>>,
}

impl FactoryRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: Arc::new(DashMap::new()),
        }
    }

    /// Register a constructor under an adapter key, replacing any previous
    /// registration for that key.
    pub fn register<F>(&self, adapter: impl Into<String>, constructor: F)
    where
        F: Fn(&ProviderType) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(adapter.into(), Arc::new(constructor));
    }

    /// Number of registered adapter keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .constructors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();

        f.debug_struct("FactoryRegistry")
            .field("adapters", &keys)
            .finish()
    }
}

impl ProviderFactory for FactoryRegistry {
    fn create(&self, provider: &ProviderType) -> Option<Arc<dyn Provider>> {
        let Some(constructor) = self.constructors.get(&provider.adapter) else {
            warn!(
                provider = %provider.name,
                adapter = %provider.adapter,
                "No adapter registered for provider"
            );
            return None;
        };

        match constructor(provider) {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                warn!(
                    provider = %provider.name,
                    adapter = %provider.adapter,
                    error = %e,
                    "Adapter construction failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::BlackholeProvider;

    use super::*;

    fn provider(adapter: &str) -> ProviderType {
        ProviderType {
            id: 1,
            name: "test-provider".to_string(),
            priority: 1,
            can_process_mail: true,
            can_process_text: true,
            is_disabled: false,
            adapter: adapter.to_string(),
            parameters: Default::default(),
        }
    }

    #[test]
    fn known_adapters_are_constructed() {
        let registry = FactoryRegistry::new();
        registry.register(BlackholeProvider::ADAPTER, BlackholeProvider::constructor);

        assert_eq!(registry.len(), 1);
        assert!(registry.create(&provider("blackhole")).is_some());
    }

    #[test]
    fn unknown_adapters_return_none() {
        let registry = FactoryRegistry::new();
        assert!(registry.create(&provider("smtp")).is_none());
    }

    #[test]
    fn constructor_failures_return_none() {
        let registry = FactoryRegistry::new();
        registry.register("flaky", |_| {
            Err(ProviderError::Create("missing api key".to_string()))
        });

        assert!(registry.create(&provider("flaky")).is_none());
    }
}
