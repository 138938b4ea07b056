//! Action registry initialization and management

use crate::action::Action;
use crate::providers::{EncryptProvider, MaskProvider, TokenizeProvider};
use fieldguard_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Free-form provider configuration
pub type ActionConfig = serde_json::Map<String, serde_json::Value>;

/// Factory for actions of one named kind
pub trait ActionProvider: Send + Sync {
    /// Registry key; normalized to lowercase on registration
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> String {
        format!("Custom action: {}", self.name())
    }

    /// Keys `create_action` understands. An empty list disables key checking.
    fn supported_config_keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Build a configured action
    fn create_action(&self, config: &ActionConfig) -> Result<Box<dyn Action>>;
}

/// Registry for looking up action providers by name
pub struct ActionRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ActionProvider>>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the built-in mask, tokenize and encrypt providers
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.providers.write().extend(
            builtin_providers()
                .into_iter()
                .map(|p| (p.name().to_string(), p)),
        );
        registry
    }

    /// Process-wide registry, initialized with the built-ins on first use
    pub fn global() -> &'static ActionRegistry {
        static GLOBAL: OnceLock<ActionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            info!("Initializing global action registry");
            ActionRegistry::with_builtins()
        })
    }

    /// Register a provider. Fails on an empty or already registered name.
    pub fn register(&self, provider: Arc<dyn ActionProvider>) -> Result<()> {
        let name = normalize_name(provider.name())?;
        let mut providers = self.providers.write();

        if providers.contains_key(&name) {
            return Err(Error::validation(format!(
                "action '{}' is already registered",
                name
            )));
        }

        info!(action = %name, "Registered action provider");
        providers.insert(name, provider);
        Ok(())
    }

    /// Replace every provider at once. On error the registry is unchanged.
    pub fn reload(&self, providers: Vec<Arc<dyn ActionProvider>>) -> Result<()> {
        let mut fresh = HashMap::with_capacity(providers.len());
        for provider in providers {
            let name = normalize_name(provider.name())?;
            if fresh.insert(name.clone(), provider).is_some() {
                return Err(Error::validation(format!(
                    "action '{}' listed more than once",
                    name
                )));
            }
        }

        info!(count = fresh.len(), "Reloaded action providers");
        *self.providers.write() = fresh;
        Ok(())
    }

    /// Create an action by provider name
    pub fn create_action(&self, name: &str, config: &ActionConfig) -> Result<Box<dyn Action>> {
        let key = name.trim().to_lowercase();

        // Release the lock before running the factory
        let provider = self.providers.read().get(&key).cloned();
        let provider = provider.ok_or_else(|| Error::ActionNotFound {
            name: name.to_string(),
            available: self.available_action_names(),
        })?;

        let supported = provider.supported_config_keys();
        if !supported.is_empty() {
            if let Some(unknown) = config.keys().find(|k| !supported.contains(&k.as_str())) {
                return Err(Error::invalid_config(
                    &key,
                    format!(
                        "unsupported key '{}' (supported: {})",
                        unknown,
                        supported.join(", ")
                    ),
                ));
            }
        }

        debug!(action = %key, "Creating action");
        provider.create_action(config).map_err(|e| match e {
            Error::InvalidConfig { .. } => e,
            other => Error::invalid_config(&key, other.to_string()),
        })
    }

    /// Registered names, sorted
    pub fn available_action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a provider is registered under `name`
    pub fn is_available(&self, name: &str) -> bool {
        self.providers
            .read()
            .contains_key(&name.trim().to_lowercase())
    }

    /// Look up a provider
    pub fn provider(&self, name: &str) -> Option<Arc<dyn ActionProvider>> {
        self.providers
            .read()
            .get(&name.trim().to_lowercase())
            .cloned()
    }

    /// Name → description for every provider
    pub fn provider_info(&self) -> BTreeMap<String, String> {
        self.providers
            .read()
            .iter()
            .map(|(name, p)| (name.clone(), p.description()))
            .collect()
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// Whether no providers are registered
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.available_action_names())
            .finish()
    }
}

/// The providers every registry built with [`ActionRegistry::with_builtins`] holds
pub fn builtin_providers() -> Vec<Arc<dyn ActionProvider>> {
    vec![
        Arc::new(MaskProvider),
        Arc::new(TokenizeProvider),
        Arc::new(EncryptProvider),
    ]
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(Error::validation("action name must not be empty"));
    }
    Ok(name)
}
