//! Service registry.
//!
//! # Responsibilities
//! - Map logical service names to backend base URLs
//! - Built once at startup, read-only for the process lifetime
//!
//! # Design Decisions
//! - No runtime mutation API; adding a service requires a restart
//! - Unknown service at build time is fatal, not a request-time error

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// Error raised while building the registry from configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate service name '{0}'")]
    Duplicate(String),

    #[error("service '{name}' has unparseable base_url: {reason}")]
    InvalidBaseUrl { name: String, reason: String },
}

/// Immutable mapping from logical service name to base URL.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Url>,
}

impl ServiceRegistry {
    /// Build the registry from configuration entries.
    pub fn from_config(services: &[ServiceConfig]) -> Result<Self, RegistryError> {
        let mut map = HashMap::with_capacity(services.len());
        for service in services {
            let url = Url::parse(&service.base_url).map_err(|e| RegistryError::InvalidBaseUrl {
                name: service.name.clone(),
                reason: e.to_string(),
            })?;
            if map.insert(service.name.clone(), url).is_some() {
                return Err(RegistryError::Duplicate(service.name.clone()));
            }
        }
        Ok(Self { services: map })
    }

    /// Resolve a logical service name to its base URL.
    pub fn resolve(&self, name: &str) -> Option<&Url> {
        self.services.get(name)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True when no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, base_url: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    #[test]
    fn resolves_registered_service() {
        let registry = ServiceRegistry::from_config(&[
            entry("docparser", "http://127.0.0.1:9001"),
            entry("normcontrol2", "http://127.0.0.1:9002"),
        ])
        .unwrap();

        let url = registry.resolve("normcontrol2").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9002/");
        assert!(registry.resolve("ragchat").is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let result = ServiceRegistry::from_config(&[
            entry("calc", "http://127.0.0.1:9003"),
            entry("calc", "http://127.0.0.1:9004"),
        ]);
        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "calc"));
    }

    #[test]
    fn bad_url_rejected() {
        let result = ServiceRegistry::from_config(&[entry("calc", "::nope::")]);
        assert!(matches!(result, Err(RegistryError::InvalidBaseUrl { .. })));
    }
}
