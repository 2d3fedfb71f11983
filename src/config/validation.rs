//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing services)
//! - Validate URLs, prefixes, and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("route '{prefix}' references unknown service '{service}'")]
    UnknownService { prefix: String, service: String },

    #[error("duplicate service name '{0}'")]
    DuplicateService(String),

    #[error("service '{name}' has invalid base_url '{base_url}': {reason}")]
    InvalidBaseUrl {
        name: String,
        base_url: String,
        reason: String,
    },

    #[error("route prefix '{0}' must start with '/'")]
    BadRoutePrefix(String),

    #[error("strip_prefix '{0}' must start with '/'")]
    BadStripPrefix(String),

    #[error("public path '{0}' must start with '/'")]
    BadPublicPath(String),

    #[error("retries.max_attempts must be at least 1")]
    ZeroRetryCeiling,

    #[error("auth.jwt_secret must not be empty when routes are configured")]
    EmptyJwtSecret,
}

/// Render a list of validation errors as one line for error messages.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names: HashSet<&str> = HashSet::new();
    for service in &config.services {
        if !names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }
        match Url::parse(&service.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
                name: service.name.clone(),
                base_url: service.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidBaseUrl {
                name: service.name.clone(),
                base_url: service.base_url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    for route in &config.routes {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::BadRoutePrefix(route.prefix.clone()));
        }
        if let Some(strip) = &route.strip_prefix {
            if !strip.starts_with('/') {
                errors.push(ValidationError::BadStripPrefix(strip.clone()));
            }
        }
        if !names.contains(route.service.as_str()) {
            errors.push(ValidationError::UnknownService {
                prefix: route.prefix.clone(),
                service: route.service.clone(),
            });
        }
    }

    for public in &config.public_paths {
        if !public.path.starts_with('/') {
            errors.push(ValidationError::BadPublicPath(public.path.clone()));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroRetryCeiling);
    }

    if !config.routes.is_empty() && config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptyJwtSecret);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, ServiceConfig, TimeoutClass};

    fn base_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.auth.jwt_secret = "secret".into();
        config.services.push(ServiceConfig {
            name: "docparser".into(),
            base_url: "http://127.0.0.1:9001".into(),
        });
        config.routes.push(RouteConfig {
            prefix: "/api/docparser".into(),
            service: "docparser".into(),
            strip_prefix: Some("/api".into()),
            timeout_class: TimeoutClass::Standard,
        });
        config
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn unknown_service_is_fatal() {
        let mut config = base_config();
        config.routes.push(RouteConfig {
            prefix: "/api/calc".into(),
            service: "calc".into(),
            strip_prefix: None,
            timeout_class: TimeoutClass::Standard,
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownService { service, .. } if service == "calc")));
    }

    #[test]
    fn bad_base_url_reported() {
        let mut config = base_config();
        config.services.push(ServiceConfig {
            name: "broken".into(),
            base_url: "not a url".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBaseUrl { name, .. } if name == "broken")));
    }

    #[test]
    fn all_errors_collected() {
        let mut config = base_config();
        config.auth.jwt_secret.clear();
        config.routes.push(RouteConfig {
            prefix: "no-slash".into(),
            service: "missing".into(),
            strip_prefix: None,
            timeout_class: TimeoutClass::Standard,
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "expected several errors, got {errors:?}");
    }
}
