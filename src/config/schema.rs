//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend service definitions (logical name to base URL).
    pub services: Vec<ServiceConfig>,

    /// Route definitions mapping path prefixes to services.
    pub routes: Vec<RouteConfig>,

    /// Path prefixes exempt from authentication.
    pub public_paths: Vec<PublicPathConfig>,

    /// Credential verification settings.
    pub auth: AuthConfig,

    /// Timeout ceilings per route class.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for unreachable backends.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A backend service reachable from the gateway.
///
/// The registry is built from these entries once at startup and is
/// read-only afterwards. Adding a service requires a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Unique logical service name (referenced by routes).
    pub name: String,

    /// Base URL of the service (scheme, host, port).
    pub base_url: String,
}

/// Route configuration mapping a path prefix to a service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix to match (e.g., "/api/normcontrol2").
    pub prefix: String,

    /// Logical service name to forward to. Must exist in `services`.
    pub service: String,

    /// Leading path segments removed before forwarding
    /// (e.g., "/api"). Removal is structural, on whole segments.
    #[serde(default)]
    pub strip_prefix: Option<String>,

    /// Timeout class for requests matched by this route.
    #[serde(default)]
    pub timeout_class: TimeoutClass,
}

/// Timeout class assigned to a route.
///
/// Status endpoints get a short ceiling, document uploads and other
/// long-running processing get a long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutClass {
    /// Health and status probes.
    Status,
    /// Ordinary API traffic.
    #[default]
    Standard,
    /// Uploads and long-running processing endpoints.
    Upload,
}

/// How a public path entry is matched against the normalized request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicMatchMode {
    /// The whole normalized path must equal the entry.
    #[default]
    Exact,
    /// The entry's segments must be a leading segment run of the path.
    Prefix,
}

/// A path exempt from authentication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicPathConfig {
    /// Path or path prefix (e.g., "/api/normcontrol2/status").
    pub path: String,

    /// Match mode. Defaults to exact; prefix exemptions must be opted into.
    #[serde(default)]
    pub mode: PublicMatchMode,
}

/// Credential verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to verify bearer tokens.
    pub jwt_secret: String,

    /// Expected token issuer, if any.
    pub issuer: Option<String>,

    /// Expected token audience, if any.
    pub audience: Option<String>,

    /// Clock-skew tolerance for expiry checks, in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }
}

/// Timeout ceilings for outbound calls, per route class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request ceiling for status-class routes in seconds.
    pub status_secs: u64,

    /// Request ceiling for standard-class routes in seconds.
    pub standard_secs: u64,

    /// Request ceiling for upload-class routes in seconds.
    pub upload_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            status_secs: 5,
            standard_secs: 30,
            upload_secs: 300,
        }
    }
}

impl TimeoutConfig {
    /// Request timeout for the given route class.
    pub fn for_class(&self, class: TimeoutClass) -> std::time::Duration {
        let secs = match class {
            TimeoutClass::Status => self.status_secs,
            TimeoutClass::Standard => self.standard_secs,
            TimeoutClass::Upload => self.upload_secs,
        };
        std::time::Duration::from_secs(secs)
    }
}

/// Retry configuration.
///
/// Retries apply only to connection-level unreachability. Timeouts and
/// malformed responses are never retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Total attempt ceiling per request (first try included).
    pub max_attempts: u32,

    /// Base delay for backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Largest request body, in bytes, buffered for replay across
    /// attempts. Larger bodies are streamed through in a single attempt.
    pub max_replay_body_bytes: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            max_replay_body_bytes: 256 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
