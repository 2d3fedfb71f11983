//! Document-platform API gateway.
//!
//! A single entry point in front of the platform's backend services
//! (document parsing, normative-control checking, retrieval-augmented
//! chat, calculation). The gateway maps inbound paths to services,
//! enforces deny-by-default authentication, forwards requests
//! faithfully, and degrades gracefully when a backend is restarting.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │                 API GATEWAY                   │
//!                   │                                               │
//!  Client Request   │  ┌──────┐   ┌─────────┐   ┌──────────────┐   │
//!  ─────────────────┼─▶│ http │──▶│ routing │──▶│  auth gate   │   │
//!                   │  │server│   │  table  │   │ (deny first) │   │
//!                   │  └──────┘   └─────────┘   └──────┬───────┘   │
//!                   │                                   │           │
//!                   │                                   ▼           │
//!  Client Response  │  ┌──────────┐   ┌────────────────────────┐   │     Backend
//!  ◀────────────────┼──│ response │◀──│ resilience ∘ forwarder │◀──┼──── Service
//!                   │  │ mapping  │   │  (retry unreachable)   │   │
//!                   │  └──────────┘   └────────────────────────┘   │
//!                   │                                               │
//!                   │  cross-cutting: config · registry ·           │
//!                   │  lifecycle · observability                    │
//!                   └──────────────────────────────────────────────┘
//! ```
//!
//! Pipeline stages run strictly in order per request: a path that does
//! not route is rejected before authentication, and a caller that is
//! not authenticated never reaches a backend.

// Core subsystems
pub mod auth;
pub mod config;
pub mod http;
pub mod proxy;
pub mod registry;
pub mod routing;

// Traffic management
pub mod resilience;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
