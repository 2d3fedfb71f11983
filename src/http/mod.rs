//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, wildcard capture)
//!     → request.rs (attach request id)
//!     → [routing decides service, auth gate decides access]
//!     → [forwarder issues the backend call]
//!     → response.rs (gateway rejections as structured JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use response::{ErrorBody, GatewayRejection};
pub use server::{AppState, GatewayServer, StartupError};
