//! CRIPT Client Core
//!
//! Client-side object model and synchronization layer for the CRIPT
//! scientific-data REST API (materials, processes, experiments and their
//! embedded sub-records).
//!
//! # Architecture
//!
//! - **Universal Node**: every record type is a `Node` interpreted through a
//!   declarative schema; primary nodes are addressable by URL once saved,
//!   secondary nodes are always embedded
//! - **Uniform references**: a reference is a live node, a remote URL, or a
//!   raw payload, normalized on assignment and dereferenced only on request
//! - **Explicit validation context**: vocabulary checks take a per-session
//!   `ValidationContext`; there is no global vocabulary cache
//! - **Gateway boundary**: all network traffic goes through the async
//!   `SyncGateway` trait
//!
//! # Modules
//!
//! - [`models`] - Node, schemas, registry, references, typed wrappers
//! - [`operations`] - add/remove child, lowering, applying remote state
//! - [`resolver`] - reference normalization and dereference
//! - [`validation`] - vocabulary, units and the key/value/unit validators
//! - [`behaviors`] - Serializable, Validatable and Printable capabilities
//! - [`gateway`] - SyncGateway trait and the reqwest HTTP gateway
//! - [`services`] - SyncService session operations

pub mod behaviors;
pub mod gateway;
pub mod models;
pub mod operations;
pub mod resolver;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use behaviors::*;
pub use gateway::{GatewayConfig, GatewayError, HttpGateway, SyncGateway};
pub use models::*;
pub use operations::ChildSelector;
pub use services::*;
pub use validation::{ValidationContext, ValidationError, Vocabulary};
