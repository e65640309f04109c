//! # Hearth Core
//!
//! Core types for the Hearth server framework.
//!
//! This crate holds everything that does not touch the network:
//!
//! - [`Component`], [`ComponentDescriptor`], [`Export`] - the component model
//! - [`Registry`], [`DiscoveryUnit`], [`RegistrySnapshot`] - discovery and classification
//! - [`inject`] - the two-phase injection protocol
//! - [`validation`] - the declarative validation engine
//! - [`RequestContext`], [`Session`] - per-request state
//! - [`Handler`] - type-erased request handlers
//! - [`HearthError`], [`StartupError`] - error types and the wire envelope
//!
//! Startup runs one way: discovery → registry → injection → route
//! installation (in `hearth-server`). After injection the registry is a
//! frozen snapshot and is never written again.

#![doc(html_root_url = "https://docs.rs/hearth-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod component;
mod context;
mod error;
mod handler;
mod inject;
pub mod registry;
mod response;
pub mod validation;

pub use component::{Capability, Component, ComponentDescriptor, ComponentKind, Export, RouteDef};
pub use context::{ClaimStore, RequestContext, RequestId, Session};
pub use error::{
    ErrorCategory, ErrorEnvelope, HearthError, HearthResult, InjectionPhase, StartupError,
    INTERNAL_MESSAGE, INVALID_JSON_BODY, ROUTE_NOT_FOUND, UNKNOWN_ERROR, VALIDATION_FAILED,
};
pub use handler::Handler;
pub use inject::inject;
pub use registry::{
    DiscoveryReport, DiscoveryUnit, Registered, Registration, Registry, RegistrySnapshot,
    ServiceMap,
};
pub use response::{json_response, BoxFuture, HandlerResult, Response, ResponseExt};
pub use validation::{BodySchema, Outcome, ValidationRule};
