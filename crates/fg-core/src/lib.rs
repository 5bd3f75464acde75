//! # fg-core
//!
//! Core types for the Fedgate SAML service provider.
//!
//! This crate holds what every other crate in the workspace needs:
//!
//! - [`config`] - Service provider configuration and per-request settings
//! - [`error`] - The top-level error type
//! - [`event`] - Audit events and best-effort event delivery

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{AttributeMapping, IdpEntry, RelayStatePolicy, Setting, SpConfig};
pub use error::{Error, Result};
pub use event::{Event, EventEmitter, EventOutcome, EventSink, EventType, LoggingEventSink};
