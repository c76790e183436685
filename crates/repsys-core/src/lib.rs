//! repsys core: message model, store contract, and reclassification rules.
//!
//! This crate defines the message record and the report-system contract the
//! relay consumes. It carries no runtime or transport dependencies so the
//! rules can be exercised against any store implementation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Store failures
//! surface as `RepSysError` so the long-running relay loops never crash on a
//! misbehaving report system.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod memory;
pub mod message;
pub mod reclassify;
pub mod status;
pub mod store;
pub mod types;

/// Shared result type.
pub use error::{RepSysError, Result};
pub use message::Message;
pub use status::{ApiResult, ApiState};
pub use store::{MessageMetadata, MessageStore};
pub use types::{ClassMask, MsgClass, MsgHandle, MsgState, Timestamp};

/// Component number of the safety subsystem, the only origin the relay reclassifies.
pub const SAFETY_COMPONENT: u32 = 100;
