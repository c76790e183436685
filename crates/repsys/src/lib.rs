//! Top-level facade crate for the repsys relay.
//!
//! Re-exports the message model and the relay runtime so users can depend on a single crate.

pub mod core {
    pub use repsys_core::*;
}

pub mod relay {
    pub use repsys_relay::*;
}
