//! Shared error type across repsys crates.

use thiserror::Error;

use crate::status::ApiState;

/// Stable error codes, used as metric labels and in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The report system answered with a non-Ok status.
    Store,
    /// A class value outside the known single-bit classes.
    UnknownClass,
    /// A state value outside the known message states.
    UnknownState,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Lifecycle misuse (e.g. starting twice).
    Lifecycle,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Store => "STORE",
            ErrorCode::UnknownClass => "UNKNOWN_CLASS",
            ErrorCode::UnknownState => "UNKNOWN_STATE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Lifecycle => "LIFECYCLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RepSysError>;

/// Unified error type used by core and relay.
#[derive(Debug, Error)]
pub enum RepSysError {
    #[error("store call `{op}` failed: {state}")]
    Store { op: &'static str, state: ApiState },
    #[error("unknown message class bits 0x{0:08X}")]
    UnknownClass(u32),
    #[error("unknown message state {0}")]
    UnknownState(u32),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("processor already started")]
    AlreadyStarted,
    #[error("internal: {0}")]
    Internal(String),
}

impl RepSysError {
    /// Wrap a non-Ok store status, naming the call that produced it.
    pub fn store(op: &'static str, state: ApiState) -> Self {
        RepSysError::Store { op, state }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RepSysError::Store { .. } => ErrorCode::Store,
            RepSysError::UnknownClass(_) => ErrorCode::UnknownClass,
            RepSysError::UnknownState(_) => ErrorCode::UnknownState,
            RepSysError::Config(_) => ErrorCode::Config,
            RepSysError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            RepSysError::AlreadyStarted => ErrorCode::Lifecycle,
            RepSysError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Name of the store call that failed, if any.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            RepSysError::Store { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// The store status behind this error, if it came from a store call.
    pub fn api_state(&self) -> Option<ApiState> {
        match self {
            RepSysError::Store { state, .. } => Some(*state),
            _ => None,
        }
    }
}
