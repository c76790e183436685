//! Report-system status codes.
//!
//! Every store call answers with one of these. Only `Ok` is success; the core
//! otherwise treats all variants alike and just carries them into logs.

use std::fmt;

/// Result of a store call: the payload, or the non-Ok status the store reported.
pub type ApiResult<T> = std::result::Result<T, ApiState>;

macro_rules! api_states {
    ($($name:ident = $code:literal),+ $(,)?) => {
        /// Closed set of status values reported by the report-system API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ApiState {
            $($name,)+
        }

        impl ApiState {
            /// Vendor numeric code.
            pub fn code(self) -> u32 {
                match self {
                    $(ApiState::$name => $code,)+
                }
            }

            /// Reverse lookup of a vendor numeric code.
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some(ApiState::$name),)+
                    _ => None,
                }
            }

            /// Variant name, as printed in logs.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ApiState::$name => stringify!($name),)+
                }
            }
        }
    };
}

api_states! {
    Ok = 0x0,
    StringChopped = 0x8180_0001,
    InternalError = 0x8100_0000,
    NotOk = 0x8100_0001,
    ParamError = 0x8100_0002,
    ComNotRunning = 0x8100_0003,
    FuncNotFound = 0x8100_0004,
    NotImplementedYet = 0x8100_0005,
    DiskSpaceFull = 0x8100_0006,
    InitError = 0x8100_0007,
    InvalidHandle = 0x8100_0008,
    OutOfMemory = 0x8100_0009,
    RequestTimeout = 0x8100_000A,
    InvalidMultiByteChar = 0x8100_000B,
    StaRepAlreadyStarted = 0x8100_0100,
    StaRepInvalidDestPath = 0x8100_0101,
    StaRepNotInit = 0x8100_0102,
    StaRepMissing = 0x8100_0103,
    RepSysFunctionFailed = 0x8100_0201,
    RepSysInvalidWideChar = 0x8100_0202,
    RepSysInvalidMultiByteChar = 0x8100_0203,
    RepSysInvalidHandle = 0x8100_0204,
    RepSysUnknownParamKind = 0x8100_0205,
    RepSysBufferTooSmall = 0x8100_0206,
    RepSysNotImplemented = 0x8100_0207,
    RepSysIllegalArguments = 0x8100_0208,
    RepSysVarNotFound = 0x8100_0209,
    RepSysInvalidVarType = 0x8100_020A,
    RepSysProtVarAlreadySet = 0x8100_020B,
    RepSysProvNotSupported = 0x8100_020C,
    RepSysInvalidParamType = 0x8100_020E,
    DeviceCommandTemporarilyUnavailable = 0x8100_0401,
    DeviceCommandPermanentlyUnavailable = 0x8100_0402,
    VarNotFound = 0x8100_0501,
    VarNoChildren = 0x8100_0502,
    NoMoreNodes = 0x8100_0503,
    NoAccess = 0x8100_0504,
    PropNotFound = 0x8100_0505,
}

impl ApiState {
    pub fn is_ok(self) -> bool {
        self == ApiState::Ok
    }

    /// Turn a raw status into `Ok(())` / `Err(state)`.
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.as_str(), self.code())
    }
}
