//! Message classes, states, and small identity types.
//!
//! A concrete message carries exactly one class bit, so `MsgClass` is a closed
//! enum. Queries take a `ClassMask`, the OR of any number of classes.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

macro_rules! msg_classes {
    ($($name:ident = $bits:literal),+ $(,)?) => {
        /// Report-system message class (one bit per class).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum MsgClass {
            $($name,)+
        }

        impl MsgClass {
            /// All classes, lowest bit first.
            pub const ALL: [MsgClass; 32] = [$(MsgClass::$name,)+];

            pub fn bits(self) -> u32 {
                match self {
                    $(MsgClass::$name => $bits,)+
                }
            }

            /// Exactly one bit must be set.
            pub fn from_bits(bits: u32) -> Option<Self> {
                match bits {
                    $($bits => Some(MsgClass::$name),)+
                    _ => None,
                }
            }
        }
    };
}

msg_classes! {
    ErrorFatal = 0x0000_0001,
    Error = 0x0000_0002,
    ErrorMinor = 0x0000_0004,
    Warning = 0x0000_0008,
    Info = 0x0000_0010,
    ErrorApp = 0x0000_0020,
    Class7 = 0x0000_0040,
    Class8 = 0x0000_0080,
    Class9 = 0x0000_0100,
    Class10 = 0x0000_0200,
    Class11 = 0x0000_0400,
    Class12 = 0x0000_0800,
    Class13 = 0x0000_1000,
    Class14 = 0x0000_2000,
    Class15 = 0x0000_4000,
    Class16 = 0x0000_8000,
    Class17 = 0x0001_0000,
    Class18 = 0x0002_0000,
    Class19 = 0x0004_0000,
    Class20 = 0x0008_0000,
    Class21 = 0x0010_0000,
    Class22 = 0x0020_0000,
    Class23 = 0x0040_0000,
    Class24 = 0x0080_0000,
    Class25 = 0x0100_0000,
    Class26 = 0x0200_0000,
    Class27 = 0x0400_0000,
    Class28 = 0x0800_0000,
    Class29 = 0x1000_0000,
    Class30 = 0x2000_0000,
    Class31 = 0x4000_0000,
    Class32 = 0x8000_0000,
}

impl MsgClass {
    /// 1-based class number as shown by the report system (`Class15` -> 15).
    pub fn number(self) -> u32 {
        self.bits().trailing_zeros() + 1
    }
}

impl fmt::Display for MsgClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:X})", self, self.bits())
    }
}

/// OR of message classes, used for first/next/last queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassMask(u32);

impl ClassMask {
    pub const EMPTY: ClassMask = ClassMask(0);
    pub const ALL: ClassMask = ClassMask(0xFFFF_FFFF);
    /// Classes 1 to 12: everything raised before reclassification.
    pub const DEFAULT_RANGE: ClassMask = ClassMask(0x0000_0FFF);

    pub const fn from_bits(bits: u32) -> Self {
        ClassMask(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, class: MsgClass) -> bool {
        self.0 & class.bits() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<MsgClass> for ClassMask {
    fn from(class: MsgClass) -> Self {
        ClassMask(class.bits())
    }
}

impl FromIterator<MsgClass> for ClassMask {
    fn from_iter<I: IntoIterator<Item = MsgClass>>(iter: I) -> Self {
        iter.into_iter().fold(ClassMask::EMPTY, |m, c| m | c)
    }
}

impl BitOr for ClassMask {
    type Output = ClassMask;
    fn bitor(self, rhs: ClassMask) -> ClassMask {
        ClassMask(self.0 | rhs.0)
    }
}

impl BitOr<MsgClass> for ClassMask {
    type Output = ClassMask;
    fn bitor(self, rhs: MsgClass) -> ClassMask {
        ClassMask(self.0 | rhs.bits())
    }
}

impl BitOr for MsgClass {
    type Output = ClassMask;
    fn bitor(self, rhs: MsgClass) -> ClassMask {
        ClassMask(self.bits() | rhs.bits())
    }
}

impl fmt::Display for ClassMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Message state as tracked by the report system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MsgState {
    #[default]
    Undefined,
    /// History: inactive.
    InactiveMsg,
    /// History: reset.
    ResetMsg,
    /// History: acknowledged.
    QuitMsg,
    /// Active alarm waiting for reset.
    ToReset,
    /// Active alarm waiting for acknowledge.
    ToQuit,
    ToResetAndQuit,
    ToResetOrQuit,
}

impl MsgState {
    pub fn code(self) -> u32 {
        match self {
            MsgState::Undefined => 0,
            MsgState::InactiveMsg => 1,
            MsgState::ResetMsg => 2,
            MsgState::QuitMsg => 3,
            MsgState::ToReset => 4,
            MsgState::ToQuit => 5,
            MsgState::ToResetAndQuit => 6,
            MsgState::ToResetOrQuit => 7,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => MsgState::Undefined,
            1 => MsgState::InactiveMsg,
            2 => MsgState::ResetMsg,
            3 => MsgState::QuitMsg,
            4 => MsgState::ToReset,
            5 => MsgState::ToQuit,
            6 => MsgState::ToResetAndQuit,
            7 => MsgState::ToResetOrQuit,
            _ => return None,
        })
    }
}

/// Seconds + nanoseconds, as stamped by the report system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub sec: u32,
    pub nsec: u32,
}

impl Timestamp {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }
}

/// Opaque handle of one message occurrence in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgHandle(pub u32);

impl MsgHandle {
    /// Never issued by the store; the poller starts from here.
    pub const NONE: MsgHandle = MsgHandle(0);
}

impl fmt::Display for MsgHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
