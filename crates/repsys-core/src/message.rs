//! Message record: one report-system message's identity and metadata.
//!
//! A logical message is keyed by `(comp_nr, msg_nr)`; `inst_nr` tells repeated
//! firings of the same key apart. Only class and state can change after
//! construction.

use std::fmt;

use bytes::BytesMut;

use crate::error::{RepSysError, Result};
use crate::status::ApiState;
use crate::store::MessageStore;
use crate::types::{MsgClass, MsgHandle, MsgState, Timestamp};

#[derive(Debug, Clone)]
pub struct Message {
    class: MsgClass,
    comp_nr: u32,
    inst_nr: u32,
    msg_nr: u32,
    timestamp: Timestamp,
    param_count: u32,
    state: MsgState,
    protocol_var: u32,
    handle: MsgHandle,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        class: MsgClass,
        comp_nr: u32,
        inst_nr: u32,
        msg_nr: u32,
        timestamp: Timestamp,
        param_count: u32,
        state: MsgState,
        protocol_var: u32,
        handle: MsgHandle,
    ) -> Self {
        Self {
            class,
            comp_nr,
            inst_nr,
            msg_nr,
            timestamp,
            param_count,
            state,
            protocol_var,
            handle,
        }
    }

    /// Resolve `handle` through the store (one metadata call).
    pub fn from_handle<S>(store: &S, handle: MsgHandle) -> Result<Self>
    where
        S: MessageStore + ?Sized,
    {
        let meta = store
            .metadata(handle)
            .map_err(|state| RepSysError::store("metadata", state))?;

        let class = MsgClass::from_bits(meta.class_bits)
            .ok_or(RepSysError::UnknownClass(meta.class_bits))?;
        let state = MsgState::from_code(meta.state_code)
            .ok_or(RepSysError::UnknownState(meta.state_code))?;

        Ok(Self {
            class,
            comp_nr: meta.comp_nr,
            inst_nr: meta.inst_nr,
            msg_nr: meta.msg_nr,
            timestamp: meta.timestamp,
            param_count: meta.param_count,
            state,
            protocol_var: meta.protocol_var,
            handle,
        })
    }

    pub fn class(&self) -> MsgClass {
        self.class
    }
    pub fn comp_nr(&self) -> u32 {
        self.comp_nr
    }
    pub fn inst_nr(&self) -> u32 {
        self.inst_nr
    }
    pub fn msg_nr(&self) -> u32 {
        self.msg_nr
    }
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
    pub fn param_count(&self) -> u32 {
        self.param_count
    }
    pub fn state(&self) -> MsgState {
        self.state
    }
    pub fn protocol_var(&self) -> u32 {
        self.protocol_var
    }
    pub fn handle(&self) -> MsgHandle {
        self.handle
    }

    /// Message key `(comp_nr, msg_nr)`.
    pub fn key(&self) -> (u32, u32) {
        (self.comp_nr, self.msg_nr)
    }

    pub fn set_class(&mut self, class: MsgClass) {
        self.class = class;
    }

    pub fn set_state(&mut self, state: MsgState) {
        self.state = state;
    }

    /// Formatted text of this message, at most `max_len - 1` bytes.
    pub fn content<S>(&self, store: &S, max_len: usize) -> Result<String>
    where
        S: MessageStore + ?Sized,
    {
        content(store, self.handle, max_len)
    }
}

// Timestamp is informational and takes no part in identity.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.comp_nr == other.comp_nr
            && self.inst_nr == other.inst_nr
            && self.msg_nr == other.msg_nr
            && self.param_count == other.param_count
            && self.state == other.state
            && self.protocol_var == other.protocol_var
            && self.handle == other.handle
    }
}

impl Eq for Message {}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tclass [0x{:X}]", self.class.bits())?;
        writeln!(f, "\tcompNr [{}]", self.comp_nr)?;
        writeln!(f, "\tinstNr [{}]", self.inst_nr)?;
        writeln!(f, "\tmsgNr [{}]", self.msg_nr)?;
        writeln!(f, "\tparamCount [{}]", self.param_count)?;
        writeln!(f, "\tstate [{:?}]", self.state)?;
        write!(f, "\tprotocolVar [{}]", self.protocol_var)
    }
}

/// Fetch the formatted text of `handle` into a zeroed buffer of `max_len` bytes.
///
/// The store NUL-terminates; everything from the first NUL on is dropped.
/// A chopped string is still returned, truncated.
pub fn content<S>(store: &S, handle: MsgHandle, max_len: usize) -> Result<String>
where
    S: MessageStore + ?Sized,
{
    let mut buf = BytesMut::zeroed(max_len);

    match store.format_message(handle, &mut buf) {
        Ok(()) => {}
        Err(ApiState::StringChopped) => {
            tracing::debug!(%handle, max_len, "message text chopped");
        }
        Err(state) => return Err(RepSysError::store("format_message", state)),
    }

    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}
