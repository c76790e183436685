//! Report-system contract consumed by the relay.
//!
//! The vendor library sits behind this trait. Implementations must be callable
//! from several threads at once; the relay adds no locking of its own.
//!
//! Handles order messages by creation: a new occurrence always gets a handle
//! greater than every handle issued before it, and `first`/`next`/`last` walk
//! in that order. Re-raising an existing message keeps its handle.

use std::sync::Arc;

use crate::status::ApiResult;
use crate::types::{ClassMask, MsgClass, MsgHandle, Timestamp};

/// Raw metadata of one stored message.
///
/// Class and state are kept as raw codes: the store may report values the
/// relay does not know, and `Message::from_handle` decides what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageMetadata {
    pub class_bits: u32,
    pub comp_nr: u32,
    pub inst_nr: u32,
    pub msg_nr: u32,
    pub timestamp: Timestamp,
    pub param_count: u32,
    pub state_code: u32,
    pub protocol_var: u32,
}

pub trait MessageStore: Send + Sync {
    /// Handle of the message identified by class and key.
    fn handle(&self, class: MsgClass, comp_nr: u32, inst_nr: u32, msg_nr: u32) -> ApiResult<MsgHandle>;

    /// First message whose class is in `mask`.
    fn first(&self, mask: ClassMask) -> ApiResult<MsgHandle>;

    /// Message following `after` whose class is in `mask`.
    fn next(&self, mask: ClassMask, after: MsgHandle) -> ApiResult<MsgHandle>;

    /// Most recent message whose class is in `mask`.
    fn last(&self, mask: ClassMask) -> ApiResult<MsgHandle>;

    fn metadata(&self, handle: MsgHandle) -> ApiResult<MessageMetadata>;

    /// Render the message text into `buf`, NUL-terminated and truncated to fit.
    fn format_message(&self, handle: MsgHandle, buf: &mut [u8]) -> ApiResult<()>;

    /// Raise (or re-raise) a message. `format` is printf-like; rendering is the store's job.
    fn publish(
        &self,
        class: MsgClass,
        comp_nr: u32,
        inst_nr: u32,
        msg_nr: u32,
        format: &str,
        args: &[&str],
    ) -> ApiResult<()>;
}

impl<S: MessageStore + ?Sized> MessageStore for Arc<S> {
    fn handle(&self, class: MsgClass, comp_nr: u32, inst_nr: u32, msg_nr: u32) -> ApiResult<MsgHandle> {
        (**self).handle(class, comp_nr, inst_nr, msg_nr)
    }
    fn first(&self, mask: ClassMask) -> ApiResult<MsgHandle> {
        (**self).first(mask)
    }
    fn next(&self, mask: ClassMask, after: MsgHandle) -> ApiResult<MsgHandle> {
        (**self).next(mask, after)
    }
    fn last(&self, mask: ClassMask) -> ApiResult<MsgHandle> {
        (**self).last(mask)
    }
    fn metadata(&self, handle: MsgHandle) -> ApiResult<MessageMetadata> {
        (**self).metadata(handle)
    }
    fn format_message(&self, handle: MsgHandle, buf: &mut [u8]) -> ApiResult<()> {
        (**self).format_message(handle, buf)
    }
    fn publish(
        &self,
        class: MsgClass,
        comp_nr: u32,
        inst_nr: u32,
        msg_nr: u32,
        format: &str,
        args: &[&str],
    ) -> ApiResult<()> {
        (**self).publish(class, comp_nr, inst_nr, msg_nr, format, args)
    }
}
