//! Reclassification rules.
//!
//! Rules, first match wins:
//! 1. class Warning, Class8 or Class11       -> Class15
//! 2. state ToReset or ToResetAndQuit        -> Class14 (not acknowledged)
//! 3. state ToQuit or ToResetOrQuit          -> Class13 (acknowledged)
//!
//! A matching message is republished under its new class with its current
//! text; the key (comp/inst/msgNr) never changes.

use crate::error::{RepSysError, Result};
use crate::message::{content, Message};
use crate::store::MessageStore;
use crate::types::{MsgClass, MsgState};

/// Outcome of one reclassification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reclassification {
    pub changed: bool,
    /// Class of the record after the call.
    pub class: MsgClass,
}

/// Target class for `msg`, or `None` when it stays where it is.
pub fn target_class(msg: &Message) -> Option<MsgClass> {
    match msg.class() {
        MsgClass::Warning | MsgClass::Class8 | MsgClass::Class11 => return Some(MsgClass::Class15),
        _ => {}
    }
    match msg.state() {
        MsgState::ToReset | MsgState::ToResetAndQuit => Some(MsgClass::Class14),
        MsgState::ToQuit | MsgState::ToResetOrQuit => Some(MsgClass::Class13),
        _ => None,
    }
}

/// Apply the rules to `msg` and republish it when its class changes.
///
/// The record is updated before the text is fetched, so on a failed publish
/// the error is returned with `msg` already carrying the new class.
pub fn reclassify<S>(store: &S, msg: &mut Message, content_len: usize) -> Result<Reclassification>
where
    S: MessageStore + ?Sized,
{
    let Some(target) = target_class(msg) else {
        tracing::debug!(handle = %msg.handle(), class = %msg.class(), "no class change needed");
        return Ok(Reclassification { changed: false, class: msg.class() });
    };

    let from = msg.class();
    msg.set_class(target);
    tracing::debug!(
        handle = %msg.handle(),
        comp = msg.comp_nr(),
        state = ?msg.state(),
        %from,
        to = %target,
        "forwarding message to new class"
    );

    let text = content(store, msg.handle(), content_len)?;
    store
        .publish(target, msg.comp_nr(), msg.inst_nr(), msg.msg_nr(), "%s", &[text.as_str()])
        .map_err(|state| RepSysError::store("publish", state))?;

    Ok(Reclassification { changed: true, class: target })
}
