//! In-process message store.
//!
//! Stands in for the vendor report system in tests and in the demo binary.
//! Handles are issued sequentially from 1, and first/next/last walk them in
//! that order. Messages collapse on `(comp_nr, inst_nr, msg_nr)`: publishing an
//! existing key updates it in place and keeps its handle.
//!
//! Lookups by mask walk the whole map: `first`, `next` and `last` are O(n), so
//! a full first/next walk is O(n²). Fine for test-sized stores.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::status::{ApiResult, ApiState};
use crate::store::{MessageMetadata, MessageStore};
use crate::types::{ClassMask, MsgClass, MsgHandle, MsgState, Timestamp};

/// One stored message, text already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub class: MsgClass,
    pub comp_nr: u32,
    pub inst_nr: u32,
    pub msg_nr: u32,
    pub timestamp: Timestamp,
    pub param_count: u32,
    pub state: MsgState,
    pub protocol_var: u32,
    pub text: String,
}

impl StoredMessage {
    /// Message with the given key and text; everything else defaulted.
    pub fn new(class: MsgClass, comp_nr: u32, inst_nr: u32, msg_nr: u32, text: impl Into<String>) -> Self {
        Self {
            class,
            comp_nr,
            inst_nr,
            msg_nr,
            timestamp: now(),
            param_count: 0,
            state: MsgState::Undefined,
            protocol_var: 0,
            text: text.into(),
        }
    }

    pub fn with_state(mut self, state: MsgState) -> Self {
        self.state = state;
        self
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.comp_nr, self.inst_nr, self.msg_nr)
    }
}

#[derive(Debug)]
pub struct InMemoryStore {
    messages: DashMap<u32, StoredMessage>,
    keys: DashMap<(u32, u32, u32), MsgHandle>,
    next_handle: AtomicU32,
    publishes: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
            keys: DashMap::new(),
            next_handle: AtomicU32::new(1),
            publishes: AtomicU64::new(0),
        }
    }

    /// Store `msg`, replacing any message with the same key.
    pub fn insert(&self, msg: StoredMessage) -> MsgHandle {
        let handle = *self
            .keys
            .entry(msg.key())
            .or_insert_with(|| MsgHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)));
        self.messages.insert(handle.0, msg);
        handle
    }

    pub fn get(&self, handle: MsgHandle) -> Option<StoredMessage> {
        self.messages.get(&handle.0).map(|m| m.value().clone())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of successful `publish` calls so far.
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::Relaxed)
    }

    fn matching(&self, mask: ClassMask) -> impl Iterator<Item = u32> + '_ {
        self.messages
            .iter()
            .filter(move |e| mask.contains(e.value().class))
            .map(|e| *e.key())
    }
}

impl MessageStore for InMemoryStore {
    fn handle(&self, class: MsgClass, comp_nr: u32, inst_nr: u32, msg_nr: u32) -> ApiResult<MsgHandle> {
        let handle = self
            .keys
            .get(&(comp_nr, inst_nr, msg_nr))
            .map(|h| *h.value())
            .ok_or(ApiState::NotOk)?;
        match self.messages.get(&handle.0) {
            Some(m) if m.value().class == class => Ok(handle),
            _ => Err(ApiState::NotOk),
        }
    }

    fn first(&self, mask: ClassMask) -> ApiResult<MsgHandle> {
        self.matching(mask).min().map(MsgHandle).ok_or(ApiState::NotOk)
    }

    fn next(&self, mask: ClassMask, after: MsgHandle) -> ApiResult<MsgHandle> {
        self.matching(mask)
            .filter(|h| *h > after.0)
            .min()
            .map(MsgHandle)
            .ok_or(ApiState::NotOk)
    }

    fn last(&self, mask: ClassMask) -> ApiResult<MsgHandle> {
        self.matching(mask).max().map(MsgHandle).ok_or(ApiState::NotOk)
    }

    fn metadata(&self, handle: MsgHandle) -> ApiResult<MessageMetadata> {
        let m = self.messages.get(&handle.0).ok_or(ApiState::RepSysInvalidHandle)?;
        let m = m.value();
        Ok(MessageMetadata {
            class_bits: m.class.bits(),
            comp_nr: m.comp_nr,
            inst_nr: m.inst_nr,
            msg_nr: m.msg_nr,
            timestamp: m.timestamp,
            param_count: m.param_count,
            state_code: m.state.code(),
            protocol_var: m.protocol_var,
        })
    }

    fn format_message(&self, handle: MsgHandle, buf: &mut [u8]) -> ApiResult<()> {
        let m = self.messages.get(&handle.0).ok_or(ApiState::RepSysInvalidHandle)?;
        if buf.is_empty() {
            return Err(ApiState::RepSysBufferTooSmall);
        }

        let text = m.value().text.as_bytes();
        let n = text.len().min(buf.len() - 1);
        buf[..n].copy_from_slice(&text[..n]);
        buf[n] = 0;

        if n < text.len() {
            Err(ApiState::StringChopped)
        } else {
            Ok(())
        }
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
        let text = render(format, args);
        let existing = self.keys.get(&(comp_nr, inst_nr, msg_nr)).map(|h| *h.value());

        match existing.and_then(|h| self.messages.get_mut(&h.0)) {
            Some(mut m) => {
                let m = m.value_mut();
                m.class = class;
                m.text = text;
                m.timestamp = now();
            }
            None => {
                let mut msg = StoredMessage::new(class, comp_nr, inst_nr, msg_nr, text);
                msg.param_count = u32::try_from(args.len()).unwrap_or(u32::MAX);
                self.insert(msg);
            }
        }

        self.publishes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Minimal printf: `%s` takes the next argument, `%%` is a literal percent.
fn render(format: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(args.next().copied().unwrap_or_default());
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

fn now() -> Timestamp {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Timestamp::new(u32::try_from(d.as_secs()).unwrap_or(u32::MAX), d.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::render;

    #[test]
    fn render_handles_percent_s_and_escapes() {
        assert_eq!(render("%s", &["hello"]), "hello");
        assert_eq!(render("%s-%s", &["a", "b"]), "a-b");
        assert_eq!(render("100%% %s", &["done"]), "100% done");
        assert_eq!(render("%s %s", &["only"]), "only ");
        assert_eq!(render("%d", &["x"]), "%d");
    }
}
