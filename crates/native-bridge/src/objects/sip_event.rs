use super::{SipEvent, SipMessage, SipSession};
use crate::proxy::{Proxy, Slot, View};

impl<S: Slot> Proxy<SipEvent, S> {
    /// Status code carried by the event, 0 when unavailable
    pub fn code(&self) -> i16 {
        self.forward("SipEvent.code", 0, |engine, handle| engine.sip_event_code(handle))
    }

    pub fn phrase(&self) -> Option<String> {
        self.forward("SipEvent.phrase", None, |engine, handle| engine.sip_event_phrase(handle))
    }

    /// The session the event belongs to. The engine keeps ownership.
    pub fn base_session(&self) -> Option<View<SipSession>> {
        self.related("SipEvent.base_session", |engine, handle| {
            engine.sip_event_base_session(handle)
        })
    }

    /// The SIP message that triggered the event, if any
    pub fn sip_message(&self) -> Option<View<SipMessage>> {
        self.related("SipEvent.sip_message", |engine, handle| {
            engine.sip_event_sip_message(handle)
        })
    }
}
