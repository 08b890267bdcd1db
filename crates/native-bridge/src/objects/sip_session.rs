use super::SipSession;
use crate::proxy::{Proxy, Slot};

impl<S: Slot> Proxy<SipSession, S> {
    /// Engine-assigned session identifier, 0 when unavailable
    pub fn id(&self) -> u32 {
        self.forward("SipSession.id", 0, |engine, handle| engine.sip_session_id(handle))
    }
}
