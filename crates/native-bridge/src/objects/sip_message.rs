use super::SipMessage;
use crate::proxy::{Proxy, Slot};

impl<S: Slot> Proxy<SipMessage, S> {
    /// Value of the `index`-th header called `name`
    pub fn header_value(&self, name: &str, index: u32) -> Option<String> {
        self.forward("SipMessage.header_value", None, |engine, handle| {
            engine.sip_message_header_value(handle, name, index)
        })
    }

    /// Value of parameter `param` on the `index`-th header called `name`
    pub fn header_param_value(&self, name: &str, param: &str, index: u32) -> Option<String> {
        self.forward("SipMessage.header_param_value", None, |engine, handle| {
            engine.sip_message_header_param_value(handle, name, param, index)
        })
    }

    pub fn content_length(&self) -> u32 {
        self.forward("SipMessage.content_length", 0, |engine, handle| {
            engine.sip_message_content_length(handle)
        })
    }

    /// Copy up to `max_size` bytes of the body into `output`, returning the
    /// number of bytes written
    pub fn content(&self, output: &mut [u8], max_size: usize) -> usize {
        self.fill("SipMessage.content", output, max_size, |engine, handle, window| {
            engine.sip_message_content(handle, window)
        })
    }
}
