use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::MsrpMessage;
use crate::native::NativeEngine;
use crate::proxy::{Owned, Proxy, Slot};

/// MSRP request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsrpRequestType {
    Send,
    Report,
    Auth,
}

impl MsrpRequestType {
    /// Map the engine's request type code. 0 and unknown codes have no request type.
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            1 => Some(MsrpRequestType::Send),
            2 => Some(MsrpRequestType::Report),
            3 => Some(MsrpRequestType::Auth),
            _ => None,
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            MsrpRequestType::Send => 1,
            MsrpRequestType::Report => 2,
            MsrpRequestType::Auth => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MsrpRequestType::Send => "SEND",
            MsrpRequestType::Report => "REPORT",
            MsrpRequestType::Auth => "AUTH",
        }
    }
}

impl fmt::Display for MsrpRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of an MSRP `Byte-Range` header.
///
/// Fields the engine cannot supply are `-1`, including `total` when the sender
/// used `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
    pub total: i64,
}

impl ByteRange {
    /// Reported when the message has no byte range or the proxy is null
    pub const UNSET: ByteRange = ByteRange { start: -1, end: -1, total: -1 };

    pub const fn new(start: i64, end: i64, total: i64) -> Self {
        ByteRange { start, end, total }
    }

    pub fn is_unset(&self) -> bool {
        *self == ByteRange::UNSET
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        ByteRange::UNSET
    }
}

impl Owned<MsrpMessage> {
    /// Allocate a new, empty MSRP message owned by the caller.
    ///
    /// If the engine cannot allocate, the returned proxy wraps the null handle.
    pub fn create(engine: Arc<dyn NativeEngine>) -> Self {
        let handle = engine.new_msrp_message();
        if handle.is_null() {
            warn!("native engine failed to allocate an MSRP message");
        }
        Owned::from_raw(engine, handle)
    }
}

impl<S: Slot> Proxy<MsrpMessage, S> {
    pub fn is_request(&self) -> bool {
        self.forward("MsrpMessage.is_request", false, |engine, handle| {
            engine.msrp_is_request(handle)
        })
    }

    /// Response status code, 0 for requests and when unavailable
    pub fn code(&self) -> i16 {
        self.forward("MsrpMessage.code", 0, |engine, handle| engine.msrp_code(handle))
    }

    pub fn phrase(&self) -> Option<String> {
        self.forward("MsrpMessage.phrase", None, |engine, handle| engine.msrp_phrase(handle))
    }

    pub fn request_type(&self) -> Option<MsrpRequestType> {
        let code = self.forward("MsrpMessage.request_type", 0, |engine, handle| {
            engine.msrp_request_type(handle)
        });
        MsrpRequestType::from_raw(code)
    }

    pub fn byte_range(&self) -> ByteRange {
        self.forward("MsrpMessage.byte_range", ByteRange::UNSET, |engine, handle| {
            engine.msrp_byte_range(handle)
        })
    }

    pub fn is_last_chunk(&self) -> bool {
        self.forward("MsrpMessage.is_last_chunk", false, |engine, handle| {
            engine.msrp_is_last_chunk(handle)
        })
    }

    pub fn is_first_chunk(&self) -> bool {
        self.forward("MsrpMessage.is_first_chunk", false, |engine, handle| {
            engine.msrp_is_first_chunk(handle)
        })
    }

    pub fn is_success_report(&self) -> bool {
        self.forward("MsrpMessage.is_success_report", false, |engine, handle| {
            engine.msrp_is_success_report(handle)
        })
    }

    pub fn header_value(&self, name: &str) -> Option<String> {
        self.forward("MsrpMessage.header_value", None, |engine, handle| {
            engine.msrp_header_value(handle, name)
        })
    }

    pub fn header_param_value(&self, name: &str, param: &str) -> Option<String> {
        self.forward("MsrpMessage.header_param_value", None, |engine, handle| {
            engine.msrp_header_param_value(handle, name, param)
        })
    }

    pub fn content_length(&self) -> u32 {
        self.forward("MsrpMessage.content_length", 0, |engine, handle| {
            engine.msrp_content_length(handle)
        })
    }

    /// Copy up to `max_size` bytes of the chunk payload into `output`, returning
    /// the number of bytes written
    pub fn content(&self, output: &mut [u8], max_size: usize) -> usize {
        self.fill("MsrpMessage.content", output, max_size, |engine, handle, window| {
            engine.msrp_content(handle, window)
        })
    }

    /// The whole chunk payload, sized from `content_length`
    pub fn read_content(&self) -> Vec<u8> {
        let len = self.content_length() as usize;
        let mut buffer = vec![0u8; len];
        let written = self.content(&mut buffer, len);
        buffer.truncate(written);
        buffer
    }
}
