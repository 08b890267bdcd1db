//! The native call surface
//!
//! [`NativeEngine`] is everything the bridge knows about the protocol engine: one
//! method per (object type, operation). Proxies forward their stored handle and
//! arguments unchanged and never call in with the null handle.
//!
//! Related objects come back as raw handles, with [`RawHandle::NULL`] for "no
//! result". Strings are handed out as owned copies; the engine keeps its own
//! storage. Buffer-filling calls receive a slice already clamped to the caller's
//! maximum and return the number of bytes they wrote.
//!
//! # Stale handles
//!
//! An owning proxy never forwards a handle once it has destroyed it, and its
//! `destroy` waits for queries already in flight through that owner. Views are
//! plain copies, so a view taken before the release keeps forwarding the old
//! handle. Engines must therefore answer an unknown or already destroyed handle
//! with neutral values (`0`, `false`, `None`, [`RawHandle::NULL`], zero bytes
//! written) instead of touching freed memory, and must not hand a destroyed
//! handle value out again while such views can exist.

use std::fmt;

use crate::handle::{ObjectKind, RawHandle};
use crate::objects::ByteRange;

/// Native call surface shared by every proxy of one engine
///
/// Every query may receive a stale handle from a view that outlived its owner;
/// see the [module docs](crate::native#stale-handles).
pub trait NativeEngine: Send + Sync + fmt::Debug {
    /// Free the native object behind `handle`.
    ///
    /// Called at most once per owner, after all queries made through that owner
    /// have returned. Views of the same handle may still call in afterwards, and
    /// an engine that is handed a handle it no longer knows, or one of another
    /// kind, must ignore it.
    fn destroy(&self, kind: ObjectKind, handle: RawHandle);

    // SipEvent

    fn sip_event_code(&self, handle: RawHandle) -> i16;

    fn sip_event_phrase(&self, handle: RawHandle) -> Option<String>;

    fn sip_event_base_session(&self, handle: RawHandle) -> RawHandle;

    fn sip_event_sip_message(&self, handle: RawHandle) -> RawHandle;

    // SipSession

    fn sip_session_id(&self, handle: RawHandle) -> u32;

    // SipMessage

    fn sip_message_header_value(&self, handle: RawHandle, name: &str, index: u32) -> Option<String>;

    fn sip_message_header_param_value(
        &self,
        handle: RawHandle,
        name: &str,
        param: &str,
        index: u32,
    ) -> Option<String>;

    fn sip_message_content_length(&self, handle: RawHandle) -> u32;

    fn sip_message_content(&self, handle: RawHandle, output: &mut [u8]) -> u32;

    // MsrpMessage

    /// Allocate an empty MSRP message, or return the null handle on failure
    fn new_msrp_message(&self) -> RawHandle;

    fn msrp_is_request(&self, handle: RawHandle) -> bool;

    fn msrp_code(&self, handle: RawHandle) -> i16;

    fn msrp_phrase(&self, handle: RawHandle) -> Option<String>;

    /// Raw request type code: 0 none, 1 SEND, 2 REPORT, 3 AUTH
    fn msrp_request_type(&self, handle: RawHandle) -> i32;

    fn msrp_byte_range(&self, handle: RawHandle) -> ByteRange;

    fn msrp_is_last_chunk(&self, handle: RawHandle) -> bool;

    fn msrp_is_first_chunk(&self, handle: RawHandle) -> bool;

    fn msrp_is_success_report(&self, handle: RawHandle) -> bool;

    fn msrp_header_value(&self, handle: RawHandle, name: &str) -> Option<String>;

    fn msrp_header_param_value(&self, handle: RawHandle, name: &str, param: &str) -> Option<String>;

    fn msrp_content_length(&self, handle: RawHandle) -> u32;

    fn msrp_content(&self, handle: RawHandle, output: &mut [u8]) -> u32;
}
