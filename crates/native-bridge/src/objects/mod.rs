//! Typed accessors for each kind of native object
//!
//! Every accessor is available on both [`Owned`](crate::Owned) and
//! [`View`](crate::View) proxies of its kind, and returns a neutral value when the
//! proxy's handle is null.

mod msrp_message;
mod sip_event;
mod sip_message;
mod sip_session;

pub use msrp_message::{ByteRange, MsrpRequestType};

use crate::handle::{NativeObject, ObjectKind};

/// A SIP event delivered by the engine's callback layer
#[derive(Debug)]
pub enum SipEvent {}

/// A SIP session (dialog usage) owned by the engine
#[derive(Debug)]
pub enum SipSession {}

/// A parsed SIP request or response
#[derive(Debug)]
pub enum SipMessage {}

/// An MSRP request or response, possibly one chunk of a larger message
#[derive(Debug)]
pub enum MsrpMessage {}

impl NativeObject for SipEvent {
    const KIND: ObjectKind = ObjectKind::SipEvent;
}

impl NativeObject for SipSession {
    const KIND: ObjectKind = ObjectKind::SipSession;
}

impl NativeObject for SipMessage {
    const KIND: ObjectKind = ObjectKind::SipMessage;
}

impl NativeObject for MsrpMessage {
    const KIND: ObjectKind = ObjectKind::MsrpMessage;
}
