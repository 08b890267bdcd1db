//! Raw native handles and object kinds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, process-local identifier of a native resource.
///
/// `RawHandle::NULL` (zero) means "no object". The bridge never interprets any
/// other value; the engine is the source of truth for what a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The null sentinel
    pub const NULL: RawHandle = RawHandle(0);

    pub const fn new(value: u64) -> Self {
        RawHandle(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Handle of an optional proxy, null when the proxy is absent
    pub fn of<K: NativeObject, S: crate::proxy::Slot>(
        proxy: Option<&crate::proxy::Proxy<K, S>>,
    ) -> Self {
        proxy.map_or(RawHandle::NULL, |p| p.raw())
    }
}

impl From<u64> for RawHandle {
    fn from(value: u64) -> Self {
        RawHandle(value)
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

/// Kinds of native objects reachable through the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    SipEvent,
    SipSession,
    SipMessage,
    MsrpMessage,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::SipEvent => "SipEvent",
            ObjectKind::SipSession => "SipSession",
            ObjectKind::SipMessage => "SipMessage",
            ObjectKind::MsrpMessage => "MsrpMessage",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-level tag for a native object kind.
///
/// Implemented by the uninhabited marker types in [`crate::objects`]; proxies are
/// parameterized by it so accessors only exist on the right kind.
pub trait NativeObject: 'static {
    const KIND: ObjectKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel() {
        assert!(RawHandle::NULL.is_null());
        assert!(RawHandle::default().is_null());
        assert!(!RawHandle::new(42).is_null());
        assert_eq!(RawHandle::from(42).get(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(RawHandle::NULL.to_string(), "null");
        assert_eq!(RawHandle::new(255).to_string(), "0xff");
        assert_eq!(ObjectKind::MsrpMessage.to_string(), "MsrpMessage");
    }
}
