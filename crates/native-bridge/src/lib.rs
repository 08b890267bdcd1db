//! # Native Bridge - handle-based proxies for the native SIP/MSRP engine
//!
//! The SIP/IMS/MSRP protocol engine lives behind an opaque, handle-based call
//! surface ([`NativeEngine`]). This crate wraps those handles in typed proxies
//! with well-defined ownership:
//!
//! - [`Owned<K>`] frees its native object exactly once, on [`Owned::release`] or
//!   when dropped, no matter how many threads race to release it.
//! - [`View<K>`] is a non-owning copy of a handle, as returned by accessors such
//!   as [`SipEvent`]'s `base_session()`. Views never free anything.
//!
//! Once released, a proxy's handle is null and every accessor returns a neutral
//! value (`0`, `false`, `None`, [`ByteRange::UNSET`]) without calling the engine.
//!
//! ```
//! use std::sync::Arc;
//! use rvoip_native_bridge::{InMemoryEngine, MsrpMessage, NativeEngine, Owned};
//!
//! let engine: Arc<dyn NativeEngine> = Arc::new(InMemoryEngine::new());
//! let message = Owned::<MsrpMessage>::create(Arc::clone(&engine));
//! assert!(!message.is_null());
//!
//! assert!(message.release());
//! assert!(!message.release());
//! assert_eq!(message.code(), 0);
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod memory;
pub mod native;
pub mod objects;
pub mod proxy;

pub use arena::HandleArena;
pub use config::{BridgeConfig, EngineSettings, LoggingSettings};
pub use error::{BridgeError, Result};
pub use handle::{NativeObject, ObjectKind, RawHandle};
pub use memory::{
    Continuation, EngineStats, InMemoryEngine, MsrpMessageRecord, SipEventRecord, SipMessageRecord,
    SipSessionRecord,
};
pub use native::NativeEngine;
pub use objects::{ByteRange, MsrpMessage, MsrpRequestType, SipEvent, SipMessage, SipSession};
pub use proxy::{Owned, OwnedSlot, Proxy, Slot, View, ViewSlot};
