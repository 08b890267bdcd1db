//! Owning and non-owning proxies over native handles
//!
//! A [`Proxy`] pairs a [`RawHandle`] with the engine that issued it. Whether the
//! proxy is responsible for freeing the native object is decided by its slot type,
//! not by a runtime flag:
//!
//! - [`Owned<K>`] holds the handle in an atomic slot. It is neither `Clone`
//!   nor `Copy`, frees the object on [`Owned::release`] or on drop, and leaves the
//!   handle null afterwards.
//! - [`View<K>`] holds a plain copy of the handle. It is cheap to clone and never
//!   frees anything. The caller keeps the owner alive for as long as the view is
//!   used.
//!
//! Release swaps the handle to null, and only the caller that got the live handle
//! back destroys it, however many threads race. Accessors on an owner register
//! themselves as in flight before loading the handle, and that winner waits for
//! the in-flight count to drain before calling `destroy`. So `destroy` never
//! overlaps or follows a query made through the owner, and queries that start
//! after the swap see null and skip the engine.
//!
//! An engine must not release an owner from inside a query made through that
//! same owner; the release would wait on itself.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{debug, trace};

use crate::handle::{NativeObject, RawHandle};
use crate::native::NativeEngine;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::OwnedSlot {}
    impl Sealed for super::ViewSlot {}
}

/// Storage for a proxy's handle
pub trait Slot: sealed::Sealed + Send + Sync {
    /// Whether proxies with this slot free the native object
    const OWNING: bool;

    fn load(&self) -> RawHandle;

    /// Run `f` with the current handle, keeping it from being released until
    /// `f` returns
    fn pinned<T>(&self, f: impl FnOnce(RawHandle) -> T) -> T;

    /// Take the handle for destruction, waiting for pinned calls to finish.
    /// Views never have anything to take.
    fn take(&self) -> RawHandle;
}

/// Atomic handle cell of an owning proxy
pub struct OwnedSlot {
    handle: AtomicU64,
    in_flight: AtomicUsize,
}

impl OwnedSlot {
    fn new(handle: RawHandle) -> Self {
        OwnedSlot {
            handle: AtomicU64::new(handle.get()),
            in_flight: AtomicUsize::new(0),
        }
    }
}

/// Decrements the in-flight count when a pinned call returns or unwinds
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Slot for OwnedSlot {
    const OWNING: bool = true;

    fn load(&self) -> RawHandle {
        RawHandle::new(self.handle.load(Ordering::Acquire))
    }

    fn pinned<T>(&self, f: impl FnOnce(RawHandle) -> T) -> T {
        // register before loading: a release that swaps after this load is
        // guaranteed to see the count
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);
        f(RawHandle::new(self.handle.load(Ordering::SeqCst)))
    }

    fn take(&self) -> RawHandle {
        let handle = RawHandle::new(self.handle.swap(0, Ordering::SeqCst));
        if !handle.is_null() {
            while self.in_flight.load(Ordering::SeqCst) != 0 {
                thread::yield_now();
            }
        }
        handle
    }
}

/// Plain handle copy of a non-owning view
pub struct ViewSlot(RawHandle);

impl Slot for ViewSlot {
    const OWNING: bool = false;

    fn load(&self) -> RawHandle {
        self.0
    }

    fn pinned<T>(&self, f: impl FnOnce(RawHandle) -> T) -> T {
        f(self.0)
    }

    fn take(&self) -> RawHandle {
        RawHandle::NULL
    }
}

/// A typed proxy for a native object of kind `K`
pub struct Proxy<K: NativeObject, S: Slot> {
    slot: S,
    engine: Arc<dyn NativeEngine>,
    _kind: PhantomData<fn() -> K>,
}

/// Owning proxy: frees the native object when released or dropped
pub type Owned<K> = Proxy<K, OwnedSlot>;

/// Non-owning view of a native object
pub type View<K> = Proxy<K, ViewSlot>;

impl<K: NativeObject, S: Slot> Proxy<K, S> {
    /// Current handle; null once an owner has been released
    pub fn raw(&self) -> RawHandle {
        self.slot.load()
    }

    pub fn is_null(&self) -> bool {
        self.raw().is_null()
    }

    pub fn is_owner(&self) -> bool {
        S::OWNING
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    /// Forward a query with the stored handle, or return `neutral` without
    /// calling the engine when the handle is null.
    pub(crate) fn forward<T>(
        &self,
        operation: &'static str,
        neutral: T,
        call: impl FnOnce(&dyn NativeEngine, RawHandle) -> T,
    ) -> T {
        self.slot.pinned(|handle| {
            if handle.is_null() {
                trace!(kind = %K::KIND, operation, "null handle, skipping native call");
                return neutral;
            }
            trace!(kind = %K::KIND, operation, %handle, "forwarding to native engine");
            call(self.engine.as_ref(), handle)
        })
    }

    /// Forward a query returning a related object and wrap it as a view.
    /// A null result means there is no such object.
    pub(crate) fn related<R: NativeObject>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&dyn NativeEngine, RawHandle) -> RawHandle,
    ) -> Option<View<R>> {
        let handle = self.forward(operation, RawHandle::NULL, call);
        if handle.is_null() {
            None
        } else {
            Some(View::from_raw(Arc::clone(&self.engine), handle))
        }
    }

    /// Forward a buffer-filling query. The engine only ever sees the first
    /// `min(max_size, output.len())` bytes of `output`, and the reported count
    /// is clamped to that.
    pub(crate) fn fill(
        &self,
        operation: &'static str,
        output: &mut [u8],
        max_size: usize,
        call: impl FnOnce(&dyn NativeEngine, RawHandle, &mut [u8]) -> u32,
    ) -> usize {
        let capacity = max_size.min(output.len());
        let window = &mut output[..capacity];
        let written = self.forward(operation, 0, |engine, handle| call(engine, handle, window));
        (written as usize).min(capacity)
    }
}

impl<K: NativeObject> Owned<K> {
    /// Take ownership of an existing native handle.
    ///
    /// The handle is not validated; the null handle is accepted and produces an
    /// inert proxy.
    pub fn from_raw(engine: Arc<dyn NativeEngine>, handle: RawHandle) -> Self {
        Proxy {
            slot: OwnedSlot::new(handle),
            engine,
            _kind: PhantomData,
        }
    }

    /// Free the native object if this proxy still holds it.
    ///
    /// Waits for accessor calls already inside the engine. Returns `true` for
    /// the one call that actually destroyed the object; repeated and concurrent
    /// calls return `false`.
    pub fn release(&self) -> bool {
        let handle = self.slot.take();
        if handle.is_null() {
            return false;
        }
        debug!(kind = %K::KIND, %handle, "releasing native object");
        self.engine.destroy(K::KIND, handle);
        true
    }

    /// A non-owning view of the current handle
    pub fn view(&self) -> View<K> {
        View::from_raw(Arc::clone(&self.engine), self.raw())
    }

    /// Give up ownership without freeing the object, returning its handle
    pub fn into_raw(self) -> RawHandle {
        self.slot.take()
    }
}

impl<K: NativeObject> View<K> {
    /// Wrap a handle without taking ownership of it
    pub fn from_raw(engine: Arc<dyn NativeEngine>, handle: RawHandle) -> Self {
        Proxy {
            slot: ViewSlot(handle),
            engine,
            _kind: PhantomData,
        }
    }
}

impl<K: NativeObject> Clone for View<K> {
    fn clone(&self) -> Self {
        View::from_raw(Arc::clone(&self.engine), self.raw())
    }
}

impl<K: NativeObject, S: Slot> Drop for Proxy<K, S> {
    fn drop(&mut self) {
        let handle = self.slot.take();
        if !handle.is_null() {
            debug!(kind = %K::KIND, %handle, "releasing native object on drop");
            self.engine.destroy(K::KIND, handle);
        }
    }
}

impl<K: NativeObject, S: Slot> fmt::Debug for Proxy<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("kind", &K::KIND)
            .field("handle", &self.raw())
            .field("owner", &S::OWNING)
            .finish()
    }
}
