//! Shared test engine that records every native call

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rvoip_native_bridge::{ByteRange, NativeEngine, ObjectKind, RawHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: &'static str,
    pub handle: RawHandle,
}

/// Holds queries inside the engine until the test opens it
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

#[derive(Debug, Default)]
struct GateState {
    entered: usize,
    open: bool,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `count` queries are parked at the gate
    pub fn wait_entered(&self, count: usize) {
        let mut state = self.state.lock();
        while state.entered < count {
            self.changed.wait(&mut state);
        }
    }

    pub fn open(&self) {
        self.state.lock().open = true;
        self.changed.notify_all();
    }

    fn pass(&self) {
        let mut state = self.state.lock();
        state.entered += 1;
        self.changed.notify_all();
        while !state.open {
            self.changed.wait(&mut state);
        }
    }
}

/// Answers every query with fixed values and logs the handle it was asked about
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Call>>,
    destroyed: Mutex<Vec<(ObjectKind, RawHandle)>>,
    pub related: RawHandle,
    pub content: Vec<u8>,
    /// Count reported by content calls, regardless of what was copied
    pub claimed_written: Option<u32>,
    /// When set, `msrp_code` parks at the gate after recording the call
    pub gate: Option<Arc<Gate>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_related(mut self, handle: RawHandle) -> Self {
        self.related = handle;
        self
    }

    pub fn with_content(mut self, content: &[u8]) -> Self {
        self.content = content.to_vec();
        self
    }

    pub fn claiming_written(mut self, count: u32) -> Self {
        self.claimed_written = Some(count);
        self
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn destroyed(&self) -> Vec<(ObjectKind, RawHandle)> {
        self.destroyed.lock().clone()
    }

    fn record(&self, operation: &'static str, handle: RawHandle) {
        assert!(!handle.is_null(), "{} forwarded the null handle", operation);
        self.calls.lock().push(Call { operation, handle });
    }

    fn fill(&self, operation: &'static str, handle: RawHandle, output: &mut [u8]) -> u32 {
        self.record(operation, handle);
        let len = self.content.len().min(output.len());
        output[..len].copy_from_slice(&self.content[..len]);
        self.claimed_written
            .unwrap_or_else(|| u32::try_from(len).unwrap_or(u32::MAX))
    }
}

impl NativeEngine for RecordingEngine {
    fn destroy(&self, kind: ObjectKind, handle: RawHandle) {
        self.record("destroy", handle);
        self.destroyed.lock().push((kind, handle));
    }

    fn sip_event_code(&self, handle: RawHandle) -> i16 {
        self.record("sip_event_code", handle);
        180
    }

    fn sip_event_phrase(&self, handle: RawHandle) -> Option<String> {
        self.record("sip_event_phrase", handle);
        Some("Ringing".to_string())
    }

    fn sip_event_base_session(&self, handle: RawHandle) -> RawHandle {
        self.record("sip_event_base_session", handle);
        self.related
    }

    fn sip_event_sip_message(&self, handle: RawHandle) -> RawHandle {
        self.record("sip_event_sip_message", handle);
        self.related
    }

    fn sip_session_id(&self, handle: RawHandle) -> u32 {
        self.record("sip_session_id", handle);
        7
    }

    fn sip_message_header_value(
        &self,
        handle: RawHandle,
        name: &str,
        index: u32,
    ) -> Option<String> {
        self.record("sip_message_header_value", handle);
        Some(format!("{}#{}", name, index))
    }

    fn sip_message_header_param_value(
        &self,
        handle: RawHandle,
        name: &str,
        param: &str,
        index: u32,
    ) -> Option<String> {
        self.record("sip_message_header_param_value", handle);
        Some(format!("{}#{};{}", name, index, param))
    }

    fn sip_message_content_length(&self, handle: RawHandle) -> u32 {
        self.record("sip_message_content_length", handle);
        self.content.len() as u32
    }

    fn sip_message_content(&self, handle: RawHandle, output: &mut [u8]) -> u32 {
        self.fill("sip_message_content", handle, output)
    }

    fn new_msrp_message(&self) -> RawHandle {
        self.related
    }

    fn msrp_is_request(&self, handle: RawHandle) -> bool {
        self.record("msrp_is_request", handle);
        true
    }

    fn msrp_code(&self, handle: RawHandle) -> i16 {
        self.record("msrp_code", handle);
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        200
    }

    fn msrp_phrase(&self, handle: RawHandle) -> Option<String> {
        self.record("msrp_phrase", handle);
        Some("OK".to_string())
    }

    fn msrp_request_type(&self, handle: RawHandle) -> i32 {
        self.record("msrp_request_type", handle);
        1
    }

    fn msrp_byte_range(&self, handle: RawHandle) -> ByteRange {
        self.record("msrp_byte_range", handle);
        ByteRange::new(1, 4, 4)
    }

    fn msrp_is_last_chunk(&self, handle: RawHandle) -> bool {
        self.record("msrp_is_last_chunk", handle);
        true
    }

    fn msrp_is_first_chunk(&self, handle: RawHandle) -> bool {
        self.record("msrp_is_first_chunk", handle);
        true
    }

    fn msrp_is_success_report(&self, handle: RawHandle) -> bool {
        self.record("msrp_is_success_report", handle);
        true
    }

    fn msrp_header_value(&self, handle: RawHandle, name: &str) -> Option<String> {
        self.record("msrp_header_value", handle);
        Some(name.to_string())
    }

    fn msrp_header_param_value(
        &self,
        handle: RawHandle,
        name: &str,
        param: &str,
    ) -> Option<String> {
        self.record("msrp_header_param_value", handle);
        Some(format!("{};{}", name, param))
    }

    fn msrp_content_length(&self, handle: RawHandle) -> u32 {
        self.record("msrp_content_length", handle);
        self.content.len() as u32
    }

    fn msrp_content(&self, handle: RawHandle, output: &mut [u8]) -> u32 {
        self.fill("msrp_content", handle, output)
    }
}
