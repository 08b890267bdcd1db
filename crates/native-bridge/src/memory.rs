//! In-process reference engine
//!
//! [`InMemoryEngine`] implements [`NativeEngine`] over a [`HandleArena`] of plain
//! records. It has no protocol logic: records are filled in by the caller and the
//! engine only answers queries about them. It backs the test suite, the demo and
//! the benchmarks, and is a drop-in stand-in wherever a real engine is not linked.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::arena::HandleArena;
use crate::config::EngineSettings;
use crate::error::Result;
use crate::handle::{ObjectKind, RawHandle};
use crate::native::NativeEngine;
use crate::objects::{ByteRange, MsrpRequestType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SipEventRecord {
    pub code: i16,
    pub phrase: Option<String>,
    /// Session the event belongs to; not owned by the event
    pub session: RawHandle,
    /// Message that triggered the event; not owned by the event
    pub message: RawHandle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SipSessionRecord {
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SipMessageRecord {
    pub headers: Vec<(String, String)>,
    pub content: Vec<u8>,
}

impl SipMessageRecord {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }
}

/// MSRP end-line continuation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// `$`: last chunk of the message
    Complete,
    /// `+`: more chunks follow
    More,
    /// `#`: the sender aborted the message
    Aborted,
}

impl Continuation {
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            '$' => Some(Continuation::Complete),
            '+' => Some(Continuation::More),
            '#' => Some(Continuation::Aborted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MsrpMessageRecord {
    /// `None` for responses
    pub request_type: Option<MsrpRequestType>,
    pub code: i16,
    pub phrase: Option<String>,
    pub headers: Vec<(String, String)>,
    pub byte_range: Option<ByteRange>,
    /// `None` until an end-line has been seen; such a message is not a last chunk
    pub continuation: Option<Continuation>,
    pub content: Vec<u8>,
}

impl MsrpMessageRecord {
    pub fn request(request_type: MsrpRequestType) -> Self {
        Self {
            request_type: Some(request_type),
            ..Default::default()
        }
    }

    pub fn response(code: i16, phrase: impl Into<String>) -> Self {
        Self {
            code,
            phrase: Some(phrase.into()),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_byte_range(mut self, range: ByteRange) -> Self {
        self.byte_range = Some(range);
        self
    }

    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = Some(continuation);
        self
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    fn is_success_report(&self) -> bool {
        if self.request_type != Some(MsrpRequestType::Report) {
            return false;
        }
        // Status: <namespace> <code> [<reason>]
        header_value(&self.headers, "Status", 0)
            .and_then(|status| status.split_whitespace().nth(1))
            .and_then(|code| code.parse::<u16>().ok())
            .map_or(false, |code| (200..300).contains(&code))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    SipEvent(SipEventRecord),
    SipSession(SipSessionRecord),
    SipMessage(SipMessageRecord),
    MsrpMessage(MsrpMessageRecord),
}

impl Record {
    fn kind(&self) -> ObjectKind {
        match self {
            Record::SipEvent(_) => ObjectKind::SipEvent,
            Record::SipSession(_) => ObjectKind::SipSession,
            Record::SipMessage(_) => ObjectKind::SipMessage,
            Record::MsrpMessage(_) => ObjectKind::MsrpMessage,
        }
    }
}

/// Snapshot of engine activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Every call made through the [`NativeEngine`] surface
    pub calls: u64,
    /// Objects actually freed by `destroy`
    pub destroys: u64,
    /// `destroy` calls naming an unknown handle or the wrong kind
    pub stale_destroys: u64,
    pub live_objects: usize,
}

#[derive(Debug)]
pub struct InMemoryEngine {
    objects: HandleArena<Record>,
    calls: AtomicU64,
    destroys: AtomicU64,
    stale_destroys: AtomicU64,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::with_settings(&EngineSettings::default())
    }

    pub fn with_settings(settings: &EngineSettings) -> Self {
        Self {
            objects: HandleArena::with_limit(settings.max_objects),
            calls: AtomicU64::new(0),
            destroys: AtomicU64::new(0),
            stale_destroys: AtomicU64::new(0),
        }
    }

    pub fn insert_sip_event(&self, record: SipEventRecord) -> Result<RawHandle> {
        self.insert(Record::SipEvent(record))
    }

    pub fn insert_sip_session(&self, record: SipSessionRecord) -> Result<RawHandle> {
        self.insert(Record::SipSession(record))
    }

    pub fn insert_sip_message(&self, record: SipMessageRecord) -> Result<RawHandle> {
        self.insert(Record::SipMessage(record))
    }

    pub fn insert_msrp_message(&self, record: MsrpMessageRecord) -> Result<RawHandle> {
        self.insert(Record::MsrpMessage(record))
    }

    pub fn is_live(&self, handle: RawHandle) -> bool {
        self.objects.contains(handle)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            calls: self.calls.load(Ordering::Acquire),
            destroys: self.destroys.load(Ordering::Acquire),
            stale_destroys: self.stale_destroys.load(Ordering::Acquire),
            live_objects: self.objects.len(),
        }
    }

    fn insert(&self, record: Record) -> Result<RawHandle> {
        let kind = record.kind();
        let handle = self.objects.insert(record)?;
        debug!(%kind, %handle, "allocated native object");
        Ok(handle)
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn sip_event<R>(
        &self,
        handle: RawHandle,
        neutral: R,
        f: impl FnOnce(&SipEventRecord) -> R,
    ) -> R {
        self.count_call();
        self.objects
            .with(handle, |record| match record {
                Record::SipEvent(event) => Some(f(event)),
                _ => None,
            })
            .flatten()
            .unwrap_or(neutral)
    }

    fn sip_session<R>(
        &self,
        handle: RawHandle,
        neutral: R,
        f: impl FnOnce(&SipSessionRecord) -> R,
    ) -> R {
        self.count_call();
        self.objects
            .with(handle, |record| match record {
                Record::SipSession(session) => Some(f(session)),
                _ => None,
            })
            .flatten()
            .unwrap_or(neutral)
    }

    fn sip_message<R>(
        &self,
        handle: RawHandle,
        neutral: R,
        f: impl FnOnce(&SipMessageRecord) -> R,
    ) -> R {
        self.count_call();
        self.objects
            .with(handle, |record| match record {
                Record::SipMessage(message) => Some(f(message)),
                _ => None,
            })
            .flatten()
            .unwrap_or(neutral)
    }

    fn msrp<R>(&self, handle: RawHandle, neutral: R, f: impl FnOnce(&MsrpMessageRecord) -> R) -> R {
        self.count_call();
        self.objects
            .with(handle, |record| match record {
                Record::MsrpMessage(message) => Some(f(message)),
                _ => None,
            })
            .flatten()
            .unwrap_or(neutral)
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The `index`-th header called `name`, compared case-insensitively
fn header_value<'a>(headers: &'a [(String, String)], name: &str, index: u32) -> Option<&'a str> {
    headers
        .iter()
        .filter(|(header, _)| header.eq_ignore_ascii_case(name))
        .nth(index as usize)
        .map(|(_, value)| value.as_str())
}

/// Parameter `param` of a `value;name=val;flag` header value
fn param_value(value: &str, param: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|item| {
        let (name, val) = match item.split_once('=') {
            Some((name, val)) => (name.trim(), val.trim()),
            None => (item.trim(), ""),
        };
        name.eq_ignore_ascii_case(param)
            .then(|| val.trim_matches('"').to_string())
    })
}

/// Byte count as reported over the native surface, saturating at `u32::MAX`
fn wire_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn copy_into(source: &[u8], output: &mut [u8]) -> u32 {
    let len = source.len().min(output.len());
    output[..len].copy_from_slice(&source[..len]);
    wire_len(len)
}

impl NativeEngine for InMemoryEngine {
    fn destroy(&self, kind: ObjectKind, handle: RawHandle) {
        self.count_call();
        match self.objects.remove_if(handle, |record| record.kind() == kind) {
            Some(_) => {
                self.destroys.fetch_add(1, Ordering::AcqRel);
                debug!(%kind, %handle, "freed native object");
            }
            None => {
                self.stale_destroys.fetch_add(1, Ordering::AcqRel);
                warn!(%kind, %handle, "destroy of unknown or mismatched handle ignored");
            }
        }
    }

    fn sip_event_code(&self, handle: RawHandle) -> i16 {
        self.sip_event(handle, 0, |event| event.code)
    }

    fn sip_event_phrase(&self, handle: RawHandle) -> Option<String> {
        self.sip_event(handle, None, |event| event.phrase.clone())
    }

    fn sip_event_base_session(&self, handle: RawHandle) -> RawHandle {
        self.sip_event(handle, RawHandle::NULL, |event| event.session)
    }

    fn sip_event_sip_message(&self, handle: RawHandle) -> RawHandle {
        self.sip_event(handle, RawHandle::NULL, |event| event.message)
    }

    fn sip_session_id(&self, handle: RawHandle) -> u32 {
        self.sip_session(handle, 0, |session| session.id)
    }

    fn sip_message_header_value(
        &self,
        handle: RawHandle,
        name: &str,
        index: u32,
    ) -> Option<String> {
        self.sip_message(handle, None, |message| {
            header_value(&message.headers, name, index).map(str::to_string)
        })
    }

    fn sip_message_header_param_value(
        &self,
        handle: RawHandle,
        name: &str,
        param: &str,
        index: u32,
    ) -> Option<String> {
        self.sip_message(handle, None, |message| {
            header_value(&message.headers, name, index).and_then(|value| param_value(value, param))
        })
    }

    fn sip_message_content_length(&self, handle: RawHandle) -> u32 {
        self.sip_message(handle, 0, |message| wire_len(message.content.len()))
    }

    fn sip_message_content(&self, handle: RawHandle, output: &mut [u8]) -> u32 {
        self.sip_message(handle, 0, |message| copy_into(&message.content, output))
    }

    fn new_msrp_message(&self) -> RawHandle {
        self.count_call();
        match self.insert(Record::MsrpMessage(MsrpMessageRecord::default())) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("failed to allocate MSRP message: {}", e);
                RawHandle::NULL
            }
        }
    }

    fn msrp_is_request(&self, handle: RawHandle) -> bool {
        self.msrp(handle, false, |message| message.request_type.is_some())
    }

    fn msrp_code(&self, handle: RawHandle) -> i16 {
        self.msrp(handle, 0, |message| message.code)
    }

    fn msrp_phrase(&self, handle: RawHandle) -> Option<String> {
        self.msrp(handle, None, |message| message.phrase.clone())
    }

    fn msrp_request_type(&self, handle: RawHandle) -> i32 {
        self.msrp(handle, 0, |message| message.request_type.map_or(0, MsrpRequestType::to_raw))
    }

    fn msrp_byte_range(&self, handle: RawHandle) -> ByteRange {
        self.msrp(handle, ByteRange::UNSET, |message| {
            message.byte_range.unwrap_or(ByteRange::UNSET)
        })
    }

    fn msrp_is_last_chunk(&self, handle: RawHandle) -> bool {
        self.msrp(handle, false, |message| {
            message.continuation == Some(Continuation::Complete)
        })
    }

    fn msrp_is_first_chunk(&self, handle: RawHandle) -> bool {
        self.msrp(handle, false, |message| {
            message.byte_range.map_or(false, |range| range.start == 1)
        })
    }

    fn msrp_is_success_report(&self, handle: RawHandle) -> bool {
        self.msrp(handle, false, MsrpMessageRecord::is_success_report)
    }

    fn msrp_header_value(&self, handle: RawHandle, name: &str) -> Option<String> {
        self.msrp(handle, None, |message| {
            header_value(&message.headers, name, 0).map(str::to_string)
        })
    }

    fn msrp_header_param_value(
        &self,
        handle: RawHandle,
        name: &str,
        param: &str,
    ) -> Option<String> {
        self.msrp(handle, None, |message| {
            header_value(&message.headers, name, 0).and_then(|value| param_value(value, param))
        })
    }

    fn msrp_content_length(&self, handle: RawHandle) -> u32 {
        self.msrp(handle, 0, |message| wire_len(message.content.len()))
    }

    fn msrp_content(&self, handle: RawHandle, output: &mut [u8]) -> u32 {
        self.msrp(handle, 0, |message| copy_into(&message.content, output))
    }
}
