//! Walks an MSRP transfer through the bridge: a three-chunk SEND followed by a
//! success REPORT, with bridge logging enabled.
//!
//! Run with `RUST_LOG=rvoip_native_bridge=debug` to see each release.

use std::sync::Arc;

use rvoip_native_bridge::logging::setup_logging;
use rvoip_native_bridge::{
    BridgeConfig, ByteRange, Continuation, InMemoryEngine, MsrpMessage, MsrpMessageRecord,
    MsrpRequestType, NativeEngine, Owned,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BridgeConfig::default().apply_env_overrides()?;
    setup_logging(config.logging_config()?)?;

    let engine = Arc::new(InMemoryEngine::with_settings(&config.engine));
    let native: Arc<dyn NativeEngine> = engine.clone();

    let text = b"MSRP lets a session carry text and files in chunks.";
    let total = text.len() as i64;
    let mut received = Vec::new();

    for (index, chunk) in text.chunks(20).enumerate() {
        let start = (index * 20) as i64 + 1;
        let end = start + chunk.len() as i64 - 1;
        let continuation = if end == total {
            Continuation::Complete
        } else {
            Continuation::More
        };
        let record = MsrpMessageRecord::request(MsrpRequestType::Send)
            .with_header("Message-ID", "a1b2c3")
            .with_header("Content-Type", "text/plain;charset=UTF-8")
            .with_byte_range(ByteRange::new(start, end, total))
            .with_continuation(continuation)
            .with_content(chunk.to_vec());
        let handle = engine.insert_msrp_message(record)?;
        let message = Owned::<MsrpMessage>::from_raw(Arc::clone(&native), handle);

        let range = message.byte_range();
        println!(
            "{} chunk {}-{}/{} first={} last={}",
            message.request_type().map_or("?", |t| t.as_str()),
            range.start,
            range.end,
            range.total,
            message.is_first_chunk(),
            message.is_last_chunk(),
        );
        received.extend(message.read_content());
    }

    let report = Owned::<MsrpMessage>::from_raw(
        Arc::clone(&native),
        engine.insert_msrp_message(
            MsrpMessageRecord::request(MsrpRequestType::Report)
                .with_header("Message-ID", "a1b2c3")
                .with_header("Status", "000 200 OK")
                .with_byte_range(ByteRange::new(1, total, total)),
        )?,
    );
    println!("report success={}", report.is_success_report());
    report.release();

    println!("received: {}", String::from_utf8_lossy(&received));
    println!("engine: {:?}", engine.stats());
    Ok(())
}
