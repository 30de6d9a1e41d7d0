//! Integration tests for the gateway: a real server on an ephemeral port,
//! driven through a real WebSocket client.
//!
//! # What these tests exercise
//!
//! - The happy path: handshake acknowledgment, then surveillance messages
//!   answered with the encoded frames' hexadecimal form.
//! - The error paths: malformed payloads, unsupported kinds, and missing
//!   fields each earn exactly one failure envelope naming the cause, and the
//!   connection stays usable afterwards.
//! - Persistence: raw frame bytes land in the sample log as contiguous
//!   batches, also under concurrent sessions.
//!
//! ```text
//! test client                         gateway
//! ───────────                         ───────
//! {"type":"init"}               ──►
//!                               ◄──   {"type":"init_ack",...}
//! {"message_type":"callsign",…} ──►
//!                               ◄──   {"status":"success","adsb_hex_frames":[…]}
//!                                     └─► sample log gains the raw bytes
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use adsb_core::TransponderIdentity;
use adsb_gateway::domain::GatewayConfig;
use adsb_gateway::infrastructure::serve;

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Test harness ──────────────────────────────────────────────────────────────

/// Boots a gateway on an ephemeral loopback port with a fresh sample log.
/// The spawned server dies with the test's runtime.
async fn start_gateway(identity: TransponderIdentity) -> (SocketAddr, PathBuf) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let sample_path =
        std::env::temp_dir().join(format!("adsb-gateway-test-{}.bin", Uuid::new_v4()));

    let config = GatewayConfig {
        ws_bind_addr: addr,
        sample_path: sample_path.clone(),
        identity,
    };
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(serve(listener, config, running));

    (addr, sample_path)
}

async fn connect(addr: SocketAddr) -> ClientStream {
    let (ws, _response) = connect_async(format!("ws://{addr}")).await.unwrap();
    ws
}

/// Sends one JSON payload and returns the next text reply, decoded.
async fn request(ws: &mut ClientStream, payload: &str) -> Value {
    ws.send(Message::Text(payload.to_string())).await.unwrap();
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("expected a text reply, got {other:?}"),
        }
    }
}

/// Polls until the sample log reaches `expected` bytes of content.
/// Persistence is detached from the response path, so the test must wait.
async fn wait_for_sample_len(path: &PathBuf, expected: usize) -> Vec<u8> {
    for _ in 0..200 {
        if let Ok(content) = tokio::fs::read(path).await {
            if content.len() >= expected {
                return content;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("sample log never reached {expected} bytes");
}

fn reference_identity() -> TransponderIdentity {
    TransponderIdentity::new(17, 0x48_40D6, 5).unwrap()
}

/// The known-good frame for callsign `KLM1023` under [`reference_identity`].
const KLM_FRAME_HEX: &str = "8D4840D6202CC371C32CE0576098";

// ── Handshake and happy path ──────────────────────────────────────────────────

#[tokio::test]
async fn handshake_is_acknowledged_and_repeatable() {
    let (addr, _samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    for _ in 0..3 {
        let reply = request(&mut ws, r#"{"type":"init"}"#).await;
        assert_eq!(
            reply,
            json!({
                "type": "init_ack",
                "status": "success",
                "message": "Server acknowledges connection.",
            })
        );
    }
}

#[tokio::test]
async fn callsign_message_returns_reference_frame_and_persists_bytes() {
    let (addr, samples) = start_gateway(reference_identity()).await;
    let mut ws = connect(addr).await;

    let reply = request(
        &mut ws,
        r#"{"message_type":"callsign","callsign":"KLM1023"}"#,
    )
    .await;
    assert_eq!(
        reply,
        json!({"status": "success", "adsb_hex_frames": [KLM_FRAME_HEX]})
    );

    // The raw frame bytes follow on the detached persistence path.
    let content = wait_for_sample_len(&samples, 14).await;
    let expected: Vec<u8> = (0..KLM_FRAME_HEX.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&KLM_FRAME_HEX[i..i + 2], 16).unwrap())
        .collect();
    assert_eq!(content, expected);

    tokio::fs::remove_file(&samples).await.unwrap();
}

#[tokio::test]
async fn airborne_position_returns_even_and_odd_frames() {
    let (addr, samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    let reply = request(
        &mut ws,
        r#"{"message_type":"airborne_position","lat":52.2572,"lon":3.91937,"altitude":38000,"tc":11}"#,
    )
    .await;

    assert_eq!(reply["status"], "success");
    let frames = reply["adsb_hex_frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2, "even and odd frame");
    for frame in frames {
        assert_eq!(frame.as_str().unwrap().len(), 28, "14 bytes as hex");
    }

    // The persisted batch is even-then-odd as one contiguous unit.
    let content = wait_for_sample_len(&samples, 28).await;
    let mut expected = Vec::new();
    for frame in frames {
        let hex = frame.as_str().unwrap();
        expected.extend(
            (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap()),
        );
    }
    assert_eq!(content, expected);

    tokio::fs::remove_file(&samples).await.unwrap();
}

#[tokio::test]
async fn mode_a_message_returns_register_frame() {
    let (addr, samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    let reply = request(&mut ws, r#"{"message_type":"modeA","modeA_code":"7700"}"#).await;
    assert_eq!(
        reply,
        json!({"status": "success", "adsb_hex_frames": ["000AAA"]})
    );

    let content = wait_for_sample_len(&samples, 3).await;
    assert_eq!(content, vec![0x00, 0x0A, 0xAA]);

    tokio::fs::remove_file(&samples).await.unwrap();
}

// ── Failure paths keep the session alive ──────────────────────────────────────

#[tokio::test]
async fn malformed_json_earns_failure_and_session_survives() {
    let (addr, _samples) = start_gateway(reference_identity()).await;
    let mut ws = connect(addr).await;

    let reply = request(&mut ws, "{this is not json").await;
    assert_eq!(
        reply,
        json!({"status": "failure", "reason": "invalid payload encoding"})
    );

    // The connection must remain usable after the failure.
    let reply = request(
        &mut ws,
        r#"{"message_type":"callsign","callsign":"KLM1023"}"#,
    )
    .await;
    assert_eq!(reply["status"], "success");
}

#[tokio::test]
async fn unsupported_message_type_is_named_in_the_reason() {
    let (addr, _samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    let reply = request(&mut ws, r#"{"message_type":"weather_report","temp":21}"#).await;
    assert_eq!(
        reply,
        json!({"status": "failure", "reason": "unsupported message type: weather_report"})
    );

    // Still open: the handshake works afterwards.
    let reply = request(&mut ws, r#"{"type":"init"}"#).await;
    assert_eq!(reply["type"], "init_ack");
}

#[tokio::test]
async fn missing_required_field_is_named_in_the_reason() {
    let (addr, _samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    let reply = request(
        &mut ws,
        r#"{"message_type":"airborne_position","lon":4.0,"altitude":38000}"#,
    )
    .await;
    assert_eq!(
        reply,
        json!({"status": "failure", "reason": "missing required field: lat"})
    );
}

#[tokio::test]
async fn unencodable_input_is_invalid_data() {
    let (addr, _samples) = start_gateway(TransponderIdentity::default()).await;
    let mut ws = connect(addr).await;

    // Latitude beyond the poles cannot be position-encoded.
    let reply = request(
        &mut ws,
        r#"{"message_type":"airborne_position","lat":95.0,"lon":4.0,"altitude":38000}"#,
    )
    .await;
    assert_eq!(reply, json!({"status": "failure", "reason": "invalid data"}));
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_sessions_persist_whole_batches() {
    let (addr, samples) = start_gateway(reference_identity()).await;

    // Two clients encode different callsigns at the same time; the sample
    // log must contain both 14-byte frames as contiguous, unsplit units in
    // some order.
    let client = |callsign: &'static str| async move {
        let mut ws = connect(addr).await;
        let payload = format!(r#"{{"message_type":"callsign","callsign":"{callsign}"}}"#);
        let reply = request(&mut ws, &payload).await;
        assert_eq!(reply["status"], "success");
        let hex = reply["adsb_hex_frames"][0].as_str().unwrap().to_string();
        (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
            .collect::<Vec<u8>>()
    };

    let (frame_a, frame_b) = tokio::join!(client("KLM1023"), client("UAL123"));

    let content = wait_for_sample_len(&samples, 28).await;
    assert_eq!(content.len(), 28);
    let (first, second) = content.split_at(14);
    assert!(
        (first == frame_a && second == frame_b) || (first == frame_b && second == frame_a),
        "batches must appear whole, in either order"
    );

    tokio::fs::remove_file(&samples).await.unwrap();
}
