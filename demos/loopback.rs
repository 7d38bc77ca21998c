//! Loopback transport walkthrough.
//!
//! Demonstrates:
//! - Building a Bridge on a tokio-driven scheduler
//! - Calls buffered before the transport loads, then flushed in order
//! - Open, message and close events delivered to listeners
//! - Transport log lines forwarded to tracing
//!
//! Usage:
//!   cargo run --example loopback
//!   cargo run --example loopback -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use socket_bridge::protocol::encode_payload;
use socket_bridge::{
    Bridge, ChannelScheduler, ConnectOptions, CreateRequest, EventKind, RawNotification, SocketId,
    TransportHandle,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Loopback Transport
// ============================================================================

/// Transport that answers every create with `open` and echoes every send.
struct LoopbackTransport {
    bridge: Bridge,
    inbox: Mutex<Vec<RawNotification>>,
}

impl LoopbackTransport {
    fn new(bridge: Bridge) -> Arc<Self> {
        Arc::new(Self {
            bridge,
            inbox: Mutex::new(Vec::new()),
        })
    }

    fn post(&self, notification: RawNotification) {
        self.inbox.lock().push(notification);
        self.bridge.notify_events_available();
    }
}

impl TransportHandle for LoopbackTransport {
    fn create(&self, id: SocketId, request: &CreateRequest) {
        self.bridge
            .transport_log(&encode_payload(&format!("connecting {id} to {}", request.url)));

        let mut open = RawNotification::open(id);
        if let Some(protocol) = request.protocols.first() {
            open = open.with_protocol(protocol.clone());
        }
        self.post(open);
    }

    fn send(&self, id: SocketId, encoded_payload: &str) -> i64 {
        self.post(RawNotification::message(id, encoded_payload));
        -1
    }

    fn close(&self, id: SocketId) {
        self.post(RawNotification::close(id, true, 1000, "loopback done"));
    }

    fn load_policy_file(&self, url: &str) {
        self.bridge
            .transport_log(&encode_payload(&format!("policy file {url} loaded")));
    }

    fn receive_notifications(&self) -> Vec<RawNotification> {
        std::mem::take(&mut *self.inbox.lock())
    }

    fn set_caller_url(&self, url: &str) {
        self.bridge
            .transport_log(&encode_payload(&format!("caller {url}")));
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|arg| arg == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "socket_bridge=trace"
    } else {
        "socket_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run() -> Result<()> {
    println!("=== Loopback Bridge ===\n");

    // ========================================================================
    // Create Bridge
    // ========================================================================

    println!("[1] Creating bridge...");

    let (scheduler, scheduler_loop) = ChannelScheduler::new();
    tokio::spawn(scheduler_loop.run());

    let bridge = Bridge::builder()
        .scheduler(Arc::new(scheduler))
        .caller_url("https://example.com/loopback")
        .policy_file("xmlsocket://localhost:843")
        .build()?;

    println!("    ✓ Bridge ready (transport not loaded yet)\n");

    // ========================================================================
    // Connect Before Transport
    // ========================================================================

    println!("[2] Connecting...");

    let socket = bridge.connect(
        "ws://localhost:9000/echo",
        ConnectOptions::new().with_protocols(["echo", "chat"]),
    )?;

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<String>();

    let sender = socket.clone();
    socket.listen(EventKind::Open, move |_| {
        println!("    ✓ Open (protocol: {:?})", sender.protocol());
        for text in ["hello", "ünïcødé & spaces", "bye"] {
            if let Err(e) = sender.send(text) {
                eprintln!("    ✗ Send failed: {e}");
            }
        }
    });

    let closer = socket.clone();
    socket.listen(EventKind::Message, move |event| {
        let data = event.data().unwrap_or_default();
        println!("    ✓ Echo: {data}");
        if data == "bye" {
            closer.close();
        }
    });

    socket.set_handler(EventKind::Close, move |event| {
        if let Some(info) = event.close_info() {
            let _ = done_tx.send(format!("code {} ({})", info.code, info.reason));
        }
    });

    println!("    Ready state: {}\n", socket.ready_state());

    // ========================================================================
    // Load Transport
    // ========================================================================

    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("[3] Loading transport ({} calls buffered)...", bridge.pending_task_count());

    bridge.notify_initialized(LoopbackTransport::new(bridge.clone()));

    // ========================================================================
    // Wait For Close
    // ========================================================================

    let summary = tokio::time::timeout(Duration::from_secs(5), done_rx.recv())
        .await
        .context("timed out waiting for close")?;

    let Some(summary) = summary else {
        bail!("close handler dropped without reporting");
    };

    println!("    ✓ Closed: {summary}");
    println!("    Final state: {}", socket.ready_state());
    println!("    Sockets still registered: {}", bridge.socket_count());

    println!("\n=== Done ===");
    Ok(())
}
