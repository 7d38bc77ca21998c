//! Bridge context.
//!
//! One [`Bridge`] owns everything sockets share: the scheduler, the
//! deferred task queue in front of the transport, and the instance
//! registry. It also exposes the entry points the transport runtime calls
//! back into.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::error::Result;
use crate::protocol::{RawNotification, decode_payload};
use crate::socket::{ConnectOptions, WebSocket};
use crate::transport::{Scheduler, TaskQueue, TransportHandle};

use super::builder::BridgeBuilder;
use super::config::BridgeConfig;
use super::registry::{Lookup, Registry};

// ============================================================================
// Types
// ============================================================================

/// Shared state behind every [`Bridge`] clone.
struct BridgeInner {
    config: BridgeConfig,
    scheduler: Arc<dyn Scheduler>,
    queue: TaskQueue,
    registry: Registry,
}

// ============================================================================
// Bridge
// ============================================================================

/// Process-scoped bridge between socket facades and one transport.
///
/// Cloning is cheap; clones share the same context. Separate bridges are
/// fully isolated from each other.
///
/// # Transport Entry Points
///
/// | Method | Called when |
/// |--------|-------------|
/// | [`Bridge::notify_initialized`] | The transport has loaded |
/// | [`Bridge::notify_events_available`] | Notifications are waiting |
/// | [`Bridge::transport_log`] | The transport emits a log line |
/// | [`Bridge::transport_error`] | The transport emits an error line |
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

// ============================================================================
// Bridge - Constructor
// ============================================================================

impl Bridge {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Creates a bridge. Use [`Bridge::builder()`] instead.
    pub(crate) fn new(config: BridgeConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let policy_files = config.policy_files.clone();

        let bridge = Self {
            inner: Arc::new(BridgeInner {
                config,
                scheduler,
                queue: TaskQueue::new(),
                registry: Registry::default(),
            }),
        };

        for url in policy_files {
            bridge.load_policy_file(url);
        }

        debug!("Bridge created");
        bridge
    }
}

// ============================================================================
// Bridge - Public API
// ============================================================================

impl Bridge {
    /// Creates a socket on this bridge.
    ///
    /// Shorthand for [`WebSocket::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`](crate::Error::InvalidUrl) if `url` is
    /// not a WebSocket URL.
    pub fn connect(&self, url: &str, options: impl Into<ConnectOptions>) -> Result<WebSocket> {
        WebSocket::connect(self, url, options)
    }

    /// Asks the transport to load a socket policy file.
    ///
    /// Buffered until the transport is ready. Best effort.
    pub fn load_policy_file(&self, url: impl Into<String>) {
        let url = url.into();
        debug!(url = %url, "Policy file requested");
        self.inner
            .queue
            .enqueue(Box::new(move |handle: &dyn TransportHandle| {
                handle.load_policy_file(&url);
            }));
    }

    /// Returns `true` once the transport handle is installed.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.queue.is_ready()
    }

    /// Returns the number of sockets not yet closed.
    #[inline]
    #[must_use]
    pub fn socket_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Returns the number of transport calls waiting for readiness.
    #[inline]
    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.inner.queue.buffered_count()
    }

    /// Returns the bridge configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }
}

// ============================================================================
// Bridge - Transport Entry Points
// ============================================================================

impl Bridge {
    /// Signals that the transport has loaded.
    ///
    /// On the next scheduler turn the handle is installed, told the caller
    /// URL and debug flag, and every buffered call is flushed in order.
    /// Only the first call has any effect.
    pub fn notify_initialized(&self, handle: Arc<dyn TransportHandle>) {
        let bridge = self.clone();
        self.inner
            .scheduler
            .submit(Box::new(move || bridge.complete_initialization(handle)));
    }

    /// Signals that notifications are waiting.
    ///
    /// On the next scheduler turn the full batch is pulled from the
    /// transport and routed to the sockets. Always returns `true`.
    pub fn notify_events_available(&self) -> bool {
        let bridge = self.clone();
        self.inner
            .scheduler
            .submit(Box::new(move || bridge.pull_notifications()));
        true
    }

    /// Forwards a percent-encoded transport log line to `tracing`.
    pub fn transport_log(&self, message: &str) {
        info!(message = %decode_diagnostic(message), "Transport log");
    }

    /// Forwards a percent-encoded transport error line to `tracing`.
    pub fn transport_error(&self, message: &str) {
        error!(message = %decode_diagnostic(message), "Transport error");
    }
}

// ============================================================================
// Bridge - Internal
// ============================================================================

impl Bridge {
    #[inline]
    pub(crate) fn scheduler(&self) -> &dyn Scheduler {
        self.inner.scheduler.as_ref()
    }

    #[inline]
    pub(crate) fn queue(&self) -> &TaskQueue {
        &self.inner.queue
    }

    #[inline]
    pub(crate) fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Installs the handle and flushes the queue.
    fn complete_initialization(&self, handle: Arc<dyn TransportHandle>) {
        let config = &self.inner.config;

        let result = self.inner.queue.on_handle_ready(handle, |handle| {
            if let Some(ref url) = config.caller_url {
                handle.set_caller_url(url);
            }
            handle.set_debug(config.debug);
        });

        if let Err(e) = result {
            warn!(error = %e, "Ignoring repeated transport initialization");
        }
    }

    /// Pulls the available batch from the transport and routes it.
    fn pull_notifications(&self) {
        let Some(handle) = self.inner.queue.handle() else {
            warn!("Events signalled before transport ready");
            return;
        };

        let batch = handle.receive_notifications();
        trace!(count = batch.len(), "Notification batch received");
        self.deliver_batch(&batch);
    }

    /// Routes a batch in order. Returns the number delivered to a socket.
    pub(crate) fn deliver_batch(&self, batch: &[RawNotification]) -> usize {
        batch
            .iter()
            .filter(|notification| self.deliver(notification))
            .count()
    }

    /// Routes one notification to its socket.
    ///
    /// Returns `false` if no live socket had the target id.
    fn deliver(&self, notification: &RawNotification) -> bool {
        let id = notification.target_id;

        match self.inner.registry.lookup(id) {
            Lookup::Live(socket) => {
                socket.handle_notification(notification);
                true
            }
            Lookup::Retired => {
                warn!(
                    socket_id = %id,
                    kind = ?notification.kind,
                    "Notification for closed socket dropped"
                );
                false
            }
            Lookup::Unknown => {
                warn!(
                    socket_id = %id,
                    kind = ?notification.kind,
                    "Notification for unknown socket dropped"
                );
                false
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Decodes a transport diagnostic, falling back to the raw text.
fn decode_diagnostic(message: &str) -> Cow<'_, str> {
    decode_payload(message).unwrap_or(Cow::Borrowed(message))
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("ready", &self.is_ready())
            .field("sockets", &self.socket_count())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use proptest::prelude::*;

    use crate::identifiers::SocketId;
    use crate::protocol::{EventKind, SocketEvent};
    use crate::socket::ReadyState;
    use crate::testing::{RecordingTransport, TransportCall};
    use crate::transport::ManualScheduler;

    fn setup() -> (Bridge, Arc<ManualScheduler>, Arc<RecordingTransport>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let bridge = Bridge::builder()
            .scheduler(scheduler.clone())
            .build()
            .expect("build bridge");
        (bridge, scheduler, RecordingTransport::new())
    }

    fn connect(bridge: &Bridge) -> WebSocket {
        bridge
            .connect("ws://example.com/", ConnectOptions::new())
            .expect("connect")
    }

    #[test]
    fn test_creates_flush_in_construction_order() {
        let (bridge, scheduler, transport) = setup();
        let sockets: Vec<_> = (0..4).map(|_| connect(&bridge)).collect();

        scheduler.drain();
        assert!(transport.calls().is_empty());
        assert_eq!(bridge.pending_task_count(), 4);

        bridge.notify_initialized(transport.clone());
        assert!(!bridge.is_ready());
        scheduler.drain();

        assert!(bridge.is_ready());
        let expected: Vec<_> = sockets.iter().map(WebSocket::id).collect();
        assert_eq!(transport.created_ids(), expected);
    }

    #[test]
    fn test_initialization_handshake() {
        let scheduler = Arc::new(ManualScheduler::new());
        let bridge = Bridge::builder()
            .scheduler(scheduler.clone())
            .caller_url("https://example.com/page")
            .debug(true)
            .policy_file("xmlsocket://example.com:843")
            .build()
            .expect("build bridge");
        let transport = RecordingTransport::new();

        bridge.notify_initialized(transport.clone());
        scheduler.drain();

        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::SetCallerUrl("https://example.com/page".into()),
                TransportCall::SetDebug(true),
                TransportCall::LoadPolicyFile("xmlsocket://example.com:843".into()),
            ]
        );
    }

    #[test]
    fn test_repeated_initialization_ignored() {
        let (bridge, scheduler, transport) = setup();
        let other = RecordingTransport::new();

        bridge.notify_initialized(transport.clone());
        bridge.notify_initialized(other.clone());
        scheduler.drain();

        connect(&bridge);
        scheduler.drain();

        assert_eq!(transport.created_ids().len(), 1);
        assert!(other.calls().is_empty());
    }

    #[test]
    fn test_batch_drives_lifecycle_in_order() {
        let (bridge, scheduler, transport) = setup();
        bridge.notify_initialized(transport.clone());
        let socket = connect(&bridge);
        scheduler.drain();

        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = Arc::clone(&log);
            let observed = socket.clone();
            socket.listen(kind, move |event| {
                log.lock().push((event.clone(), observed.ready_state()));
            });
        }

        let id = socket.id();
        transport.push_all([
            RawNotification::open(id),
            RawNotification::message(id, "hi"),
            RawNotification::close(id, true, 1000, ""),
        ]);
        assert!(bridge.notify_events_available());
        scheduler.drain();

        let log = log.lock();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], (SocketEvent::Open, ReadyState::Open));
        assert_eq!(log[1].0.data(), Some("hi"));
        assert_eq!(log[1].1, ReadyState::Open);
        assert_eq!(log[2].0.kind(), EventKind::Close);
        assert_eq!(log[2].1, ReadyState::Closed);
        assert_eq!(bridge.socket_count(), 0);
    }

    #[test]
    fn test_unknown_id_has_no_side_effects() {
        let (bridge, scheduler, transport) = setup();
        bridge.notify_initialized(transport.clone());
        let socket = connect(&bridge);
        scheduler.drain();

        let fired = Arc::new(Mutex::new(0usize));
        for kind in EventKind::ALL {
            let fired = Arc::clone(&fired);
            socket.listen(kind, move |_| *fired.lock() += 1);
        }

        let stranger = SocketId::new(socket.id().as_u32() + 100);
        transport.push_all([
            RawNotification::open(stranger),
            RawNotification::message(stranger, "x"),
            RawNotification::close(stranger, true, 1000, ""),
        ]);
        bridge.notify_events_available();
        scheduler.drain();

        assert_eq!(*fired.lock(), 0);
        assert_eq!(socket.ready_state(), ReadyState::Connecting);
    }

    #[test]
    fn test_repeated_close_notification_ignored() {
        let (bridge, scheduler, transport) = setup();
        bridge.notify_initialized(transport.clone());
        let socket = connect(&bridge);
        scheduler.drain();

        let closes = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&closes);
        socket.listen(EventKind::Close, move |_| *counter.lock() += 1);

        let id = socket.id();
        let batch = [
            RawNotification::open(id),
            RawNotification::close(id, true, 1000, ""),
            RawNotification::close(id, true, 1000, ""),
        ];
        assert_eq!(bridge.deliver_batch(&batch), 2);
        assert_eq!(*closes.lock(), 1);
        assert_eq!(socket.ready_state(), ReadyState::Closed);
    }

    #[test]
    fn test_socket_deregistered_before_close_event() {
        let (bridge, scheduler, transport) = setup();
        bridge.notify_initialized(transport.clone());
        let socket = connect(&bridge);
        scheduler.drain();

        let seen = Arc::new(Mutex::new(None));
        let observed = Arc::clone(&seen);
        let observer = bridge.clone();
        socket.set_handler(EventKind::Close, move |_| {
            *observed.lock() = Some(observer.socket_count());
        });

        transport.push(RawNotification::open(socket.id()));
        transport.push(RawNotification::close(socket.id(), true, 1000, ""));
        bridge.notify_events_available();
        scheduler.drain();

        assert_eq!(*seen.lock(), Some(0));
        assert_eq!(bridge.socket_count(), 0);
    }

    #[test]
    fn test_malformed_payload_isolated_to_one_notification() {
        let (bridge, scheduler, transport) = setup();
        bridge.notify_initialized(transport.clone());
        let first = connect(&bridge);
        let second = connect(&bridge);
        scheduler.drain();

        let messages = Arc::new(Mutex::new(Vec::new()));
        for socket in [&first, &second] {
            let id = socket.id();
            let on_message = Arc::clone(&messages);
            socket.listen(EventKind::Message, move |event| {
                on_message.lock().push((id, event.data().map(str::to_string)));
            });
            let on_error = Arc::clone(&messages);
            socket.listen(EventKind::Error, move |_| on_error.lock().push((id, None)));
        }

        let batch = [
            RawNotification::open(first.id()),
            RawNotification::open(second.id()),
            RawNotification::message(first.id(), "%FF"),
            RawNotification::message(second.id(), "ok"),
        ];
        assert_eq!(bridge.deliver_batch(&batch), 4);

        assert_eq!(
            *messages.lock(),
            vec![(first.id(), None), (second.id(), Some("ok".to_string()))]
        );
        assert_eq!(first.ready_state(), ReadyState::Open);
    }

    #[test]
    fn test_events_before_ready_are_dropped() {
        let (bridge, scheduler, _) = setup();
        bridge.notify_events_available();

        // Should not panic
        assert_eq!(scheduler.drain(), 1);
    }

    #[test]
    fn test_send_after_abort_reports_not_ready() {
        let (bridge, _, _) = setup();
        let socket = connect(&bridge);
        socket.close();

        let err = socket.send("late").unwrap_err();
        assert!(matches!(err, crate::Error::TransportNotReady));
    }

    #[test]
    fn test_transport_diagnostics_do_not_panic() {
        let (bridge, _, _) = setup();
        bridge.transport_log("connected%20to%20host");
        bridge.transport_error("%FF broken");
        assert_eq!(decode_diagnostic("a%20b"), "a b");
        assert_eq!(decode_diagnostic("%FF"), "%FF");
    }

    proptest! {
        #[test]
        fn prop_pre_ready_creates_flush_fifo(aborted in proptest::collection::vec(any::<bool>(), 1..24)) {
            let (bridge, scheduler, transport) = setup();

            let sockets: Vec<_> = aborted.iter().map(|_| connect(&bridge)).collect();
            for (socket, abort) in sockets.iter().zip(&aborted) {
                if *abort {
                    socket.close();
                }
            }

            scheduler.drain();
            prop_assert!(transport.calls().is_empty());

            bridge.notify_initialized(transport.clone());
            scheduler.drain();

            let expected: Vec<SocketId> = sockets
                .iter()
                .zip(&aborted)
                .filter(|(_, abort)| !**abort)
                .map(|(socket, _)| socket.id())
                .collect();
            prop_assert_eq!(transport.created_ids(), expected);

            for (socket, abort) in sockets.iter().zip(&aborted) {
                let expected_state = if *abort { ReadyState::Closed } else { ReadyState::Connecting };
                prop_assert_eq!(socket.ready_state(), expected_state);
            }
        }

        #[test]
        fn prop_buffered_amount_accumulates(results in proptest::collection::vec(-3i64..64, 1..16)) {
            let (bridge, scheduler, transport) = setup();
            bridge.notify_initialized(transport.clone());
            let socket = connect(&bridge);
            scheduler.drain();
            bridge.deliver_batch(&[RawNotification::open(socket.id())]);

            let mut expected = 0u64;
            for result in results {
                transport.set_send_result(result);
                let accepted = socket.send("payload").expect("send");
                prop_assert_eq!(accepted, result < 0);
                if result >= 0 {
                    expected += result as u64;
                }
                prop_assert_eq!(socket.buffered_amount(), expected);
            }
        }
    }
}
