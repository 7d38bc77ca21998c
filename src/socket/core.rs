//! Socket facade.
//!
//! A [`WebSocket`] is the per-connection object application code holds.
//! It owns the connection's lifecycle state and listener registry; the
//! bridge routes inbound notifications to it by id.
//!
//! # Lifecycle
//!
//! ```text
//! CONNECTING ──open──► OPEN ──close()──► CLOSING ──close──► CLOSED
//!     │                  └──────────────close───────────────►  ▲
//!     └──close() before the create task ran──────────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::bridge::Bridge;
use crate::bridge::translator;
use crate::error::{Error, Result};
use crate::identifiers::SocketId;
use crate::protocol::{EventKind, RawNotification, SocketEvent, encode_payload};
use crate::transport::{CreateRequest, PendingTask, TransportHandle};

use super::listeners::{Listener, ListenerSet};
use super::options::ConnectOptions;
use super::state::ReadyState;

// ============================================================================
// Types
// ============================================================================

/// Mutable per-socket state, guarded by one lock.
struct SocketState {
    ready_state: ReadyState,
    buffered_amount: u64,
    protocol: Option<String>,
    listeners: ListenerSet,
    /// Set until the create call reaches the transport or is cancelled.
    create_task: Option<PendingTask>,
}

/// Shared state behind every [`WebSocket`] clone.
struct SocketInner {
    id: SocketId,
    url: String,
    options: ConnectOptions,
    bridge: Bridge,
    state: Mutex<SocketState>,
}

// ============================================================================
// WebSocket
// ============================================================================

/// Standards-shaped WebSocket backed by the bridge's transport.
///
/// Cloning is cheap; clones share the same connection. A socket stays
/// registered with its bridge until it reaches [`ReadyState::Closed`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use socket_bridge::{Bridge, EventKind, ManualScheduler, WebSocket};
///
/// # fn example() -> socket_bridge::Result<()> {
/// let scheduler = Arc::new(ManualScheduler::new());
/// let bridge = Bridge::builder().scheduler(scheduler.clone()).build()?;
///
/// let socket = WebSocket::connect(&bridge, "ws://example.com/chat", "chat")?;
/// socket.listen(EventKind::Message, |event| {
///     println!("received {:?}", event.data());
/// });
/// assert_eq!(socket.ready_state(), WebSocket::CONNECTING);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Clone)]
pub struct WebSocket {
    inner: Arc<SocketInner>,
}

// ============================================================================
// WebSocket - Constants
// ============================================================================

impl WebSocket {
    /// Connection not yet established.
    pub const CONNECTING: ReadyState = ReadyState::Connecting;
    /// Connection established.
    pub const OPEN: ReadyState = ReadyState::Open;
    /// Close requested.
    pub const CLOSING: ReadyState = ReadyState::Closing;
    /// Connection finished.
    pub const CLOSED: ReadyState = ReadyState::Closed;
}

// ============================================================================
// WebSocket - Constructor
// ============================================================================

impl WebSocket {
    /// Creates a socket and schedules its transport connection.
    ///
    /// The create call is submitted to the bridge's scheduler and runs on
    /// a later turn, so listeners attached right after this returns never
    /// miss an event.
    ///
    /// # Arguments
    ///
    /// * `bridge` - Bridge context the socket belongs to
    /// * `url` - `ws://` or `wss://` URL
    /// * `options` - Sub-protocols and transport options; a bare `&str`
    ///   is a single sub-protocol
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is not a WebSocket URL
    /// - [`Error::IdsExhausted`] if the bridge has no ids left
    pub fn connect(
        bridge: &Bridge,
        url: &str,
        options: impl Into<ConnectOptions>,
    ) -> Result<Self> {
        let url = validate_url(url)?;
        let options = options.into();
        let id = bridge.registry().allocate_id()?;
        let create_task = PendingTask::new();

        let socket = Self {
            inner: Arc::new(SocketInner {
                id,
                url,
                options,
                bridge: bridge.clone(),
                state: Mutex::new(SocketState {
                    ready_state: ReadyState::Connecting,
                    buffered_amount: 0,
                    protocol: None,
                    listeners: ListenerSet::default(),
                    create_task: Some(create_task.clone()),
                }),
            }),
        };

        bridge.registry().insert(socket.clone());
        socket.schedule_create(create_task);

        debug!(socket_id = %id, url = %socket.inner.url, "Socket created");
        Ok(socket)
    }

    /// Submits the create call for the next scheduler turn.
    fn schedule_create(&self, task: PendingTask) {
        let socket = self.clone();

        self.inner.bridge.scheduler().submit(Box::new(move || {
            if task.is_cancelled() {
                trace!(socket_id = %socket.id(), "Create task cancelled before scheduling");
                return;
            }

            let queued = socket.clone();
            socket
                .inner
                .bridge
                .queue()
                .enqueue(Box::new(move |handle: &dyn TransportHandle| {
                    queued.run_create(handle, &task);
                }));
        }));
    }

    /// Issues the transport-level create, unless cancelled meanwhile.
    fn run_create(&self, handle: &dyn TransportHandle, task: &PendingTask) {
        if !task.try_begin() {
            debug!(socket_id = %self.id(), "Create cancelled before reaching transport");
            return;
        }

        self.inner.state.lock().create_task = None;

        let request = CreateRequest {
            url: self.inner.url.clone(),
            protocols: self.inner.options.protocols.clone(),
            proxy_host: self.inner.options.proxy_host.clone(),
            proxy_port: self.inner.options.proxy_port,
            headers: self.inner.options.headers.clone(),
        };
        handle.create(self.id(), &request);

        trace!(socket_id = %self.id(), "Transport create issued");
    }
}

// ============================================================================
// WebSocket - Public API
// ============================================================================

impl WebSocket {
    /// Sends a text payload.
    ///
    /// Returns `Ok(true)` when the transport accepted the whole payload and
    /// `Ok(false)` when part of it did not fit into the transport buffer;
    /// the unaccepted byte count is added to [`WebSocket::buffered_amount`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] while the socket is still connecting
    /// - [`Error::TransportNotReady`] if the socket never reached the
    ///   transport
    pub fn send(&self, data: &str) -> Result<bool> {
        let state = self.ready_state();
        if state == ReadyState::Connecting {
            return Err(Error::invalid_state(self.id(), state, "send"));
        }

        let handle = self
            .inner
            .bridge
            .queue()
            .handle()
            .ok_or(Error::TransportNotReady)?;

        let result = handle.send(self.id(), &encode_payload(data));

        match u64::try_from(result) {
            Err(_) => {
                trace!(socket_id = %self.id(), bytes = data.len(), "Payload accepted");
                Ok(true)
            }
            Ok(unaccepted) => {
                let mut state = self.inner.state.lock();
                state.buffered_amount = state.buffered_amount.saturating_add(unaccepted);
                debug!(
                    socket_id = %self.id(),
                    unaccepted,
                    buffered = state.buffered_amount,
                    "Transport buffer full"
                );
                Ok(false)
            }
        }
    }

    /// Closes the connection.
    ///
    /// If the create call has not reached the transport yet it is
    /// cancelled and the socket becomes [`ReadyState::Closed`] at once.
    /// Otherwise the socket becomes [`ReadyState::Closing`] and waits for
    /// the transport's close notification. Calling it again is a no-op.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();

        if let Some(task) = state.create_task.take()
            && task.try_cancel()
        {
            state.ready_state = ReadyState::Closed;
            drop(state);

            self.inner.bridge.registry().remove(self.id());
            debug!(socket_id = %self.id(), "Socket closed before connecting");
            return;
        }

        if matches!(state.ready_state, ReadyState::Closing | ReadyState::Closed) {
            trace!(socket_id = %self.id(), state = %state.ready_state, "Close ignored");
            return;
        }

        state.ready_state = ReadyState::Closing;
        drop(state);

        let id = self.id();
        self.inner
            .bridge
            .queue()
            .enqueue(Box::new(move |handle: &dyn TransportHandle| handle.close(id)));

        debug!(socket_id = %id, "Socket closing");
    }

    /// Registers a listener for `kind`.
    ///
    /// Listeners run in registration order, before the handler slot.
    pub fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.inner.state.lock().listeners.add(kind, listener);
    }

    /// Registers a closure as a listener and returns it for later removal.
    pub fn listen<F>(&self, kind: EventKind, callback: F) -> Listener
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(callback);
        self.add_listener(kind, Arc::clone(&listener));
        listener
    }

    /// Removes a listener. No-op if it is not registered.
    pub fn remove_listener(&self, kind: EventKind, listener: &Listener) {
        if !self.inner.state.lock().listeners.remove(kind, listener) {
            trace!(socket_id = %self.id(), %kind, "Listener not registered");
        }
    }

    /// Sets the handler slot for `kind`, replacing any previous handler.
    ///
    /// The handler runs after every listener of the same kind.
    pub fn set_handler<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        self.inner
            .state
            .lock()
            .listeners
            .set_handler(kind, Some(Arc::new(handler)));
    }

    /// Clears the handler slot for `kind`.
    pub fn clear_handler(&self, kind: EventKind) {
        self.inner.state.lock().listeners.set_handler(kind, None);
    }

    /// Returns `true` if a handler is set for `kind`.
    #[must_use]
    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.inner.state.lock().listeners.has_handler(kind)
    }

    /// Returns the number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.state.lock().listeners.count(kind)
    }
}

// ============================================================================
// WebSocket - Accessors
// ============================================================================

impl WebSocket {
    /// Returns the socket id shared with the transport.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SocketId {
        self.inner.id
    }

    /// Returns the normalized target URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns the sub-protocols requested at construction.
    #[inline]
    #[must_use]
    pub fn requested_protocols(&self) -> &[String] {
        &self.inner.options.protocols
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.inner.state.lock().ready_state
    }

    /// Returns the number of bytes the transport has not yet accepted.
    #[inline]
    #[must_use]
    pub fn buffered_amount(&self) -> u64 {
        self.inner.state.lock().buffered_amount
    }

    /// Returns the sub-protocol selected by the server, once known.
    #[inline]
    #[must_use]
    pub fn protocol(&self) -> Option<String> {
        self.inner.state.lock().protocol.clone()
    }
}

// ============================================================================
// WebSocket - Notification Handling
// ============================================================================

impl WebSocket {
    /// Applies one inbound notification and dispatches its event.
    ///
    /// A socket that reaches CLOSED leaves the registry before its close
    /// event fires. Returns `true` if the socket is closed.
    pub(crate) fn handle_notification(&self, notification: &RawNotification) -> bool {
        let id = self.id();
        let translated = translator::translate(notification);

        let mut state = self.inner.state.lock();
        if state.ready_state.is_terminal() {
            debug!(
                socket_id = %id,
                kind = ?notification.kind,
                "Notification for closed socket ignored"
            );
            return true;
        }

        let event = match translated {
            Ok(event) => {
                Self::apply_transition(id, &mut state, notification);
                event
            }
            Err(e @ Error::Decode { .. }) => {
                warn!(socket_id = %id, error = %e, "Undeliverable notification payload");
                SocketEvent::Error
            }
            Err(e) => {
                warn!(socket_id = %id, error = %e, "Dropping notification");
                return false;
            }
        };

        let targets = state.listeners.targets(event.kind());
        let closed = state.ready_state.is_terminal();
        drop(state);

        if closed && self.inner.bridge.registry().remove(id) {
            debug!(socket_id = %id, "Socket deregistered");
        }

        trace!(
            socket_id = %id,
            kind = %event.kind(),
            listeners = targets.len(),
            "Dispatching event"
        );
        for target in targets {
            target(&event);
        }

        closed
    }

    /// Updates `readyState` and `protocol` from a notification.
    fn apply_transition(id: SocketId, state: &mut SocketState, notification: &RawNotification) {
        if let Some(protocol) = &notification.protocol {
            state.protocol = Some(protocol.clone());
        }

        let Some(next) = translator::target_state(notification) else {
            return;
        };

        let current = state.ready_state;
        if next == current {
            return;
        }

        if current.can_advance_to(next) {
            state.ready_state = next;
            debug!(socket_id = %id, from = %current, to = %next, "State changed");
        } else {
            debug!(
                socket_id = %id,
                current = %current,
                hint = %next,
                "Ignoring backward state hint"
            );
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocket")
            .field("id", &self.id())
            .field("url", &self.url())
            .field("ready_state", &self.ready_state())
            .finish_non_exhaustive()
    }
}

impl PartialEq for WebSocket {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for WebSocket {}

// ============================================================================
// URL Validation
// ============================================================================

/// Checks that `url` is an absolute `ws`/`wss` URL without a fragment.
fn validate_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e.to_string()))?;

    if !matches!(parsed.scheme(), "ws" | "wss") {
        return Err(Error::invalid_url(
            url,
            format!("scheme must be ws or wss, got {}", parsed.scheme()),
        ));
    }

    if parsed.fragment().is_some() {
        return Err(Error::invalid_url(url, "fragments are not allowed"));
    }

    Ok(parsed.into())
}

// ============================================================================
// Tests
// ============================================================================
