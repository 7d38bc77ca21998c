//! Test doubles shared by unit tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::identifiers::SocketId;
use crate::protocol::RawNotification;
use crate::transport::{CreateRequest, TransportHandle};

// ============================================================================
// TransportCall
// ============================================================================

/// One recorded call into the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportCall {
    Create(SocketId, CreateRequest),
    Send(SocketId, String),
    Close(SocketId),
    LoadPolicyFile(String),
    SetCallerUrl(String),
    SetDebug(bool),
}

// ============================================================================
// RecordingTransport
// ============================================================================

/// Transport handle that records calls and replays scripted notifications.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    send_result: Mutex<i64>,
    inbox: Mutex<Vec<RawNotification>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            send_result: Mutex::new(-1),
            ..Default::default()
        })
    }

    pub(crate) fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_for(&self, id: SocketId) -> Vec<TransportCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| match call {
                TransportCall::Create(target, _)
                | TransportCall::Send(target, _)
                | TransportCall::Close(target) => *target == id,
                _ => false,
            })
            .cloned()
            .collect()
    }

    pub(crate) fn created_ids(&self) -> Vec<SocketId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                TransportCall::Create(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn set_send_result(&self, result: i64) {
        *self.send_result.lock() = result;
    }

    pub(crate) fn push(&self, notification: RawNotification) {
        self.inbox.lock().push(notification);
    }

    pub(crate) fn push_all(&self, notifications: impl IntoIterator<Item = RawNotification>) {
        self.inbox.lock().extend(notifications);
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().push(call);
    }
}

impl TransportHandle for RecordingTransport {
    fn create(&self, id: SocketId, request: &CreateRequest) {
        self.record(TransportCall::Create(id, request.clone()));
    }

    fn send(&self, id: SocketId, encoded_payload: &str) -> i64 {
        self.record(TransportCall::Send(id, encoded_payload.to_string()));
        *self.send_result.lock()
    }

    fn close(&self, id: SocketId) {
        self.record(TransportCall::Close(id));
    }

    fn load_policy_file(&self, url: &str) {
        self.record(TransportCall::LoadPolicyFile(url.to_string()));
    }

    fn receive_notifications(&self) -> Vec<RawNotification> {
        std::mem::take(&mut *self.inbox.lock())
    }

    fn set_caller_url(&self, url: &str) {
        self.record(TransportCall::SetCallerUrl(url.to_string()));
    }

    fn set_debug(&self, debug: bool) {
        self.record(TransportCall::SetDebug(debug));
    }
}
