//! tests/common/mod.rs
#![allow(dead_code)]

use scalable_tcp::{sequence::SequenceNumber, transport::TransportAdapter};
use std::sync::{Arc, Mutex, Once};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "scalable_tcp=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A sender-side view of a transport: the first unacknowledged byte, the next
/// byte to send and the highest byte ever sent.
#[derive(Debug, Clone)]
pub struct SimTransport {
    pub head: SequenceNumber,
    pub next_tx: SequenceNumber,
    pub high_tx: SequenceNumber,
    pub closed: bool,
    pub retransmits: Vec<SequenceNumber>,
}

impl SimTransport {
    pub fn new(head: u32, in_flight: u32) -> Self {
        let head = SequenceNumber::new(head);
        Self {
            head,
            next_tx: head + in_flight,
            high_tx: head + in_flight,
            closed: false,
            retransmits: Vec::new(),
        }
    }

    /// Sends `bytes` of new data from `next_tx`.
    pub fn send(&mut self, bytes: u32) {
        self.next_tx = self.next_tx + bytes;
        if self.next_tx > self.high_tx {
            self.high_tx = self.next_tx;
        }
    }
}

impl TransportAdapter for SimTransport {
    fn head_sequence(&self) -> SequenceNumber {
        self.head
    }

    fn bytes_in_flight(&self) -> u32 {
        self.high_tx.distance_from(self.head)
    }

    fn request_retransmit(&mut self, sequence: SequenceNumber) {
        self.retransmits.push(sequence);
    }

    fn rewind_next_sequence(&mut self, sequence: SequenceNumber) {
        self.next_tx = sequence;
    }

    fn complete_ack_bookkeeping(&mut self, sequence: SequenceNumber) {
        self.head = sequence;
        if self.next_tx < self.head {
            self.next_tx = self.head;
        }
    }

    fn has_outstanding_data(&self) -> bool {
        self.head < self.high_tx
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A `SimTransport` shared between the test and a connection task.
#[derive(Debug, Clone)]
pub struct SharedSim(pub Arc<Mutex<SimTransport>>);

impl SharedSim {
    pub fn new(inner: SimTransport) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SimTransport) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

impl TransportAdapter for SharedSim {
    fn head_sequence(&self) -> SequenceNumber {
        self.with(|t| t.head_sequence())
    }

    fn bytes_in_flight(&self) -> u32 {
        self.with(|t| t.bytes_in_flight())
    }

    fn request_retransmit(&mut self, sequence: SequenceNumber) {
        self.with(|t| t.request_retransmit(sequence))
    }

    fn rewind_next_sequence(&mut self, sequence: SequenceNumber) {
        self.with(|t| t.rewind_next_sequence(sequence))
    }

    fn complete_ack_bookkeeping(&mut self, sequence: SequenceNumber) {
        self.with(|t| t.complete_ack_bookkeeping(sequence))
    }

    fn has_outstanding_data(&self) -> bool {
        self.with(|t| t.has_outstanding_data())
    }

    fn is_closed(&self) -> bool {
        self.with(|t| t.is_closed())
    }
}
