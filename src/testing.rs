//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::{sequence::SequenceNumber, transport::TransportAdapter};
use std::sync::{Arc, Mutex};

/// An in-memory transport that records every request the controller makes.
///
/// `head` is the first unacknowledged byte and `high_tx` one past the last
/// byte sent. Acknowledging moves `head`; nothing is ever actually sent.
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub head: SequenceNumber,
    pub high_tx: SequenceNumber,
    pub next_tx: SequenceNumber,
    pub closed: bool,
    pub advertised_window: u32,
    pub retransmits: Vec<SequenceNumber>,
    pub bookkeeping: Vec<SequenceNumber>,
}

impl MockTransport {
    pub fn new(head: u32) -> Self {
        let head = SequenceNumber::new(head);
        Self {
            head,
            high_tx: head,
            next_tx: head,
            closed: false,
            advertised_window: u32::MAX,
            retransmits: Vec::new(),
            bookkeeping: Vec::new(),
        }
    }

    /// Pretends `bytes` more were sent.
    pub fn send(&mut self, bytes: u32) {
        self.high_tx = self.high_tx + bytes;
        self.next_tx = self.high_tx;
    }

    /// A transport with `bytes_in_flight` outstanding bytes starting at `head`.
    pub fn with_in_flight(head: u32, bytes_in_flight: u32) -> Self {
        let mut transport = Self::new(head);
        transport.send(bytes_in_flight);
        transport
    }
}

impl TransportAdapter for MockTransport {
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
        self.bookkeeping.push(sequence);
        if sequence > self.head {
            self.head = sequence;
        }
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

    fn advertised_window(&self) -> u32 {
        self.advertised_window
    }
}

/// A `MockTransport` the test keeps a handle to after moving it into a
/// connection task.
#[derive(Debug, Clone)]
pub struct SharedTransport(pub Arc<Mutex<MockTransport>>);

impl SharedTransport {
    pub fn new(inner: MockTransport) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockTransport) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }
}

impl TransportAdapter for SharedTransport {
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

    fn advertised_window(&self) -> u32 {
        self.with(|t| t.advertised_window())
    }
}
