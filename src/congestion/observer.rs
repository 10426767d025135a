//! Observation sinks for congestion events.
//!
//! The controller holds no logger of its own. Each handler reports what it
//! did to the observer it was handed, which decides where it goes.
//!
//! 拥塞事件的观测输出。控制器自身不持有日志器，每个处理器将其行为报告给传入的观测者。

use super::{CongestionDecision, CongestionMode};
use crate::sequence::SequenceNumber;
use tracing::{debug, trace};

/// What happened inside a handler.
/// 处理器内部发生的事情。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionEvent {
    /// A new ACK grew the window.
    AckAdvance {
        sequence: SequenceNumber,
        mode_before: CongestionMode,
    },
    /// A duplicate ACK was counted without reaching the threshold.
    DuplicateAck { count: u32, dup_ack_count: u32 },
    /// The duplicate ACK threshold was reached.
    FastRetransmit { sequence: SequenceNumber },
    /// A duplicate ACK after the threshold already fired in this episode.
    DuplicateAckIgnored { count: u32 },
    /// The retransmission timer fired with data outstanding.
    RetransmissionTimeout {
        sequence: SequenceNumber,
        bytes_in_flight: u32,
    },
    /// The retransmission timer fired with nothing to do.
    RetransmissionTimeoutIgnored { closed: bool },
}

/// A sink for congestion events.
///
/// 拥塞事件的接收端。
pub trait CongestionObserver {
    fn on_event(&mut self, event: CongestionEvent, decision: &CongestionDecision);
}

/// Forwards events to `tracing`, tagged with the connection id.
///
/// 将事件转发到 `tracing`，并标记连接ID。
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    conn_id: u32,
}

impl TracingObserver {
    pub fn new(conn_id: u32) -> Self {
        Self { conn_id }
    }
}

impl CongestionObserver for TracingObserver {
    fn on_event(&mut self, event: CongestionEvent, decision: &CongestionDecision) {
        let cwnd = decision.new_congestion_window;
        let ssthresh = decision.new_slow_start_threshold;
        match event {
            CongestionEvent::AckAdvance {
                sequence,
                mode_before,
            } => {
                trace!(
                    conn_id = self.conn_id,
                    seq = %sequence,
                    cwnd,
                    ssthresh,
                    ?mode_before,
                    mode = ?decision.new_mode,
                    "ACK advanced: congestion window increased"
                );
                if mode_before != decision.new_mode {
                    trace!(conn_id = self.conn_id, "Mode changed to CongestionAvoidance");
                }
            }
            CongestionEvent::DuplicateAck {
                count,
                dup_ack_count,
            } => {
                trace!(conn_id = self.conn_id, count, dup_ack_count, "Duplicate ACK");
            }
            CongestionEvent::FastRetransmit { sequence } => {
                debug!(
                    conn_id = self.conn_id,
                    seq = %sequence,
                    new_ssthresh = ssthresh,
                    new_cwnd = cwnd,
                    "Duplicate ACK threshold reached: fast retransmit"
                );
            }
            CongestionEvent::DuplicateAckIgnored { count } => {
                trace!(
                    conn_id = self.conn_id,
                    count,
                    "Duplicate ACK after fast retransmit, ignored"
                );
            }
            CongestionEvent::RetransmissionTimeout {
                sequence,
                bytes_in_flight,
            } => {
                debug!(
                    conn_id = self.conn_id,
                    seq = %sequence,
                    bytes_in_flight,
                    new_ssthresh = ssthresh,
                    new_cwnd = cwnd,
                    "Retransmission timeout: restarting slow start"
                );
            }
            CongestionEvent::RetransmissionTimeoutIgnored { closed } => {
                debug!(
                    conn_id = self.conn_id,
                    closed,
                    "Retransmission timeout with nothing outstanding, ignored"
                );
            }
        }
    }
}

/// Records every event together with the window it produced.
///
/// 记录每个事件及其产生的窗口。
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    entries: Vec<(CongestionEvent, CongestionDecision)>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(CongestionEvent, CongestionDecision)] {
        &self.entries
    }

    /// The congestion window after each recorded event.
    /// 每个记录事件之后的拥塞窗口。
    pub fn windows(&self) -> Vec<u32> {
        self.entries
            .iter()
            .map(|(_, decision)| decision.new_congestion_window)
            .collect()
    }

    pub fn retransmissions(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, decision)| decision.retransmit.is_some())
            .count()
    }
}

impl CongestionObserver for TrajectoryRecorder {
    fn on_event(&mut self, event: CongestionEvent, decision: &CongestionDecision) {
        self.entries.push((event, decision.clone()));
    }
}

/// Fans an event out to two observers.
/// 将事件分发给两个观测者。
impl<A: CongestionObserver, B: CongestionObserver> CongestionObserver for (A, B) {
    fn on_event(&mut self, event: CongestionEvent, decision: &CongestionDecision) {
        self.0.on_event(event, decision);
        self.1.on_event(event, decision);
    }
}

/// Counts events by kind.
/// 按类型统计事件。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounters {
    pub acks: u64,
    pub duplicate_acks: u64,
    pub fast_retransmits: u64,
    pub timeouts: u64,
    pub ignored_timeouts: u64,
}

impl CongestionObserver for EventCounters {
    fn on_event(&mut self, event: CongestionEvent, _decision: &CongestionDecision) {
        match event {
            CongestionEvent::AckAdvance { .. } => self.acks += 1,
            CongestionEvent::DuplicateAck { .. } | CongestionEvent::DuplicateAckIgnored { .. } => {
                self.duplicate_acks += 1
            }
            CongestionEvent::FastRetransmit { .. } => {
                self.duplicate_acks += 1;
                self.fast_retransmits += 1;
            }
            CongestionEvent::RetransmissionTimeout { .. } => self.timeouts += 1,
            CongestionEvent::RetransmissionTimeoutIgnored { .. } => self.ignored_timeouts += 1,
        }
    }
}
