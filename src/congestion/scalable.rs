//! Scalable TCP congestion control.
//!
//! In congestion avoidance every ACK grows the window by a fixed fraction of
//! the window itself (`cwnd / ai_count`), and a duplicate-ACK loss only takes
//! `cwnd >> md_scale_shift` off the threshold. The number of RTTs needed to
//! recover from a loss therefore does not depend on the window size.
//!
//! Scalable TCP 拥塞控制。拥塞避免阶段每个ACK使窗口按自身的固定比例增长，
//! 因此从丢包中恢复所需的RTT数与窗口大小无关。

use super::{
    CongestionControl, CongestionDecision, CongestionEvent, CongestionMode, CongestionStats,
    HandlerContext,
};
use crate::{config::CongestionControlConfig, sequence::SequenceNumber};

/// A Scalable TCP congestion controller.
///
/// Sizes are in bytes. The configuration is expected to have passed
/// [`CongestionControlConfig::validate`]; a zero `ai_count` or an
/// out-of-range `md_scale_shift` degrades to the smallest step instead of
/// panicking.
///
/// Scalable TCP 拥塞控制器。
#[derive(Debug, Clone)]
pub struct ScalableController {
    pub(super) congestion_window: u32,

    pub(super) slow_start_threshold: u32,

    /// Consecutive duplicate ACKs for the current unacknowledged sequence,
    /// capped at `retx_threshold`.
    pub(super) dup_ack_count: u32,

    config: CongestionControlConfig,
}

impl ScalableController {
    pub fn new(config: CongestionControlConfig) -> Self {
        Self {
            congestion_window: config.initial_cwnd,
            slow_start_threshold: config.initial_ssthresh,
            dup_ack_count: 0,
            config,
        }
    }

    /// An independent controller with the same configuration and window, and
    /// a zeroed duplicate ACK count.
    ///
    /// 具有相同配置和窗口、重复ACK计数清零的独立控制器。
    pub fn forked(&self) -> Self {
        Self {
            dup_ack_count: 0,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &CongestionControlConfig {
        &self.config
    }

    pub fn segment_size(&self) -> u32 {
        self.config.segment_size
    }

    pub fn dup_ack_count(&self) -> u32 {
        self.dup_ack_count
    }

    fn min_ssthresh(&self) -> u32 {
        self.config.segment_size.saturating_mul(2)
    }

    fn decision(
        &self,
        significant_change: bool,
        retransmit: Option<SequenceNumber>,
    ) -> CongestionDecision {
        CongestionDecision {
            new_congestion_window: self.congestion_window,
            new_slow_start_threshold: self.slow_start_threshold,
            new_mode: self.mode(),
            significant_change,
            retransmit,
        }
    }

    fn window_and_threshold(&self) -> (u32, u32) {
        (self.congestion_window, self.slow_start_threshold)
    }

    /// Restarts slow start from one segment and retransmits from the first
    /// unacknowledged byte.
    fn restart_from_head(&mut self, cx: &mut HandlerContext<'_>) -> SequenceNumber {
        self.congestion_window = self.config.segment_size;
        let head = cx.transport.head_sequence();
        cx.transport.rewind_next_sequence(head);
        cx.transport.request_retransmit(head);
        head
    }
}

impl CongestionControl for ScalableController {
    fn on_ack_advance(
        &mut self,
        sequence: SequenceNumber,
        cx: &mut HandlerContext<'_>,
    ) -> CongestionDecision {
        let mode_before = self.mode();
        let old_window = self.congestion_window;
        match mode_before {
            CongestionMode::SlowStart => {
                self.congestion_window = self
                    .congestion_window
                    .saturating_add(self.config.segment_size)
                    .min(self.slow_start_threshold);
            }
            CongestionMode::CongestionAvoidance => {
                let increment = self
                    .congestion_window
                    .checked_div(self.config.ai_count)
                    .unwrap_or(0)
                    .max(1);
                self.congestion_window = self.congestion_window.saturating_add(increment);
            }
        }
        self.dup_ack_count = 0;

        // The window must be final before the transport decides what to send.
        cx.transport.complete_ack_bookkeeping(sequence);

        let decision = self.decision(old_window != self.congestion_window, None);
        cx.observer.on_event(
            CongestionEvent::AckAdvance {
                sequence,
                mode_before,
            },
            &decision,
        );
        decision
    }

    fn on_duplicate_ack(&mut self, count: u32, cx: &mut HandlerContext<'_>) -> CongestionDecision {
        if self.dup_ack_count >= self.config.retx_threshold {
            let decision = self.decision(false, None);
            cx.observer
                .on_event(CongestionEvent::DuplicateAckIgnored { count }, &decision);
            return decision;
        }

        self.dup_ack_count += 1;
        if self.dup_ack_count < self.config.retx_threshold {
            let decision = self.decision(false, None);
            cx.observer.on_event(
                CongestionEvent::DuplicateAck {
                    count,
                    dup_ack_count: self.dup_ack_count,
                },
                &decision,
            );
            return decision;
        }

        let before = self.window_and_threshold();
        let reduction = self
            .congestion_window
            .checked_shr(self.config.md_scale_shift)
            .unwrap_or(0);
        self.slow_start_threshold =
            (self.congestion_window - reduction).max(self.min_ssthresh());
        let head = self.restart_from_head(cx);

        let decision = self.decision(before != self.window_and_threshold(), Some(head));
        cx.observer
            .on_event(CongestionEvent::FastRetransmit { sequence: head }, &decision);
        decision
    }

    fn on_retransmission_timeout(&mut self, cx: &mut HandlerContext<'_>) -> CongestionDecision {
        let closed = cx.transport.is_closed();
        if closed || !cx.transport.has_outstanding_data() {
            let decision = self.decision(false, None);
            cx.observer.on_event(
                CongestionEvent::RetransmissionTimeoutIgnored { closed },
                &decision,
            );
            return decision;
        }

        let before = self.window_and_threshold();
        let bytes_in_flight = cx.transport.bytes_in_flight();
        self.slow_start_threshold = (bytes_in_flight / 2).max(self.min_ssthresh());
        let head = self.restart_from_head(cx);

        let decision = self.decision(before != self.window_and_threshold(), Some(head));
        cx.observer.on_event(
            CongestionEvent::RetransmissionTimeout {
                sequence: head,
                bytes_in_flight,
            },
            &decision,
        );
        decision
    }

    fn fork(&self) -> Box<dyn CongestionControl> {
        Box::new(self.forked())
    }

    fn congestion_window(&self) -> u32 {
        self.congestion_window
    }

    fn slow_start_threshold(&self) -> u32 {
        self.slow_start_threshold
    }

    fn stats(&self) -> CongestionStats {
        CongestionStats {
            congestion_window: self.congestion_window,
            slow_start_threshold: self.slow_start_threshold,
            segment_size: self.config.segment_size,
            dup_ack_count: self.dup_ack_count,
            mode: self.mode(),
        }
    }

    fn algorithm_name(&self) -> &'static str {
        "scalable"
    }
}

impl Default for ScalableController {
    fn default() -> Self {
        Self::new(CongestionControlConfig::default())
    }
}
