//! Defines the pluggable congestion control interface.
//! 定义了可插拔的拥塞控制接口。

use crate::{sequence::SequenceNumber, transport::TransportAdapter};
use std::fmt;

pub mod observer;
pub mod scalable;

pub use observer::{
    CongestionEvent, CongestionObserver, EventCounters, TracingObserver, TrajectoryRecorder,
};
pub use scalable::ScalableController;

/// The operating mode, derived from the window and the threshold.
/// 由窗口和阈值推导出的运行模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionMode {
    /// `cwnd < ssthresh`
    SlowStart,
    /// `cwnd >= ssthresh`
    CongestionAvoidance,
}

impl CongestionMode {
    pub fn derive(cwnd: u32, ssthresh: u32) -> Self {
        if cwnd < ssthresh {
            CongestionMode::SlowStart
        } else {
            CongestionMode::CongestionAvoidance
        }
    }
}

/// The result of handling one event.
///
/// 处理一个事件的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionDecision {
    /// 新的拥塞窗口大小
    /// New congestion window size
    pub new_congestion_window: u32,

    /// 新的慢启动阈值
    /// New slow start threshold
    pub new_slow_start_threshold: u32,

    /// 新的模式
    /// New mode
    pub new_mode: CongestionMode,

    /// 窗口、阈值或模式是否发生了变化
    /// Whether the window, the threshold or the mode changed
    pub significant_change: bool,

    /// The sequence a retransmission was requested for, if any.
    /// 请求重传的序列号（如有）。
    pub retransmit: Option<SequenceNumber>,
}

/// A snapshot of a controller's state.
///
/// 控制器状态的快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CongestionStats {
    pub congestion_window: u32,
    pub slow_start_threshold: u32,
    pub segment_size: u32,
    pub dup_ack_count: u32,
    pub mode: CongestionMode,
}

impl fmt::Display for CongestionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scalable[cwnd:{}, ssthresh:{}, mss:{}, dupacks:{}, mode:{:?}]",
            self.congestion_window,
            self.slow_start_threshold,
            self.segment_size,
            self.dup_ack_count,
            self.mode
        )
    }
}

/// What a handler may reach while it runs: the transport and the sink for
/// its observations.
///
/// 处理器运行期间可访问的内容：传输层及其观测输出。
pub struct HandlerContext<'a> {
    pub transport: &'a mut dyn TransportAdapter,
    pub observer: &'a mut dyn CongestionObserver,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        transport: &'a mut dyn TransportAdapter,
        observer: &'a mut dyn CongestionObserver,
    ) -> Self {
        Self {
            transport,
            observer,
        }
    }
}

/// A trait for congestion control algorithms.
///
/// 拥塞控制算法的 trait。
pub trait CongestionControl: fmt::Debug + Send + Sync + 'static {
    /// Called when an ACK advances the send window up to `sequence`.
    ///
    /// 当ACK将发送窗口推进到 `sequence` 时调用。
    fn on_ack_advance(
        &mut self,
        sequence: SequenceNumber,
        cx: &mut HandlerContext<'_>,
    ) -> CongestionDecision;

    /// Called for each duplicate ACK. `count` is the transport's running
    /// count for the current unacknowledged sequence.
    ///
    /// 每个重复ACK时调用。`count` 是传输层对当前未确认序列号的累计计数。
    fn on_duplicate_ack(&mut self, count: u32, cx: &mut HandlerContext<'_>) -> CongestionDecision;

    /// Called when the retransmission timer fires.
    ///
    /// 当重传定时器触发时调用。
    fn on_retransmission_timeout(&mut self, cx: &mut HandlerContext<'_>) -> CongestionDecision;

    /// Creates an independent controller for a connection spawned from this one.
    ///
    /// 为从此连接派生的连接创建一个独立的控制器。
    fn fork(&self) -> Box<dyn CongestionControl>;

    /// Gets the current congestion window size in bytes.
    ///
    /// 获取当前的拥塞窗口大小（以字节为单位）。
    fn congestion_window(&self) -> u32;

    fn slow_start_threshold(&self) -> u32;

    fn mode(&self) -> CongestionMode {
        CongestionMode::derive(self.congestion_window(), self.slow_start_threshold())
    }

    fn stats(&self) -> CongestionStats;

    fn algorithm_name(&self) -> &'static str;
}
