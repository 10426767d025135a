//! The boundary between the congestion controller and the transport that
//! owns segments, buffers, timers and the peer's receive window.
//!
//! 拥塞控制器与拥有分段、缓冲区、定时器和对端接收窗口的传输层之间的边界。

use crate::sequence::SequenceNumber;

/// Operations the controller needs from the transport.
///
/// Every method is synchronous and must not block.
///
/// 控制器所需的传输层操作。所有方法都是同步的，且不得阻塞。
pub trait TransportAdapter {
    /// The first unacknowledged sequence number.
    /// 第一个未确认的序列号。
    fn head_sequence(&self) -> SequenceNumber;

    /// Bytes sent but not yet acknowledged.
    /// 已发送但尚未确认的字节数。
    fn bytes_in_flight(&self) -> u32;

    /// Resends the segment starting at `sequence` immediately.
    /// 立即重发从 `sequence` 开始的分段。
    fn request_retransmit(&mut self, sequence: SequenceNumber);

    /// Moves the next sequence to transmit back to `sequence`.
    /// 将下一个待发送序列号回退到 `sequence`。
    fn rewind_next_sequence(&mut self, sequence: SequenceNumber);

    /// Buffer advance, RTT sampling and timer rearm after a new ACK. Called
    /// once the window has been updated.
    ///
    /// 新ACK之后的缓冲区推进、RTT采样和定时器重置。在窗口更新后调用。
    fn complete_ack_bookkeeping(&mut self, sequence: SequenceNumber);

    /// Whether any sent data is still unacknowledged.
    /// 是否仍有已发送但未确认的数据。
    fn has_outstanding_data(&self) -> bool;

    /// Whether the connection is closed or waiting out its final timeout.
    /// 连接是否已关闭或处于最终等待状态。
    fn is_closed(&self) -> bool;

    /// The receive window last advertised by the peer.
    /// 对端最近通告的接收窗口。
    fn advertised_window(&self) -> u32 {
        u32::MAX
    }
}

/// Bytes of new data that may be sent now: the congestion window clamped to
/// the peer's advertised window, minus what is already in flight.
///
/// 当前可发送的新数据字节数：拥塞窗口受对端通告窗口限制，减去已在途的数据。
pub fn send_allowance(cwnd: u32, advertised_window: u32, bytes_in_flight: u32) -> u32 {
    cwnd.min(advertised_window).saturating_sub(bytes_in_flight)
}
