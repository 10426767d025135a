//! 定义了连接和拥塞控制的可配置参数。
//! Defines configurable parameters for connections and congestion control.

use crate::error::{Error, Result};

/// A structure containing all configurable parameters for a connection.
///
/// 包含所有连接可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Congestion control-related parameters.
    /// 拥塞控制相关参数。
    pub congestion_control: CongestionControlConfig,

    /// Connection-related parameters.
    /// 连接相关参数。
    pub connection: ConnectionConfig,
}

/// Congestion control-related parameters.
///
/// All sizes are in bytes.
///
/// 拥塞控制相关参数。所有大小均以字节为单位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionControlConfig {
    /// The maximum segment size.
    /// 最大分段大小。
    pub segment_size: u32,
    /// The initial congestion window.
    /// 初始拥塞窗口。
    pub initial_cwnd: u32,
    /// The initial slow start threshold.
    /// 初始慢启动阈值。
    pub initial_ssthresh: u32,
    /// The number of duplicate ACKs that triggers a fast retransmit.
    /// 触发快速重传的重复ACK数量。
    pub retx_threshold: u32,
    /// Divisor of the per-ACK window increase in congestion avoidance.
    /// 拥塞避免阶段每个ACK窗口增量的除数。
    pub ai_count: u32,
    /// On fast retransmit the threshold is reduced by `cwnd >> md_scale_shift`.
    /// 快速重传时阈值减少 `cwnd >> md_scale_shift`。
    pub md_scale_shift: u32,
}

/// Connection-related parameters.
///
/// 连接相关参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Capacity of the per-connection event channel.
    /// 每个连接事件通道的容量。
    pub event_channel_capacity: usize,
}

impl Default for CongestionControlConfig {
    fn default() -> Self {
        Self {
            segment_size: 536,
            initial_cwnd: 536,
            initial_ssthresh: 65535,
            retx_threshold: 3,
            ai_count: 50,
            md_scale_shift: 3,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 128,
        }
    }
}

impl CongestionControlConfig {
    /// Creates a configuration for the given segment size, with the initial
    /// window set to one segment and the remaining parameters at their defaults.
    ///
    /// 为给定的分段大小创建配置，初始窗口为一个分段，其余参数为默认值。
    pub fn with_segment_size(segment_size: u32) -> Self {
        Self {
            segment_size,
            initial_cwnd: segment_size,
            ..Default::default()
        }
    }

    /// Checks every value a controller relies on.
    ///
    /// 检查控制器所依赖的每个值。
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<()> {
            Err(Error::InvalidConfig { field, reason })
        }

        if self.segment_size == 0 {
            return invalid("segment_size", "must be positive");
        }
        if self.retx_threshold == 0 {
            return invalid("retx_threshold", "must be positive");
        }
        if self.ai_count == 0 {
            return invalid("ai_count", "must be positive");
        }
        if !(1..u32::BITS).contains(&self.md_scale_shift) {
            return invalid("md_scale_shift", "must be between 1 and 31");
        }
        if self.initial_cwnd < self.segment_size {
            return invalid("initial_cwnd", "must be at least one segment");
        }
        let min_ssthresh = match self.segment_size.checked_mul(2) {
            Some(v) => v,
            None => return invalid("segment_size", "too large"),
        };
        if self.initial_ssthresh < min_ssthresh {
            return invalid("initial_ssthresh", "must be at least two segments");
        }
        Ok(())
    }
}

impl Config {
    /// Validates the whole configuration.
    ///
    /// 验证整个配置。
    pub fn validate(&self) -> Result<()> {
        self.congestion_control.validate()?;
        if self.connection.event_channel_capacity == 0 {
            return Err(Error::InvalidConfig {
                field: "event_channel_capacity",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
