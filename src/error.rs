//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the congestion control library.
/// 拥塞控制库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value was rejected before any controller was built.
    /// 配置值在构建控制器之前被拒绝。
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// The connection was closed and no longer accepts events.
    /// 连接已关闭，不再接受事件。
    #[error("Connection closed")]
    ConnectionClosed,

    /// An internal channel for communication between tasks was closed unexpectedly.
    /// 用于任务间通信的内部通道意外关闭。
    #[error("Internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::InvalidConfig { .. } => std::io::Error::new(ErrorKind::InvalidInput, err),
            Error::ConnectionClosed => ErrorKind::NotConnected.into(),
            Error::ChannelClosed => ErrorKind::BrokenPipe.into(),
        }
    }
}
