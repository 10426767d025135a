#![deny(clippy::expect_used, clippy::unwrap_used)]

//! Scalable TCP congestion control.
//! Scalable TCP 拥塞控制。

pub mod config;
pub mod error;
pub mod sequence;
pub mod transport;

pub mod congestion;
pub mod connection;

mod testing;
