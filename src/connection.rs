//! Per-connection event loop driving a congestion controller.
//!
//! Each connection runs in its own task and consumes a single ordered stream
//! of transport events. Raw acknowledgments are classified here: an ACK past
//! the first unacknowledged byte advances the window, an ACK equal to it while
//! data is outstanding is a duplicate, anything older is stale.
//!
//! 每个连接的事件循环，驱动拥塞控制器。每个连接在自己的任务中运行，按顺序处理传输事件。

use crate::{
    config::Config,
    congestion::{
        CongestionControl, CongestionStats, EventCounters, HandlerContext, ScalableController,
        TracingObserver,
    },
    error::{Error, Result},
    sequence::SequenceNumber,
    transport::{TransportAdapter, send_allowance},
};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span, trace, warn};

pub type ConnectionId = u32;

/// Events delivered to a connection task.
/// 发送到连接任务的事件。
#[derive(Debug)]
pub enum ConnectionEvent {
    /// An acknowledgment number parsed from an incoming segment.
    Ack { sequence: SequenceNumber },
    /// The transport's retransmission timer fired.
    RetransmissionTimeout,
    /// Requests a snapshot of the connection.
    /// 请求连接的快照。
    Stats {
        response_tx: oneshot::Sender<ConnectionStats>,
    },
    /// Stops the connection task.
    /// 停止连接任务。
    Close,
}

/// A snapshot of a running connection.
/// 运行中连接的快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    pub conn_id: ConnectionId,
    pub congestion: CongestionStats,
    pub events: EventCounters,
    /// Transport-side duplicate count for the current unacknowledged byte.
    pub duplicate_acks: u32,
    /// Bytes of new data the transport may send right now.
    pub send_allowance: u32,
}

pub(crate) struct ConnectionActor<T> {
    conn_id: ConnectionId,
    controller: Box<dyn CongestionControl>,
    transport: T,
    observer: (TracingObserver, EventCounters),
    duplicate_acks: u32,
    event_rx: mpsc::Receiver<ConnectionEvent>,
}

impl<T: TransportAdapter> ConnectionActor<T> {
    pub(crate) fn new(
        conn_id: ConnectionId,
        controller: Box<dyn CongestionControl>,
        transport: T,
        event_rx: mpsc::Receiver<ConnectionEvent>,
    ) -> Self {
        Self {
            conn_id,
            controller,
            transport,
            observer: (TracingObserver::new(conn_id), EventCounters::default()),
            duplicate_acks: 0,
            event_rx,
        }
    }

    /// Runs the actor's main event loop until closed or every handle is dropped.
    ///
    /// 运行 actor 的主事件循环，直到关闭或所有句柄被丢弃。
    pub(crate) async fn run(mut self) {
        info!(
            algorithm = self.controller.algorithm_name(),
            cwnd = self.controller.congestion_window(),
            ssthresh = self.controller.slow_start_threshold(),
            "Connection started"
        );
        while let Some(event) = self.event_rx.recv().await {
            match event {
                ConnectionEvent::Ack { sequence } => self.handle_ack(sequence),
                ConnectionEvent::RetransmissionTimeout => {
                    let mut cx = HandlerContext::new(&mut self.transport, &mut self.observer);
                    self.controller.on_retransmission_timeout(&mut cx);
                }
                ConnectionEvent::Stats { response_tx } => {
                    // The requester may have given up waiting.
                    let _ = response_tx.send(self.stats());
                }
                ConnectionEvent::Close => break,
            }
        }
        info!(stats = %self.controller.stats(), "Connection finished");
    }

    fn handle_ack(&mut self, sequence: SequenceNumber) {
        let head = self.transport.head_sequence();
        if sequence > head {
            if sequence.distance_from(head) > self.transport.bytes_in_flight() {
                warn!(seq = %sequence, head = %head, "ACK for data never sent, ignored");
                return;
            }
            self.duplicate_acks = 0;
            let mut cx = HandlerContext::new(&mut self.transport, &mut self.observer);
            self.controller.on_ack_advance(sequence, &mut cx);
        } else if sequence == head && self.transport.has_outstanding_data() {
            self.duplicate_acks = self.duplicate_acks.saturating_add(1);
            let mut cx = HandlerContext::new(&mut self.transport, &mut self.observer);
            self.controller.on_duplicate_ack(self.duplicate_acks, &mut cx);
        } else {
            trace!(seq = %sequence, head = %head, "Stale ACK ignored");
        }
    }

    fn stats(&self) -> ConnectionStats {
        let congestion = self.controller.stats();
        ConnectionStats {
            conn_id: self.conn_id,
            congestion,
            events: self.observer.1,
            duplicate_acks: self.duplicate_acks,
            send_allowance: send_allowance(
                congestion.congestion_window,
                self.transport.advertised_window(),
                self.transport.bytes_in_flight(),
            ),
        }
    }
}

/// A handle to a running connection task.
///
/// 运行中连接任务的句柄。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    conn_id: ConnectionId,
    event_tx: mpsc::Sender<ConnectionEvent>,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Whether the connection task has stopped.
    pub fn is_closed(&self) -> bool {
        self.event_tx.is_closed()
    }

    /// Delivers an acknowledgment number from an incoming segment.
    ///
    /// 传递来自传入分段的确认号。
    pub async fn on_ack(&self, sequence: SequenceNumber) -> Result<()> {
        self.send(ConnectionEvent::Ack { sequence }).await
    }

    /// Reports that the retransmission timer fired.
    ///
    /// 报告重传定时器已触发。
    pub async fn on_timeout(&self) -> Result<()> {
        self.send(ConnectionEvent::RetransmissionTimeout).await
    }

    pub async fn stats(&self) -> Result<ConnectionStats> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(ConnectionEvent::Stats { response_tx }).await?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Stops the connection task once the events queued before it are handled.
    ///
    /// 在处理完之前排队的事件后停止连接任务。
    pub async fn close(&self) -> Result<()> {
        self.send(ConnectionEvent::Close).await
    }

    async fn send(&self, event: ConnectionEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| Error::ConnectionClosed)
    }
}

fn spawn_actor<T>(
    conn_id: ConnectionId,
    controller: Box<dyn CongestionControl>,
    transport: T,
    config: &Config,
) -> ConnectionHandle
where
    T: TransportAdapter + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(config.connection.event_channel_capacity);
    let actor = ConnectionActor::new(conn_id, controller, transport, event_rx);
    tokio::spawn(actor.run().instrument(info_span!("connection", conn_id)));
    ConnectionHandle { conn_id, event_tx }
}

/// Spawns an actively opened connection with a fresh controller.
///
/// 以新的控制器创建一个主动打开的连接。
pub fn connect<T>(conn_id: ConnectionId, config: &Config, transport: T) -> Result<ConnectionHandle>
where
    T: TransportAdapter + Send + 'static,
{
    config.validate()?;
    let controller = Box::new(ScalableController::new(config.congestion_control.clone()));
    Ok(spawn_actor(conn_id, controller, transport, config))
}

/// A listening connection. Every accepted connection gets a controller forked
/// from the listener's own.
///
/// The listener only keeps weak senders, so an accepted connection stops once
/// the caller drops every [`ConnectionHandle`] to it.
///
/// 监听连接。每个被接受的连接都获得一个从监听者控制器派生的控制器。
/// 监听者只持有弱发送端，调用者丢弃所有句柄后连接即停止。
pub struct Listener {
    controller: Box<dyn CongestionControl>,
    config: Config,
    connections: HashMap<ConnectionId, mpsc::WeakSender<ConnectionEvent>>,
}

impl Listener {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let controller = Box::new(ScalableController::new(config.congestion_control.clone()));
        Ok(Self {
            controller,
            config,
            connections: HashMap::new(),
        })
    }

    /// The listening connection's own controller.
    pub fn controller(&self) -> &dyn CongestionControl {
        self.controller.as_ref()
    }

    /// Spawns a connection for a passively opened peer.
    ///
    /// 为被动打开的对端创建连接。
    pub fn accept<T>(&mut self, transport: T) -> ConnectionHandle
    where
        T: TransportAdapter + Send + 'static,
    {
        let mut conn_id: ConnectionId = rand::random();
        while self.connections.contains_key(&conn_id) {
            conn_id = rand::random();
        }

        let handle = spawn_actor(conn_id, self.controller.fork(), transport, &self.config);
        debug!(conn_id, "Accepted connection");
        self.connections.insert(conn_id, handle.event_tx.downgrade());
        handle
    }

    /// A new handle to an accepted connection that is still running.
    ///
    /// 获取仍在运行的已接受连接的新句柄。
    pub fn connection(&self, conn_id: ConnectionId) -> Option<ConnectionHandle> {
        let event_tx = self.connections.get(&conn_id)?.upgrade()?;
        if event_tx.is_closed() {
            return None;
        }
        Some(ConnectionHandle { conn_id, event_tx })
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Forgets connections whose task has stopped or whose handles were all
    /// dropped.
    ///
    /// 移除任务已停止或句柄已全部丢弃的连接。
    pub fn prune_closed(&mut self) -> usize {
        let before = self.connections.len();
        self.connections.retain(|_, event_tx| {
            event_tx
                .upgrade()
                .is_some_and(|event_tx| !event_tx.is_closed())
        });
        before - self.connections.len()
    }
}
