//! Event dispatcher.
//!
//! Delivery contract: events touching the same switch are handled in arrival
//! order; events for different switches run in parallel. Each switch gets a
//! bounded channel and a worker task that drains it, calling the engine to
//! completion for one event before dequeuing the next.

use crate::error::{FwdResult, FwdagentError};
use crate::forward::ForwardingEngine;
use dashmap::DashMap;
use fwd_orch_common::{PacketIn, TopologyEvent};
use fwd_types::SwitchId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// An event routed through the dispatcher.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Topology notification.
    Topology(TopologyEvent),
    /// Packet arrival.
    Packet(PacketIn),
}

impl EngineEvent {
    /// The switch whose ordered lane carries this event.
    pub fn ordering_switch(&self) -> SwitchId {
        match self {
            EngineEvent::Topology(ev) => ev.ordering_switch(),
            EngineEvent::Packet(pkt) => pkt.switch,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct FwdDaemonConfig {
    /// Bounded capacity of each per-switch event channel.
    pub channel_capacity: usize,
}

impl Default for FwdDaemonConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
        }
    }
}

/// Per-switch ordered event dispatcher around a shared [`ForwardingEngine`].
pub struct FwdDaemon {
    engine: Arc<ForwardingEngine>,
    config: FwdDaemonConfig,
    lanes: DashMap<SwitchId, mpsc::Sender<EngineEvent>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl FwdDaemon {
    /// Creates a dispatcher over `engine`.
    pub fn new(engine: Arc<ForwardingEngine>, config: FwdDaemonConfig) -> Self {
        Self {
            engine,
            config,
            lanes: DashMap::new(),
            workers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<ForwardingEngine> {
        &self.engine
    }

    /// Enqueues an event on its switch's lane, creating the lane on first
    /// use. Applies per-switch backpressure when the lane is full.
    pub async fn dispatch(&self, event: EngineEvent) -> FwdResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FwdagentError::DispatcherClosed);
        }
        let tx = self.lane(event.ordering_switch());
        tx.send(event)
            .await
            .map_err(|_| FwdagentError::DispatcherClosed)
    }

    /// Stops accepting events, lets every lane drain, and joins the workers.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.lanes.clear();
        let workers = std::mem::take(&mut *self.workers.lock().expect("lock poisoned"));
        info!(workers = workers.len(), "dispatcher draining");
        for handle in workers {
            let _ = handle.await;
        }
    }

    fn lane(&self, switch: SwitchId) -> mpsc::Sender<EngineEvent> {
        if let Some(tx) = self.lanes.get(&switch) {
            return tx.clone();
        }
        self.lanes
            .entry(switch)
            .or_insert_with(|| {
                debug!(switch = %switch, "opening event lane");
                let (tx, mut rx) = mpsc::channel::<EngineEvent>(self.config.channel_capacity);
                let engine = Arc::clone(&self.engine);
                let handle = tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        match event {
                            EngineEvent::Topology(ev) => engine.handle_topology_event(&ev),
                            EngineEvent::Packet(pkt) => {
                                engine.handle_packet_in(&pkt);
                            }
                        }
                    }
                });
                self.workers.lock().expect("lock poisoned").push(handle);
                tx
            })
            .clone()
    }
}
