//! Driver threads for interfaces registered with `PerfFlags::THREADED`.
//!
//! Multi-threaded interfaces get a receive thread (polls the handler's
//! `receive` hook) and a forward thread (blocks on the forward queue).
//! Single-threaded interfaces get one thread that drains the forward queue
//! non-blockingly and then polls receive. Shutdown is a two-step protocol:
//! a message on the crossbeam shutdown channel stops the polling loops, and
//! closing the forward queue wakes the blocked forward thread. The close is
//! sticky, so a forward thread that was inside the forward hook when
//! shutdown started still exits on its next queue visit instead of blocking
//! on the drained queue. Threads are always joined before the interface's
//! finalize hook runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use simbridge_queue::{BlockingQueue, Wakeup};
use simbridge_types::{BridgeError, NodeId};
use tracing::{debug, warn};

use crate::handler::InterfaceHandler;
use crate::interface::{InterfaceCtl, PerfFlags};

/// How long a driver sleeps between polls when nothing is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One simulation packet bound for the external side.
pub(crate) struct ForwardItem {
    pub node: NodeId,
    pub data: Vec<u8>,
}

/// Threads and channels owned by one threaded interface. Empty for plain
/// interfaces.
pub(crate) struct DriverSet {
    handles: Vec<JoinHandle<()>>,
    shutdown: Option<Sender<()>>,
    pub(crate) forward_q: Option<Arc<BlockingQueue<ForwardItem>>>,
}

impl DriverSet {
    pub(crate) fn idle() -> Self {
        Self { handles: Vec::new(), shutdown: None, forward_q: None }
    }

    /// Stop and join all driver threads. Idempotent.
    pub(crate) fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            for _ in 0..self.handles.len() {
                let _ = tx.try_send(());
            }
        }
        if let Some(q) = &self.forward_q {
            q.close();
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("interface driver thread panicked");
            }
        }
    }
}

type SharedHandler = Arc<Mutex<Box<dyn InterfaceHandler>>>;

/// Spawn driver threads for a threaded interface.
///
/// `suppress_receive` is set for interfaces that elected to skip their
/// receive hook during warmup; while it holds, the drivers keep servicing
/// forwards but do not poll receive.
pub(crate) fn spawn(
    name: &str,
    flags: PerfFlags,
    handler: SharedHandler,
    ctl: InterfaceCtl,
    suppress_receive: Option<Arc<AtomicBool>>,
) -> Result<DriverSet, BridgeError> {
    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(2);
    let forward_q = Arc::new(BlockingQueue::new());

    let handles = if flags.contains(PerfFlags::THREADED_MULTI) {
        spawn_multi(name, &handler, &ctl, &shutdown_rx, &forward_q, suppress_receive)?
    } else {
        spawn_single(name, &handler, &ctl, &shutdown_rx, &forward_q, suppress_receive)?
    };

    debug!(interface = name, threads = handles.len(), "spawned interface drivers");
    Ok(DriverSet { handles, shutdown: Some(shutdown_tx), forward_q: Some(forward_q) })
}

/// Dedicated receive and forward threads.
fn spawn_multi(
    name: &str,
    handler: &SharedHandler,
    ctl: &InterfaceCtl,
    shutdown: &Receiver<()>,
    forward_q: &Arc<BlockingQueue<ForwardItem>>,
    suppress_receive: Option<Arc<AtomicBool>>,
) -> Result<Vec<JoinHandle<()>>, BridgeError> {
    let recv = {
        let handler = Arc::clone(handler);
        let ctl = ctl.clone();
        let shutdown = shutdown.clone();
        spawn_named(format!("{name}-recv"), move || loop {
            if shutdown.try_recv().is_ok() {
                break;
            }
            if !receive_suppressed(&suppress_receive) {
                handler.lock().receive(&ctl);
            }
            thread::sleep(POLL_INTERVAL);
        })?
    };

    let fwd = {
        let handler = Arc::clone(handler);
        let ctl = ctl.clone();
        let forward_q = Arc::clone(forward_q);
        spawn_named(format!("{name}-fwd"), move || loop {
            match forward_q.pop() {
                Wakeup::Signalled => break,
                Wakeup::Value(item) => forward_one(&handler, &ctl, item),
            }
        })?
    };

    Ok(vec![recv, fwd])
}

/// One thread multiplexing forward and receive without blocking on either.
fn spawn_single(
    name: &str,
    handler: &SharedHandler,
    ctl: &InterfaceCtl,
    shutdown: &Receiver<()>,
    forward_q: &Arc<BlockingQueue<ForwardItem>>,
    suppress_receive: Option<Arc<AtomicBool>>,
) -> Result<Vec<JoinHandle<()>>, BridgeError> {
    let handler = Arc::clone(handler);
    let ctl = ctl.clone();
    let shutdown = shutdown.clone();
    let forward_q = Arc::clone(forward_q);
    let handle = spawn_named(format!("{name}-drv"), move || loop {
        if shutdown.try_recv().is_ok() {
            break;
        }
        while let Some(item) = forward_q.try_pop() {
            forward_one(&handler, &ctl, item);
        }
        if !receive_suppressed(&suppress_receive) {
            handler.lock().receive(&ctl);
        }
        thread::sleep(POLL_INTERVAL);
    })?;

    Ok(vec![handle])
}

fn receive_suppressed(suppress: &Option<Arc<AtomicBool>>) -> bool {
    suppress.as_ref().is_some_and(|flag| flag.load(Ordering::Acquire))
}

fn forward_one(handler: &SharedHandler, ctl: &InterfaceCtl, item: ForwardItem) {
    if let Err(err) = handler.lock().forward(ctl, item.node, &item.data) {
        warn!(interface = ctl.name(), node = %item.node, error = %err, "forward hook failed");
    }
}

fn spawn_named(
    name: String,
    body: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, BridgeError> {
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source| BridgeError::ThreadSpawn { name, source })
}
