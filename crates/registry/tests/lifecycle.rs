//! End-to-end lifecycle tests for the interface registry: registration,
//! two-phase initialization, warmup gating, horizon caching, threaded
//! forwarding, deactivation, and exactly-once finalization.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use simbridge_registry::{
    Delivery, InitControls, InterfaceCtl, InterfaceHandler, InterfaceList, PerfFlags,
};
use simbridge_types::{BridgeError, Config, NodeId, PartitionId, SimTime};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

/// Ordered record of lifecycle events shared across handlers.
#[derive(Default)]
struct Journal {
    events: Mutex<Vec<String>>,
}

impl Journal {
    fn log(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    fn snapshot(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

/// Records initialize/finalize calls; every other hook is the default no-op.
struct Recorder {
    name: &'static str,
    journal: Arc<Journal>,
}

impl InterfaceHandler for Recorder {
    fn initialize(&mut self, _ctl: &InterfaceCtl, _cfg: &Config) {
        self.journal.log(format!("{}:initialize", self.name));
    }

    fn finalize(&mut self, _ctl: &InterfaceCtl) {
        self.journal.log(format!("{}:finalize", self.name));
    }
}

#[test]
fn test_finalize_runs_once_in_registration_order() {
    init_tracing();
    let journal = Arc::new(Journal::default());
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "alpha",
        PerfFlags::THREADED_MULTI,
        Recorder { name: "alpha", journal: Arc::clone(&journal) },
    );
    list.register(
        "beta",
        PerfFlags::THREADED_SINGLE,
        Recorder { name: "beta", journal: Arc::clone(&journal) },
    );
    list.register(
        "gamma",
        PerfFlags::empty(),
        Recorder { name: "gamma", journal: Arc::clone(&journal) },
    );

    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();
    list.finalize_all();
    // Second shutdown must not re-run any hook.
    list.finalize_all();

    let finalizes: Vec<String> = journal
        .snapshot()
        .into_iter()
        .filter(|event| event.ends_with(":finalize"))
        .collect();
    assert_eq!(finalizes, ["alpha:finalize", "beta:finalize", "gamma:finalize"]);
}

struct HorizonReporter {
    polls: Arc<AtomicU32>,
    report: Option<SimTime>,
}

impl InterfaceHandler for HorizonReporter {
    fn simulation_horizon(&mut self) -> Option<SimTime> {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.report
    }
}

#[test]
fn test_horizon_repolled_only_when_reached() {
    let polls = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "horizon",
        PerfFlags::empty(),
        HorizonReporter { polls: Arc::clone(&polls), report: Some(SimTime::from_millis(50)) },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    assert_eq!(list.horizon(SimTime::ZERO), SimTime::from_millis(50));
    assert_eq!(polls.load(Ordering::Relaxed), 1);

    // Short of the reported horizon: cached value, no re-poll.
    assert_eq!(list.horizon(SimTime::from_millis(20)), SimTime::from_millis(50));
    assert_eq!(polls.load(Ordering::Relaxed), 1);

    // At the horizon the handler is consulted again.
    list.horizon(SimTime::from_millis(50));
    assert_eq!(polls.load(Ordering::Relaxed), 2);
}

#[test]
fn test_unbounded_horizon_never_repolled() {
    let polls = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "open-ended",
        PerfFlags::empty(),
        HorizonReporter { polls: Arc::clone(&polls), report: None },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    assert!(list.horizon(SimTime::ZERO).is_unbounded());
    assert!(list.horizon(SimTime::from_secs(100)).is_unbounded());
    assert_eq!(polls.load(Ordering::Relaxed), 1);
}

/// Requests warmup during initialize_nodes and counts receive dispatches.
struct WarmupRequester {
    duration: SimTime,
    begin_in_hook: bool,
    suppress_receive: bool,
    receives: Arc<AtomicU32>,
}

impl InterfaceHandler for WarmupRequester {
    fn initialize_nodes(&mut self, _ctl: &InterfaceCtl, init: &mut InitControls<'_>, _cfg: &Config) {
        init.set_warmup_time(self.duration);
        if self.suppress_receive {
            init.suppress_receive_during_warmup();
        }
        if self.begin_in_hook {
            init.begin_warmup();
        }
    }

    fn receive(&mut self, _ctl: &InterfaceCtl) {
        self.receives.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_warmup_gates_suppressed_receive() {
    let suppressed = Arc::new(AtomicU32::new(0));
    let eager = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "suppressed",
        PerfFlags::empty(),
        WarmupRequester {
            duration: SimTime::from_secs(1),
            begin_in_hook: true,
            suppress_receive: true,
            receives: Arc::clone(&suppressed),
        },
    );
    list.register(
        "eager",
        PerfFlags::empty(),
        WarmupRequester {
            duration: SimTime::from_secs(2),
            begin_in_hook: false,
            suppress_receive: false,
            receives: Arc::clone(&eager),
        },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    // One of two requesters has not begun: still waiting, suppression holds.
    list.receive_all(SimTime::ZERO);
    assert_eq!(suppressed.load(Ordering::Relaxed), 0);
    assert_eq!(eager.load(Ordering::Relaxed), 1);

    list.begin_warmup();
    // In warmup until the clock passes the longest request (2s).
    list.receive_all(SimTime::from_secs(1));
    assert_eq!(suppressed.load(Ordering::Relaxed), 0);
    assert_eq!(eager.load(Ordering::Relaxed), 2);

    list.receive_all(SimTime::from_millis(2001));
    assert_eq!(suppressed.load(Ordering::Relaxed), 1);
    assert_eq!(eager.load(Ordering::Relaxed), 3);
}

struct ThrottledReceiver {
    delay: SimTime,
    receives: Arc<AtomicU32>,
}

impl InterfaceHandler for ThrottledReceiver {
    fn initialize_nodes(&mut self, _ctl: &InterfaceCtl, init: &mut InitControls<'_>, _cfg: &Config) {
        init.set_min_receive_delay(self.delay);
    }

    fn receive(&mut self, _ctl: &InterfaceCtl) {
        self.receives.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_min_receive_delay_throttles_dispatch() {
    let receives = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "throttled",
        PerfFlags::empty(),
        ThrottledReceiver { delay: SimTime::from_millis(10), receives: Arc::clone(&receives) },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    list.receive_all(SimTime::from_millis(10));
    assert_eq!(receives.load(Ordering::Relaxed), 1);
    list.receive_all(SimTime::from_millis(15));
    assert_eq!(receives.load(Ordering::Relaxed), 1);
    list.receive_all(SimTime::from_millis(20));
    assert_eq!(receives.load(Ordering::Relaxed), 2);
}

/// Bounces every forwarded packet back to the core as a delivery.
struct Echo;

impl InterfaceHandler for Echo {
    fn forward(
        &mut self,
        ctl: &InterfaceCtl,
        node: NodeId,
        data: &[u8],
    ) -> Result<(), BridgeError> {
        ctl.deliver(Delivery { node: Some(node), data: data.to_vec() });
        Ok(())
    }
}

#[test]
fn test_threaded_forward_round_trip() {
    init_tracing();
    let mut list = InterfaceList::new(PartitionId(0));
    let id = list.register("echo", PerfFlags::THREADED_MULTI, Echo);
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    list.forward_to(id, NodeId(7), b"ping".to_vec()).unwrap();

    // The forward hook runs on a driver thread; poll until the echoed
    // delivery shows up.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut got = Vec::new();
    while got.is_empty() {
        assert!(Instant::now() < deadline, "echoed delivery never arrived");
        list.drain_deliveries(|from, delivery| got.push((from, delivery)));
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].0, id);
    assert_eq!(got[0].1, Delivery { node: Some(NodeId(7)), data: b"ping".to_vec() });

    list.finalize_all();
}

/// Dwells inside the forward hook to widen the window in which shutdown can
/// overlap an in-flight forward.
struct SlowForwarder {
    dwell: Duration,
}

impl InterfaceHandler for SlowForwarder {
    fn forward(
        &mut self,
        _ctl: &InterfaceCtl,
        _node: NodeId,
        _data: &[u8],
    ) -> Result<(), BridgeError> {
        thread::sleep(self.dwell);
        Ok(())
    }
}

#[test]
fn test_finalize_completes_while_forward_in_flight() {
    init_tracing();
    let mut list = InterfaceList::new(PartitionId(0));
    let id = list.register(
        "slow",
        PerfFlags::THREADED_MULTI,
        SlowForwarder { dwell: Duration::from_millis(300) },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    list.forward_to(id, NodeId(1), b"slow".to_vec()).unwrap();
    // Let the forward thread dequeue the item and enter the hook, so the
    // shutdown below lands while it is mid-forward.
    thread::sleep(Duration::from_millis(50));

    let (done_tx, done_rx) = std::sync::mpsc::channel();
    thread::spawn(move || {
        list.finalize_all();
        let _ = done_tx.send(());
    });
    done_rx
        .recv_timeout(Duration::from_secs(3))
        .expect("finalize_all stalled behind an in-flight forward");
}

#[test]
fn test_warmup_suppresses_threaded_receive_polling() {
    init_tracing();
    let receives = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    list.register(
        "warm-threaded",
        PerfFlags::THREADED_MULTI,
        WarmupRequester {
            duration: SimTime::from_secs(1),
            begin_in_hook: true,
            suppress_receive: true,
            receives: Arc::clone(&receives),
        },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    // The driver is running but warmup is in progress: no receive polls.
    thread::sleep(Duration::from_millis(100));
    assert_eq!(receives.load(Ordering::Relaxed), 0);

    // Past the warmup duration the driver resumes polling.
    list.set_time(SimTime::from_millis(1001));
    let deadline = Instant::now() + Duration::from_secs(5);
    while receives.load(Ordering::Relaxed) == 0 {
        assert!(Instant::now() < deadline, "receive polling never resumed after warmup");
        thread::sleep(Duration::from_millis(1));
    }
    list.finalize_all();
}

#[test]
fn test_deactivated_interface_rejects_forwarding() {
    init_tracing();
    let journal = Arc::new(Journal::default());
    let receives = Arc::new(AtomicU32::new(0));
    let mut list = InterfaceList::new(PartitionId(0));
    let id = list.register(
        "doomed",
        PerfFlags::empty(),
        ThrottledReceiver { delay: SimTime::ZERO, receives: Arc::clone(&receives) },
    );
    let survivor = list.register(
        "survivor",
        PerfFlags::empty(),
        Recorder { name: "survivor", journal: Arc::clone(&journal) },
    );
    let cfg = Config::new();
    list.initialize_all(&cfg);
    list.initialize_nodes_all(&cfg).unwrap();

    list.receive_all(SimTime::ZERO);
    assert_eq!(receives.load(Ordering::Relaxed), 1);

    list.deactivate(id).unwrap();
    assert!(matches!(
        list.forward_to(id, NodeId(1), b"late".to_vec()),
        Err(BridgeError::UnknownInterface(_))
    ));
    assert!(matches!(list.deactivate(id), Err(BridgeError::UnknownInterface(_))));
    assert!(list.iface(id).is_err());
    assert!(list.iface(survivor).is_ok());

    // Deactivated interfaces drop out of receive dispatch.
    list.receive_all(SimTime::from_millis(1));
    assert_eq!(receives.load(Ordering::Relaxed), 1);
}

struct BoundedInjector {
    earliest: SimTime,
}

impl InterfaceHandler for BoundedInjector {
    fn external_time(&mut self) -> Option<SimTime> {
        Some(self.earliest)
    }
}

#[test]
fn test_min_external_time_across_interfaces() {
    let mut list = InterfaceList::new(PartitionId(0));
    list.register("near", PerfFlags::empty(), BoundedInjector { earliest: SimTime::from_millis(5) });
    list.register("far", PerfFlags::empty(), BoundedInjector { earliest: SimTime::from_secs(1) });
    list.register("unbounded", PerfFlags::empty(), Echo);
    let cfg = Config::new();
    list.initialize_all(&cfg);

    assert_eq!(list.min_external_time(), SimTime::from_millis(5));
}

#[test]
fn test_empty_list_has_unbounded_bounds() {
    let mut list = InterfaceList::new(PartitionId(0));
    assert!(list.min_external_time().is_unbounded());
    assert!(list.horizon(SimTime::ZERO).is_unbounded());
}
