
use std::sync::{Arc, Mutex};

use reakt_core::{Event, EventRef, Outcome, Priority, Signal};
use reakt_sm::{MachineDef, State, StateKind, Target, Trans, Vertex};
use reakt_trc::Tracer;

use crate::active::Agent;
use crate::framework::Framework;

pub(crate) const PING: Signal = Signal::new(0x20);
pub(crate) const PONG: Signal = Signal::new(0x21);
pub(crate) const STOP: Signal = Signal::new(0x22);

/// Hand-rolled agent that records every delivered signal, tagged so
/// several instances can share one log.
pub(crate) struct Collector {
    tag: u8,
    seen: Arc<Mutex<Vec<(u8, Signal)>>>,
}

impl Collector {
    pub fn new(tag: u8, seen: Arc<Mutex<Vec<(u8, Signal)>>>) -> Box<Self> {
        Box::new(Self { tag, seen })
    }
}

impl Agent for Collector {
    fn name(&self) -> &'static str {
        "collector"
    }

    fn bind(&mut self, _priority: Priority) {}

    fn init(&mut self, _tracer: &Tracer) -> Outcome {
        Outcome::Initialized
    }

    fn dispatch(&mut self, event: &Event, _tracer: &Tracer) -> Outcome {
        self.seen.lock().unwrap().push((self.tag, event.signal()));
        Outcome::Processed
    }

    fn is_completed(&self) -> bool {
        false
    }

    fn current_state(&self) -> Option<&'static str> {
        Some("collecting")
    }
}

/// Agent that records payload bytes of every delivered event.
pub(crate) struct PayloadCollector {
    pub seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Agent for PayloadCollector {
    fn name(&self) -> &'static str {
        "payloads"
    }

    fn bind(&mut self, _priority: Priority) {}

    fn init(&mut self, _tracer: &Tracer) -> Outcome {
        Outcome::Initialized
    }

    fn dispatch(&mut self, event: &Event, _tracer: &Tracer) -> Outcome {
        self.seen.lock().unwrap().push(event.payload().to_vec());
        Outcome::Processed
    }

    fn is_completed(&self) -> bool {
        false
    }

    fn current_state(&self) -> Option<&'static str> {
        Some("collecting")
    }
}

/// Context for the relay machine: actions post onward through the shared
/// framework handle.
pub(crate) struct RelayCtx {
    pub fwk: Arc<Framework>,
    pub peer: Priority,
    pub relayed: usize,
}

fn on_ping(ctx: &mut RelayCtx, _event: &Event) {
    ctx.relayed += 1;
    ctx.fwk
        .post_fifo(ctx.peer, EventRef::Static(PONG))
        .expect("relay post");
}

static RELAY_TRANS: [Trans<RelayCtx>; 1] = [Trans {
    signal: PING,
    guard: None,
    action: Some(on_ping),
    target: Target::Internal,
}];

static RELAYING: State<RelayCtx> = State {
    name: "relaying",
    parent: None,
    entry: None,
    exit: None,
    transitions: &RELAY_TRANS,
    kind: StateKind::Basic,
};

pub(crate) static RELAY_DEF: MachineDef<RelayCtx> = MachineDef {
    name: "relay",
    initial: &RELAYING,
    initial_action: None,
};

/// Two-state machine that completes on `STOP`.
static WORK_TRANS: [Trans<()>; 1] = [Trans {
    signal: STOP,
    guard: None,
    action: None,
    target: Target::To(&V_FINISHED),
}];

static WORKING: State<()> = State {
    name: "working",
    parent: None,
    entry: None,
    exit: None,
    transitions: &WORK_TRANS,
    kind: StateKind::Basic,
};

static FINISHED: State<()> = State {
    name: "finished",
    parent: None,
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Final,
};

static V_FINISHED: Vertex<()> = Vertex::State(&FINISHED);

pub(crate) static WORKER_DEF: MachineDef<()> = MachineDef {
    name: "worker",
    initial: &WORKING,
    initial_action: None,
};

pub(crate) fn prio(p: u8) -> Priority {
    Priority::new(p).unwrap()
}
