//! Shared state-machine fixture.
//!
//! The graph exercises every vertex kind:
//!
//! ```text
//! s0                       (basic, top level)
//! s1 [H: s1_hist]          (composite: s11, s12)
//!   s11                    (basic)
//!   s12                    (composite: s121)
//!     s121                 (basic)
//! s2 [H: s2_hist -> s22]   (composite: s21, s22; history has a default)
//!   s21, s22               (basic)
//! s3 [H*: s3_hist]         (composite: s31, s32; deep history)
//!   s31                    (basic)
//!   s32                    (composite: s321)
//!     s321                 (basic)
//! done                     (final)
//! ch1, ch2                 (choice), j1, j_loop (junction)
//! ```

use reakt_core::{Event, Signal};

use crate::state::{
    Branch, Choice, History, HistoryKind, Junction, State, StateKind, Target, Trans, Vertex,
};
use crate::MachineDef;

pub const A: Signal = Signal::new(1);
pub const B: Signal = Signal::new(2);
pub const C: Signal = Signal::new(3);
pub const D: Signal = Signal::new(4);
pub const E: Signal = Signal::new(5);
pub const F: Signal = Signal::new(6);
pub const I: Signal = Signal::new(7);
pub const J: Signal = Signal::new(8);
pub const L: Signal = Signal::new(9);
pub const N: Signal = Signal::new(10);
pub const Q: Signal = Signal::new(11);
pub const S: Signal = Signal::new(12);
pub const W: Signal = Signal::new(13);

/// Recording context: actions and entry/exit handlers append markers, and
/// the guard flags steer guarded transitions and choice branches.
#[derive(Default)]
pub struct Ctx {
    pub log: Vec<&'static str>,
    pub foo: bool,
    pub bar: bool,
}

pub fn ev(signal: Signal) -> Event {
    Event::new(signal)
}

fn g_foo(ctx: &Ctx, _e: &Event) -> bool {
    ctx.foo
}

fn g_bar(ctx: &Ctx, _e: &Event) -> bool {
    ctx.bar
}

fn en_s0(ctx: &mut Ctx) {
    ctx.log.push("en:s0");
}

fn ex_s0(ctx: &mut Ctx) {
    ctx.log.push("ex:s0");
}

fn en_s1(ctx: &mut Ctx) {
    ctx.log.push("en:s1");
}

fn ex_s1(ctx: &mut Ctx) {
    ctx.log.push("ex:s1");
}

fn ia_s1(ctx: &mut Ctx) {
    ctx.log.push("init:s1");
}

fn en_s11(ctx: &mut Ctx) {
    ctx.log.push("en:s11");
}

fn ex_s11(ctx: &mut Ctx) {
    ctx.log.push("ex:s11");
}

fn en_s12(ctx: &mut Ctx) {
    ctx.log.push("en:s12");
}

fn ex_s12(ctx: &mut Ctx) {
    ctx.log.push("ex:s12");
}

fn en_s121(ctx: &mut Ctx) {
    ctx.log.push("en:s121");
}

fn ex_s121(ctx: &mut Ctx) {
    ctx.log.push("ex:s121");
}

fn tr_c(ctx: &mut Ctx, _e: &Event) {
    ctx.log.push("tr:c");
}

fn br_true(ctx: &mut Ctx, _e: &Event) {
    ctx.log.push("br:true");
}

fn br_else(ctx: &mut Ctx, _e: &Event) {
    ctx.log.push("br:else");
}

fn act_j1(ctx: &mut Ctx, _e: &Event) {
    ctx.log.push("act:j1");
}

fn act_internal(ctx: &mut Ctx, _e: &Event) {
    ctx.log.push("act:internal");
}

pub static S0: State<Ctx> = State {
    name: "s0",
    parent: None,
    entry: Some(en_s0),
    exit: Some(ex_s0),
    transitions: &S0_TRANS,
    kind: StateKind::Basic,
};

static S0_TRANS: [Trans<Ctx>; 11] = [
    Trans {
        signal: B,
        guard: None,
        action: None,
        target: Target::To(&V_S1_HIST),
    },
    Trans {
        signal: C,
        guard: None,
        action: Some(tr_c),
        target: Target::To(&V_CH1),
    },
    Trans {
        signal: D,
        guard: None,
        action: None,
        target: Target::To(&V_S3_HIST),
    },
    Trans {
        signal: E,
        guard: None,
        action: None,
        target: Target::To(&V_S2_HIST),
    },
    Trans {
        signal: F,
        guard: None,
        action: None,
        target: Target::To(&V_DONE),
    },
    Trans {
        signal: I,
        guard: None,
        action: Some(act_internal),
        target: Target::Internal,
    },
    Trans {
        signal: J,
        guard: None,
        action: None,
        target: Target::To(&V_J1),
    },
    Trans {
        signal: L,
        guard: None,
        action: None,
        target: Target::To(&V_J_LOOP),
    },
    Trans {
        signal: N,
        guard: None,
        action: None,
        target: Target::To(&V_CH2),
    },
    Trans {
        signal: Q,
        guard: Some(g_foo),
        action: None,
        target: Target::To(&V_S1),
    },
    Trans {
        signal: S,
        guard: None,
        action: None,
        target: Target::To(&V_S0),
    },
];

pub static S1: State<Ctx> = State {
    name: "s1",
    parent: None,
    entry: Some(en_s1),
    exit: Some(ex_s1),
    transitions: &S1_TRANS,
    kind: StateKind::Composite {
        default: &S11,
        initial_action: Some(ia_s1),
        history: Some(&S1_HIST),
    },
};

static S1_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: A,
    guard: Some(g_foo),
    action: None,
    target: Target::To(&V_S0),
}];

pub static S11: State<Ctx> = State {
    name: "s11",
    parent: Some(&S1),
    entry: Some(en_s11),
    exit: Some(ex_s11),
    transitions: &S11_TRANS,
    kind: StateKind::Basic,
};

static S11_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: A,
    guard: Some(g_bar),
    action: None,
    target: Target::To(&V_S12),
}];

pub static S12: State<Ctx> = State {
    name: "s12",
    parent: Some(&S1),
    entry: Some(en_s12),
    exit: Some(ex_s12),
    transitions: &[],
    kind: StateKind::Composite {
        default: &S121,
        initial_action: None,
        history: None,
    },
};

pub static S121: State<Ctx> = State {
    name: "s121",
    parent: Some(&S12),
    entry: Some(en_s121),
    exit: Some(ex_s121),
    transitions: &S121_TRANS,
    kind: StateKind::Basic,
};

static S121_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: A,
    guard: None,
    action: None,
    target: Target::To(&V_S0),
}];

pub static S1_HIST: History<Ctx> = History {
    name: "s1_hist",
    parent: &S1,
    kind: HistoryKind::Shallow,
    slot: 0,
    default: None,
};

pub static S2: State<Ctx> = State {
    name: "s2",
    parent: None,
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Composite {
        default: &S21,
        initial_action: None,
        history: Some(&S2_HIST),
    },
};

pub static S21: State<Ctx> = State {
    name: "s21",
    parent: Some(&S2),
    entry: None,
    exit: None,
    transitions: &S21_TRANS,
    kind: StateKind::Basic,
};

static S21_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: A,
    guard: None,
    action: None,
    target: Target::To(&V_S0),
}];

pub static S22: State<Ctx> = State {
    name: "s22",
    parent: Some(&S2),
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Basic,
};

pub static S2_HIST: History<Ctx> = History {
    name: "s2_hist",
    parent: &S2,
    kind: HistoryKind::Shallow,
    slot: 1,
    default: Some(&V_S22),
};

pub static S3: State<Ctx> = State {
    name: "s3",
    parent: None,
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Composite {
        default: &S31,
        initial_action: None,
        history: Some(&S3_HIST),
    },
};

pub static S31: State<Ctx> = State {
    name: "s31",
    parent: Some(&S3),
    entry: None,
    exit: None,
    transitions: &S31_TRANS,
    kind: StateKind::Basic,
};

static S31_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: W,
    guard: None,
    action: None,
    target: Target::To(&V_S321),
}];

pub static S32: State<Ctx> = State {
    name: "s32",
    parent: Some(&S3),
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Composite {
        default: &S321,
        initial_action: None,
        history: None,
    },
};

pub static S321: State<Ctx> = State {
    name: "s321",
    parent: Some(&S32),
    entry: None,
    exit: None,
    transitions: &S321_TRANS,
    kind: StateKind::Basic,
};

static S321_TRANS: [Trans<Ctx>; 1] = [Trans {
    signal: A,
    guard: None,
    action: None,
    target: Target::To(&V_S0),
}];

pub static S3_HIST: History<Ctx> = History {
    name: "s3_hist",
    parent: &S3,
    kind: HistoryKind::Deep,
    slot: 2,
    default: None,
};

pub static DONE: State<Ctx> = State {
    name: "done",
    parent: None,
    entry: None,
    exit: None,
    transitions: &[],
    kind: StateKind::Final,
};

static CH1: Choice<Ctx> = Choice {
    name: "ch1",
    branches: &[
        Branch {
            guard: Some(g_foo),
            action: Some(br_true),
            target: &V_S11,
        },
        Branch {
            guard: None,
            action: Some(br_else),
            target: &V_S0,
        },
    ],
};

static CH2: Choice<Ctx> = Choice {
    name: "ch2",
    branches: &[Branch {
        guard: Some(g_bar),
        action: None,
        target: &V_S0,
    }],
};

static J1: Junction<Ctx> = Junction {
    name: "j1",
    action: Some(act_j1),
    target: &V_S21,
};

static J_LOOP: Junction<Ctx> = Junction {
    name: "j_loop",
    action: None,
    target: &V_J_LOOP,
};

static V_S0: Vertex<Ctx> = Vertex::State(&S0);
static V_S1: Vertex<Ctx> = Vertex::State(&S1);
static V_S11: Vertex<Ctx> = Vertex::State(&S11);
static V_S12: Vertex<Ctx> = Vertex::State(&S12);
static V_S21: Vertex<Ctx> = Vertex::State(&S21);
static V_S22: Vertex<Ctx> = Vertex::State(&S22);
static V_S321: Vertex<Ctx> = Vertex::State(&S321);
static V_DONE: Vertex<Ctx> = Vertex::State(&DONE);
static V_S1_HIST: Vertex<Ctx> = Vertex::History(&S1_HIST);
static V_S2_HIST: Vertex<Ctx> = Vertex::History(&S2_HIST);
static V_S3_HIST: Vertex<Ctx> = Vertex::History(&S3_HIST);
static V_CH1: Vertex<Ctx> = Vertex::Choice(&CH1);
static V_CH2: Vertex<Ctx> = Vertex::Choice(&CH2);
static V_J1: Vertex<Ctx> = Vertex::Junction(&J1);
static V_J_LOOP: Vertex<Ctx> = Vertex::Junction(&J_LOOP);

fn top_init(ctx: &mut Ctx) {
    ctx.log.push("init:top");
}

/// Main machine: starts in `s0`.
pub static DEF: MachineDef<Ctx> = MachineDef {
    name: "pseudo_test",
    initial: &S0,
    initial_action: Some(top_init),
};

/// Alternative machine over the same graph: starts in composite `s1`.
pub static DEF_NESTED: MachineDef<Ctx> = MachineDef {
    name: "pseudo_test_nested",
    initial: &S1,
    initial_action: None,
};
