//! Reference hierarchy used across the test suites.
//!
//! ```text
//! s ─┬─ s1 ─┬─ s11
//!    │      └─ s12      (no handler, no exit action)
//!    └─ s2 ─── s21 ─── s211
//! t                     (no exit action)
//! ```
//!
//! | state | signal | effect                                   |
//! |-------|--------|------------------------------------------|
//! | s     | E      | -> s11                                   |
//! | s     | I      | internal, bumps `counter`                |
//! | s     | T      | -> t, leaf recorded as history           |
//! | s1    | A      | self transition                          |
//! | s1    | B      | -> s12                                   |
//! | s1    | C      | -> s2 (drills down to s211)              |
//! | s1    | D      | internal                                 |
//! | s11   | D      | [guard] -> s1, otherwise guard-unhandled |
//! | s11   | G      | -> s211                                  |
//! | s2    | C      | -> s1                                    |
//! | s211  | G      | -> s (drills down to s11)                |
//! | t     | H      | -> history of s                          |
//! | t     | T      | -> s                                     |

use heapless::Vec;

use crate::msm::{Machine, Msm};
use crate::state::{MState, Outcome, Signal, TranTable};

pub mod sig {
    use crate::state::Signal;

    pub const A: Signal = Signal::user(0);
    pub const B: Signal = Signal::user(1);
    pub const C: Signal = Signal::user(2);
    pub const D: Signal = Signal::user(3);
    pub const E: Signal = Signal::user(4);
    pub const G: Signal = Signal::user(5);
    pub const H: Signal = Signal::user(6);
    pub const I: Signal = Signal::user(7);
    pub const T: Signal = Signal::user(8);
    /// Claimed by nobody.
    pub const X: Signal = Signal::user(9);

    pub const ALL: [Signal; 10] = [A, B, C, D, E, G, H, I, T, X];
}

pub const LOG_CAPACITY: usize = 64;

pub struct TestMachine {
    msm: Msm<TestMachine>,
    pub log: Vec<&'static str, LOG_CAPACITY>,
    pub counter: u32,
    /// Guard for `D` in `s11`.
    pub guard: bool,
    /// Leaf active when `s` was last exited.
    pub history: &'static MState<TestMachine>,
}

impl Machine for TestMachine {
    type Event = Signal;

    fn msm(&self) -> &Msm<Self> {
        &self.msm
    }

    fn msm_mut(&mut self) -> &mut Msm<Self> {
        &mut self.msm
    }
}

impl Default for TestMachine {
    fn default() -> Self {
        Self::new()
    }
}

pub static S: MState<TestMachine> = MState {
    handler: Some(TestMachine::s),
    entry: Some(TestMachine::s_e),
    exit: Some(TestMachine::s_x),
    initial: Some(TestMachine::s_i),
    ..MState::new("s", None)
};
pub static S1: MState<TestMachine> = MState {
    handler: Some(TestMachine::s1),
    entry: Some(TestMachine::s1_e),
    exit: Some(TestMachine::s1_x),
    initial: Some(TestMachine::s1_i),
    ..MState::new("s1", Some(&S))
};
pub static S11: MState<TestMachine> = MState {
    handler: Some(TestMachine::s11),
    entry: Some(TestMachine::s11_e),
    exit: Some(TestMachine::s11_x),
    ..MState::new("s11", Some(&S1))
};
pub static S12: MState<TestMachine> = MState {
    entry: Some(TestMachine::s12_e),
    ..MState::new("s12", Some(&S1))
};
pub static S2: MState<TestMachine> = MState {
    handler: Some(TestMachine::s2),
    entry: Some(TestMachine::s2_e),
    exit: Some(TestMachine::s2_x),
    initial: Some(TestMachine::s2_i),
    ..MState::new("s2", Some(&S))
};
pub static S21: MState<TestMachine> = MState {
    entry: Some(TestMachine::s21_e),
    exit: Some(TestMachine::s21_x),
    initial: Some(TestMachine::s21_i),
    ..MState::new("s21", Some(&S2))
};
pub static S211: MState<TestMachine> = MState {
    handler: Some(TestMachine::s211),
    entry: Some(TestMachine::s211_e),
    exit: Some(TestMachine::s211_x),
    ..MState::new("s211", Some(&S21))
};
pub static T: MState<TestMachine> = MState {
    handler: Some(TestMachine::t),
    entry: Some(TestMachine::t_e),
    ..MState::new("t", None)
};

/// Every state, outermost first.
pub static ALL_STATES: [&MState<TestMachine>; 8] = [&S, &S1, &S11, &S12, &S2, &S21, &S211, &T];

static TOP_INIT: TranTable<TestMachine> = TranTable {
    target: &S,
    actions: &[TestMachine::s_e, TestMachine::s_i],
};
static S_INIT: TranTable<TestMachine> = TranTable {
    target: &S1,
    actions: &[TestMachine::s1_e, TestMachine::s1_i],
};
static S1_INIT: TranTable<TestMachine> = TranTable {
    target: &S11,
    actions: &[TestMachine::s11_e],
};
static S2_INIT: TranTable<TestMachine> = TranTable {
    target: &S21,
    actions: &[TestMachine::s21_e, TestMachine::s21_i],
};
static S21_INIT: TranTable<TestMachine> = TranTable {
    target: &S211,
    actions: &[TestMachine::s211_e],
};

static S_E: TranTable<TestMachine> = TranTable {
    target: &S11,
    actions: &[TestMachine::s1_e, TestMachine::s11_e],
};
static S_T: TranTable<TestMachine> = TranTable {
    target: &T,
    actions: &[TestMachine::s_x, TestMachine::t_e],
};
static S1_A: TranTable<TestMachine> = TranTable {
    target: &S1,
    actions: &[TestMachine::s1_x, TestMachine::s1_e, TestMachine::s1_i],
};
static S1_B: TranTable<TestMachine> = TranTable {
    target: &S12,
    actions: &[TestMachine::s12_e],
};
static S1_C: TranTable<TestMachine> = TranTable {
    target: &S2,
    actions: &[TestMachine::s1_x, TestMachine::s2_e, TestMachine::s2_i],
};
static S11_D: TranTable<TestMachine> = TranTable {
    target: &S1,
    actions: &[
        TestMachine::s11_x,
        TestMachine::s1_x,
        TestMachine::s1_e,
        TestMachine::s1_i,
    ],
};
static S11_G: TranTable<TestMachine> = TranTable {
    target: &S211,
    actions: &[
        TestMachine::s11_x,
        TestMachine::s1_x,
        TestMachine::s2_e,
        TestMachine::s21_e,
        TestMachine::s211_e,
    ],
};
static S2_C: TranTable<TestMachine> = TranTable {
    target: &S1,
    actions: &[TestMachine::s2_x, TestMachine::s1_e, TestMachine::s1_i],
};
static S211_G: TranTable<TestMachine> = TranTable {
    target: &S,
    actions: &[
        TestMachine::s211_x,
        TestMachine::s21_x,
        TestMachine::s2_x,
        TestMachine::s_i,
    ],
};
static T_H: TranTable<TestMachine> = TranTable {
    target: &S,
    actions: &[TestMachine::s_e],
};
static T_T: TranTable<TestMachine> = TranTable {
    target: &S,
    actions: &[TestMachine::s_e, TestMachine::s_i],
};

impl TestMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            msm: Msm::new("test", Self::initial),
            log: Vec::new(),
            counter: 0,
            guard: false,
            history: &S11,
        }
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn log(&self) -> &[&'static str] {
        &self.log
    }

    fn note(&mut self, what: &'static str) {
        self.log.push(what).expect("Log vec full in TestMachine");
    }

    fn initial(_me: &mut Self, _e: Option<&Signal>) -> Outcome<Self> {
        Outcome::Tran(&TOP_INIT)
    }

    fn s(me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::E => Outcome::Tran(&S_E),
            sig::I => {
                me.counter += 1;
                Outcome::Handled
            }
            sig::T => Outcome::Tran(&S_T),
            _ => Outcome::Super,
        }
    }

    fn s1(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::A => Outcome::Tran(&S1_A),
            sig::B => Outcome::Tran(&S1_B),
            sig::C => Outcome::Tran(&S1_C),
            sig::D => Outcome::Handled,
            _ => Outcome::Super,
        }
    }

    fn s11(me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::D if me.guard => Outcome::Tran(&S11_D),
            sig::D => Outcome::Unhandled,
            sig::G => Outcome::Tran(&S11_G),
            _ => Outcome::Super,
        }
    }

    fn s2(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::C => Outcome::Tran(&S2_C),
            _ => Outcome::Super,
        }
    }

    fn s211(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::G => Outcome::Tran(&S211_G),
            _ => Outcome::Super,
        }
    }

    fn t(me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            sig::H => Outcome::TranHist {
                table: &T_H,
                history: me.history,
            },
            sig::T => Outcome::Tran(&T_T),
            _ => Outcome::Super,
        }
    }

    fn s_e(me: &mut Self) -> Outcome<Self> {
        me.note("s-entry");
        Outcome::Entry(&S)
    }
    fn s_x(me: &mut Self) -> Outcome<Self> {
        if let Some(leaf) = me.msm.state() {
            me.history = leaf;
        }
        me.note("s-exit");
        Outcome::Exit(&S)
    }
    fn s_i(me: &mut Self) -> Outcome<Self> {
        me.note("s-init");
        Outcome::TranInit(&S_INIT)
    }
    fn s1_e(me: &mut Self) -> Outcome<Self> {
        me.note("s1-entry");
        Outcome::Entry(&S1)
    }
    fn s1_x(me: &mut Self) -> Outcome<Self> {
        me.note("s1-exit");
        Outcome::Exit(&S1)
    }
    fn s1_i(me: &mut Self) -> Outcome<Self> {
        me.note("s1-init");
        Outcome::TranInit(&S1_INIT)
    }
    fn s11_e(me: &mut Self) -> Outcome<Self> {
        me.note("s11-entry");
        Outcome::Entry(&S11)
    }
    fn s11_x(me: &mut Self) -> Outcome<Self> {
        me.note("s11-exit");
        Outcome::Exit(&S11)
    }
    fn s12_e(me: &mut Self) -> Outcome<Self> {
        me.note("s12-entry");
        Outcome::Entry(&S12)
    }
    fn s2_e(me: &mut Self) -> Outcome<Self> {
        me.note("s2-entry");
        Outcome::Entry(&S2)
    }
    fn s2_x(me: &mut Self) -> Outcome<Self> {
        me.note("s2-exit");
        Outcome::Exit(&S2)
    }
    fn s2_i(me: &mut Self) -> Outcome<Self> {
        me.note("s2-init");
        Outcome::TranInit(&S2_INIT)
    }
    fn s21_e(me: &mut Self) -> Outcome<Self> {
        me.note("s21-entry");
        Outcome::Entry(&S21)
    }
    fn s21_x(me: &mut Self) -> Outcome<Self> {
        me.note("s21-exit");
        Outcome::Exit(&S21)
    }
    fn s21_i(me: &mut Self) -> Outcome<Self> {
        me.note("s21-init");
        Outcome::TranInit(&S21_INIT)
    }
    fn s211_e(me: &mut Self) -> Outcome<Self> {
        me.note("s211-entry");
        Outcome::Entry(&S211)
    }
    fn s211_x(me: &mut Self) -> Outcome<Self> {
        me.note("s211-exit");
        Outcome::Exit(&S211)
    }
    fn t_e(me: &mut Self) -> Outcome<Self> {
        me.note("t-entry");
        Outcome::Entry(&T)
    }
}
