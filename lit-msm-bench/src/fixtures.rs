//! Benchmark machine
//!
//! ```text
//! root ─┬─ a ─── a1
//!       └─ b ─── b1
//! ```
//!
//! `FLIP` crosses between the leaves through the root, `TICK` is handled
//! internally by `root` two levels up, `NOP` is claimed by nobody.

use lit_msm_core::prelude::*;

pub const FLIP: Signal = Signal::user(0);
pub const TICK: Signal = Signal::user(1);
pub const NOP: Signal = Signal::user(2);

#[derive(Debug)]
pub struct Flipper {
    msm: Msm<Flipper>,
    pub entries: u64,
    pub ticks: u64,
}

impl Machine for Flipper {
    type Event = Signal;
    fn msm(&self) -> &Msm<Self> {
        &self.msm
    }
    fn msm_mut(&mut self) -> &mut Msm<Self> {
        &mut self.msm
    }
}

impl Default for Flipper {
    fn default() -> Self {
        Self::new()
    }
}

pub static ROOT: MState<Flipper> = MState {
    handler: Some(Flipper::root),
    ..MState::new("root", None)
};
pub static A: MState<Flipper> = MState {
    entry: Some(Flipper::a_e),
    exit: Some(Flipper::a_x),
    ..MState::new("a", Some(&ROOT))
};
pub static A1: MState<Flipper> = MState {
    handler: Some(Flipper::a1),
    entry: Some(Flipper::a1_e),
    exit: Some(Flipper::a1_x),
    ..MState::new("a1", Some(&A))
};
pub static B: MState<Flipper> = MState {
    entry: Some(Flipper::b_e),
    exit: Some(Flipper::b_x),
    ..MState::new("b", Some(&ROOT))
};
pub static B1: MState<Flipper> = MState {
    handler: Some(Flipper::b1),
    entry: Some(Flipper::b1_e),
    exit: Some(Flipper::b1_x),
    ..MState::new("b1", Some(&B))
};

static INIT: TranTable<Flipper> = TranTable {
    target: &A1,
    actions: &[Flipper::a_e, Flipper::a1_e],
};
static A1_FLIP: TranTable<Flipper> = TranTable {
    target: &B1,
    actions: &[Flipper::a1_x, Flipper::a_x, Flipper::b_e, Flipper::b1_e],
};
static B1_FLIP: TranTable<Flipper> = TranTable {
    target: &A1,
    actions: &[Flipper::b1_x, Flipper::b_x, Flipper::a_e, Flipper::a1_e],
};

impl Flipper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            msm: Msm::new("flipper", |_, _| Outcome::Tran(&INIT)),
            entries: 0,
            ticks: 0,
        }
    }

    /// A machine that has already taken its initial transition.
    #[must_use]
    pub fn started() -> Self {
        let mut me = Self::new();
        me.init();
        me
    }

    fn root(me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            TICK => {
                me.ticks += 1;
                Outcome::Handled
            }
            _ => Outcome::Super,
        }
    }

    fn a1(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            FLIP => Outcome::Tran(&A1_FLIP),
            _ => Outcome::Super,
        }
    }

    fn b1(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            FLIP => Outcome::Tran(&B1_FLIP),
            _ => Outcome::Super,
        }
    }

    fn a_e(me: &mut Self) -> Outcome<Self> {
        me.entries += 1;
        Outcome::Entry(&A)
    }
    fn a_x(_me: &mut Self) -> Outcome<Self> {
        Outcome::Exit(&A)
    }
    fn a1_e(me: &mut Self) -> Outcome<Self> {
        me.entries += 1;
        Outcome::Entry(&A1)
    }
    fn a1_x(_me: &mut Self) -> Outcome<Self> {
        Outcome::Exit(&A1)
    }
    fn b_e(me: &mut Self) -> Outcome<Self> {
        me.entries += 1;
        Outcome::Entry(&B)
    }
    fn b_x(_me: &mut Self) -> Outcome<Self> {
        Outcome::Exit(&B)
    }
    fn b1_e(me: &mut Self) -> Outcome<Self> {
        me.entries += 1;
        Outcome::Entry(&B1)
    }
    fn b1_x(_me: &mut Self) -> Outcome<Self> {
        Outcome::Exit(&B1)
    }
}
