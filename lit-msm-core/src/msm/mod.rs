//! Meta state machine event processor.
//!
//! A machine is an application struct that embeds an [`Msm`] and implements
//! [`Machine`]. Its states are [`MState`] statics and its transitions are
//! [`TranTable`](crate::state::TranTable) statics; the functions here walk
//! those tables one run-to-completion step at a time.
//!
//! Nothing in this module allocates. The only bounded buffer is the entry
//! path used when restoring history, [`MAX_ENTRY_DEPTH`] entries deep.

mod exit;
mod history;
mod table;

use core::fmt;

use crate::fault::{Fault, fault};
use crate::state::{Event, InitialHandler, MState, Outcome};
use crate::trace::{RecordKind, TraceRecord, Tracer};

pub(crate) use exit::exit_to_source;
pub(crate) use history::enter_history;
pub(crate) use table::exec_table;

/// Entry actions a transition to history may have to replay.
pub const MAX_ENTRY_DEPTH: usize = 4;

/// Name reported for the implicit root state.
pub const TOP: &str = "top";

/// Implemented by every application state machine.
pub trait Machine: Sized + 'static {
    type Event: Event;

    fn msm(&self) -> &Msm<Self>;
    fn msm_mut(&mut self) -> &mut Msm<Self>;
}

/// Per-instance bookkeeping: the current state and, until `init` runs, the
/// top-most initial transition.
pub struct Msm<M: Machine> {
    name: &'static str,
    state: Option<&'static MState<M>>,
    initial: Option<InitialHandler<M>>,
}

impl<M: Machine> Msm<M> {
    /// New instance sitting in the implicit top state.
    #[must_use]
    pub const fn new(name: &'static str, initial: InitialHandler<M>) -> Self {
        Self {
            name,
            state: None,
            initial: Some(initial),
        }
    }

    /// Put the instance back in the top state so `init` can run again.
    ///
    /// No exit actions run; the caller owns whatever the old configuration
    /// left behind.
    pub fn reset(&mut self, initial: InitialHandler<M>) {
        self.state = None;
        self.initial = Some(initial);
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current leaf state, `None` before `init`.
    #[must_use]
    pub fn state(&self) -> Option<&'static MState<M>> {
        self.state
    }

    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.state.map_or(TOP, |s| s.name)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Whether `state` is the current state or one of its ancestors.
    #[must_use]
    pub fn is_in_state(&self, state: &MState<M>) -> bool {
        let mut s = self.state;
        while let Some(cur) = s {
            if cur.is(state) {
                return true;
            }
            s = cur.superstate;
        }
        false
    }

    fn current(&self) -> &'static MState<M> {
        self.state.unwrap_or_else(|| fault(Fault::DispatchBeforeInit))
    }

    fn set_state(&mut self, state: &'static MState<M>) {
        self.state = Some(state);
    }
}

impl<M: Machine> fmt::Debug for Msm<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Msm")
            .field("name", &self.name)
            .field("state", &self.state_name())
            .field("pending_init", &self.initial.is_some())
            .finish()
    }
}

/// Take the top-most initial transition and drill down to a stable leaf.
pub(crate) fn init<M, T>(me: &mut M, e: Option<&M::Event>, tracer: &mut T)
where
    M: Machine,
    T: Tracer + ?Sized,
{
    let msm = me.msm_mut();
    let name = msm.name;
    let initial = match (msm.state, msm.initial.take()) {
        (None, Some(initial)) => initial,
        _ => fault(Fault::InitPrecondition),
    };

    let Outcome::Tran(table) = initial(me, e) else {
        fault(Fault::InitNotTaken)
    };

    tracer.record(
        &TraceRecord::new(RecordKind::StateInit, name)
            .source(TOP)
            .target(table.target.name),
    );

    me.msm_mut().set_state(table.target);

    let mut r = exec_table(me, table, tracer);
    while r.is_drill_down() {
        let Some(nested) = r.nested_table() else {
            break;
        };
        r = exec_table(me, nested, tracer);
    }

    #[cfg(feature = "debug-log")]
    log::debug!("{name}: initialized in {}", me.msm().state_name());

    tracer.record(&TraceRecord::new(RecordKind::InitTran, name).target(me.msm().current().name));
}

/// Process one event to completion.
pub(crate) fn dispatch<M, T>(me: &mut M, e: &M::Event, tracer: &mut T)
where
    M: Machine,
    T: Tracer + ?Sized,
{
    let name = me.msm().name;
    let sig = e.signal();
    let mut s = me.msm().current();

    tracer.record(&TraceRecord::new(RecordKind::Dispatch, name).signal(sig).source(s.name));

    // scan the hierarchy for a level that claims the event
    let mut level = s;
    let mut next = Some(s);
    let mut r = Outcome::Super;
    while let Some(t) = next {
        level = t;
        r = match t.handler {
            Some(handler) => handler(me, e),
            None => Outcome::Super,
        };
        next = match r {
            Outcome::Super => t.superstate,
            Outcome::SuperSub(host) => Some(host),
            Outcome::Unhandled => {
                tracer.record(
                    &TraceRecord::new(RecordKind::Unhandled, name)
                        .signal(sig)
                        .source(t.name),
                );
                t.superstate
            }
            Outcome::Handled => break,
            other if other.is_transition() => break,
            _ => fault(Fault::UnexpectedScanOutcome),
        };
    }

    if r.is_transition() {
        let source = level;
        let mut t = level;
        loop {
            r = match r {
                Outcome::Tran(table) => {
                    exit_to_source(me, s, t, tracer);
                    exec_table(me, table, tracer)
                }
                Outcome::TranInit(table) | Outcome::TranEp(table) => exec_table(me, table, tracer),
                Outcome::TranHist { table, history } => {
                    exit_to_source(me, s, t, tracer);
                    let _ = exec_table(me, table, tracer);
                    enter_history(me, history, tracer)
                }
                Outcome::TranXp { table, action } => {
                    tracer.record(
                        &TraceRecord::new(RecordKind::TranXp, name)
                            .source(s.name)
                            .target(table.target.name),
                    );
                    exit_to_source(me, s, t, tracer);
                    let _ = exec_table(me, table, tracer);
                    action(me)
                }
                _ => fault(Fault::UnexpectedTransition),
            };
            s = me.msm().current();
            t = s;
            if !r.is_transition() {
                break;
            }
        }

        tracer.record(
            &TraceRecord::new(RecordKind::Tran, name)
                .signal(sig)
                .source(source.name)
                .target(s.name),
        );
    } else if matches!(r, Outcome::Handled) {
        tracer.record(
            &TraceRecord::new(RecordKind::InternTran, name)
                .signal(sig)
                .source(level.name),
        );
    } else {
        #[cfg(feature = "debug-log")]
        log::debug!("{name}: signal {} ignored in {}", sig.0, s.name);

        tracer.record(&TraceRecord::new(RecordKind::Ignored, name).signal(sig).source(s.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateMachine;
    use crate::state::{Signal, TranTable};
    use crate::test_utils::RecordingTracer;
    use crate::test_utils::fixture::{S, S1, S11, S12, S2, S21, S211, T, TestMachine, sig};
    use crate::trace::NullTracer;

    fn initialized() -> TestMachine {
        let mut m = TestMachine::new();
        m.init();
        m.clear_log();
        m
    }

    #[test]
    fn init_drills_down_to_the_default_leaf() {
        let mut m = TestMachine::new();
        let mut tracer = RecordingTracer::new();
        assert!(m.state().is_none());

        m.init_traced(None, &mut tracer);

        assert_eq!(m.log(), ["s-entry", "s-init", "s1-entry", "s1-init", "s11-entry"]);
        assert!(m.state().unwrap().is(&S11));
        assert_eq!(
            tracer.kinds(),
            [
                RecordKind::StateInit,
                RecordKind::StateEntry,
                RecordKind::StateInit,
                RecordKind::StateEntry,
                RecordKind::StateInit,
                RecordKind::StateEntry,
                RecordKind::InitTran,
            ]
        );
        assert_eq!(tracer.records()[0].source, Some(TOP));
        assert_eq!(tracer.targets(RecordKind::StateInit), ["s", "s1", "s11"]);
        assert_eq!(tracer.last(RecordKind::InitTran).unwrap().target, Some("s11"));
    }

    #[test]
    #[should_panic(expected = "msm:200")]
    fn second_init_is_fatal() {
        let mut m = initialized();
        m.init();
    }

    #[test]
    fn reset_allows_a_fresh_init() {
        let mut m = initialized();
        m.dispatch(&sig::C);
        assert!(m.is_in_state(&S2));

        m.msm_mut().reset(|_, _| Outcome::Tran(&TO_S1));
        assert!(!m.msm().is_initialized());
        m.clear_log();
        m.init();
        // the replacement initial transition has no drill-down
        assert!(m.state().unwrap().is(&S1));
        assert!(m.log().is_empty());
    }

    static TO_S1: TranTable<TestMachine> = TranTable {
        target: &S1,
        actions: &[],
    };

    #[test]
    #[should_panic(expected = "msm:300")]
    fn dispatch_before_init_is_fatal() {
        TestMachine::new().dispatch(&sig::A);
    }

    #[test]
    fn unclaimed_event_changes_nothing() {
        let mut m = initialized();
        let mut tracer = RecordingTracer::new();

        for _ in 0..3 {
            m.dispatch_traced(&sig::X, &mut tracer);
        }

        assert!(m.state().unwrap().is(&S11));
        assert!(m.log().is_empty());
        assert_eq!(tracer.count(RecordKind::Ignored), 3);
        assert_eq!(tracer.count(RecordKind::Tran), 0);
        assert_eq!(tracer.last(RecordKind::Ignored).unwrap().source, Some("s11"));
    }

    #[test]
    fn internal_transition_runs_no_actions() {
        let mut m = initialized();
        let mut tracer = RecordingTracer::new();

        m.dispatch_traced(&sig::I, &mut tracer);

        assert_eq!(m.counter, 1);
        assert!(m.log().is_empty());
        assert_eq!(tracer.kinds(), [RecordKind::Dispatch, RecordKind::InternTran]);
        assert_eq!(tracer.records()[1].source, Some("s"));
    }

    #[test]
    fn failed_guard_falls_through_to_the_superstate() {
        let mut m = initialized();
        let mut tracer = RecordingTracer::new();

        m.dispatch_traced(&sig::D, &mut tracer);

        assert!(m.log().is_empty());
        assert_eq!(
            tracer.kinds(),
            [RecordKind::Dispatch, RecordKind::Unhandled, RecordKind::InternTran]
        );
        assert_eq!(tracer.records()[1].source, Some("s11"));
        assert_eq!(tracer.records()[2].source, Some("s1"));
    }

    #[test]
    fn passing_guard_takes_the_transition() {
        let mut m = initialized();
        m.guard = true;

        m.dispatch(&sig::D);

        assert_eq!(
            m.log(),
            ["s11-exit", "s1-exit", "s1-entry", "s1-init", "s11-entry"]
        );
        assert!(m.state().unwrap().is(&S11));
    }

    #[test]
    fn self_transition_on_superstate() {
        let mut m = initialized();
        let mut tracer = RecordingTracer::new();

        m.dispatch_traced(&sig::A, &mut tracer);

        assert_eq!(
            m.log(),
            ["s11-exit", "s1-exit", "s1-entry", "s1-init", "s11-entry"]
        );
        assert_eq!(tracer.targets(RecordKind::StateExit), ["s11", "s1"]);
        assert_eq!(tracer.targets(RecordKind::StateEntry), ["s1", "s11"]);
        let tran = tracer.last(RecordKind::Tran).unwrap();
        assert_eq!(tran.signal, Some(sig::A));
        assert_eq!(tran.source, Some("s1"));
        assert_eq!(tran.target, Some("s11"));
    }

    #[test]
    fn transition_drills_into_the_target_composite() {
        let mut m = initialized();

        m.dispatch(&sig::C);

        assert_eq!(
            m.log(),
            [
                "s11-exit",
                "s1-exit",
                "s2-entry",
                "s2-init",
                "s21-entry",
                "s21-init",
                "s211-entry"
            ]
        );
        assert!(m.state().unwrap().is(&S211));
        for s in [&S, &S2, &S21, &S211] {
            assert!(m.is_in_state(s), "{}", s.name);
        }
        for s in [&S1, &S11, &S12, &T] {
            assert!(!m.is_in_state(s), "{}", s.name);
        }
    }

    #[test]
    fn transition_to_an_ancestor_reenters_its_initial_path() {
        let mut m = initialized();
        m.dispatch(&sig::G);
        assert!(m.state().unwrap().is(&S211));
        m.clear_log();

        m.dispatch(&sig::G);

        assert_eq!(
            m.log(),
            [
                "s211-exit",
                "s21-exit",
                "s2-exit",
                "s-init",
                "s1-entry",
                "s1-init",
                "s11-entry"
            ]
        );
        assert!(m.state().unwrap().is(&S11));
    }

    #[test]
    fn history_restores_the_last_leaf() {
        let mut m = initialized();
        m.dispatch(&sig::B);
        assert!(m.state().unwrap().is(&S12));

        m.dispatch(&sig::T);
        assert!(m.state().unwrap().is(&T));
        assert!(m.history.is(&S12));
        m.clear_log();

        let mut tracer = RecordingTracer::new();
        m.dispatch_traced(&sig::H, &mut tracer);

        assert_eq!(m.log(), ["s-entry", "s1-entry", "s12-entry"]);
        assert!(m.state().unwrap().is(&S12));
        let hist = tracer.last(RecordKind::TranHist).unwrap();
        assert_eq!(hist.source, Some("s"));
        assert_eq!(hist.target, Some("s12"));
        let tran = tracer.last(RecordKind::Tran).unwrap();
        assert_eq!(tran.source, Some("t"));
        assert_eq!(tran.target, Some("s12"));
    }

    #[test]
    fn is_in_state_before_init_is_false() {
        let m = TestMachine::new();
        assert!(!m.is_in_state(&S));
        assert_eq!(m.msm().state_name(), TOP);
    }

    /// A machine whose handlers break the outcome rules.
    struct Rogue {
        msm: Msm<Rogue>,
    }

    impl Machine for Rogue {
        type Event = Signal;
        fn msm(&self) -> &Msm<Self> {
            &self.msm
        }
        fn msm_mut(&mut self) -> &mut Msm<Self> {
            &mut self.msm
        }
    }

    impl Rogue {
        fn rogue(_me: &mut Self, _e: &Signal) -> Outcome<Self> {
            Outcome::Entry(&ROGUE)
        }
    }

    static ROGUE: MState<Rogue> = MState {
        handler: Some(Rogue::rogue),
        ..MState::new("rogue", None)
    };
    static TO_ROGUE: TranTable<Rogue> = TranTable {
        target: &ROGUE,
        actions: &[],
    };

    #[test]
    #[should_panic(expected = "msm:210")]
    fn initial_transition_must_be_taken() {
        let mut m = Rogue {
            msm: Msm::new("rogue", |_, _| Outcome::Handled),
        };
        m.init_traced(None, &mut NullTracer);
    }

    #[test]
    #[should_panic(expected = "msm:310")]
    fn entry_outcome_from_a_handler_is_fatal() {
        let mut m = Rogue {
            msm: Msm::new("rogue", |_, _| Outcome::Tran(&TO_ROGUE)),
        };
        m.init();
        m.dispatch(&Signal::USER);
    }
}
