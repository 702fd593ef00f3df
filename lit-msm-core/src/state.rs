//! State descriptors, transition-action tables and handler outcomes.
//!
//! Everything in this module is meant to be built as `static` data. A state
//! tree is a set of [`MState`] statics linked through their `superstate`
//! references, and every transition a handler can take is a [`TranTable`]
//! static listing the exit and entry actions to run in order.

use core::fmt;

use crate::msm::Machine;

/// Signal carried by every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Signal(pub u16);

impl Signal {
    /// First signal available to applications. Lower values are reserved.
    pub const USER: Signal = Signal(4);

    /// Offset a signal from [`Signal::USER`].
    #[must_use]
    pub const fn user(offset: u16) -> Self {
        Signal(Self::USER.0 + offset)
    }
}

/// Anything that can be dispatched to a machine.
///
/// The kernel only ever looks at the signal; payloads are for handlers.
pub trait Event {
    fn signal(&self) -> Signal;
}

impl Event for Signal {
    fn signal(&self) -> Signal {
        *self
    }
}

/// Plain event: a signal plus an opaque payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evt<P = ()> {
    pub sig: Signal,
    pub payload: P,
}

impl Evt<()> {
    #[must_use]
    pub const fn new(sig: Signal) -> Self {
        Self { sig, payload: () }
    }
}

impl<P> Evt<P> {
    #[must_use]
    pub const fn with_payload(sig: Signal, payload: P) -> Self {
        Self { sig, payload }
    }
}

impl<P> Event for Evt<P> {
    fn signal(&self) -> Signal {
        self.sig
    }
}

/// State handler: decides what an event means in one state.
pub type StateHandler<M> = fn(&mut M, &<M as Machine>::Event) -> Outcome<M>;

/// Entry, exit, initial-transition and exit-point actions.
pub type Action<M> = fn(&mut M) -> Outcome<M>;

/// The top-most initial transition, run once by `init`.
pub type InitialHandler<M> = fn(&mut M, Option<&<M as Machine>::Event>) -> Outcome<M>;

/// Immutable description of one state.
///
/// Top-level states have no superstate; the implicit root is never a
/// descriptor of its own.
pub struct MState<M: Machine + 'static> {
    pub name: &'static str,
    pub superstate: Option<&'static MState<M>>,
    /// `None` defers every event to the superstate.
    pub handler: Option<StateHandler<M>>,
    pub entry: Option<Action<M>>,
    pub exit: Option<Action<M>>,
    pub initial: Option<Action<M>>,
}

impl<M: Machine> MState<M> {
    /// Descriptor with no handler and no actions.
    #[must_use]
    pub const fn new(name: &'static str, superstate: Option<&'static MState<M>>) -> Self {
        Self {
            name,
            superstate,
            handler: None,
            entry: None,
            exit: None,
            initial: None,
        }
    }

    /// Identity comparison. Two descriptors are the same state only if they
    /// are the same static.
    #[inline]
    #[must_use]
    pub fn is(&self, other: &MState<M>) -> bool {
        core::ptr::eq(self, other)
    }

    /// Nesting level, 1 for a top-level state.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut s = self.superstate;
        while let Some(up) = s {
            depth += 1;
            s = up.superstate;
        }
        depth
    }
}

impl<M: Machine> fmt::Debug for MState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MState")
            .field("name", &self.name)
            .field("superstate", &self.superstate.map(|s| s.name))
            .field("entry", &self.entry.is_some())
            .field("exit", &self.exit.is_some())
            .field("initial", &self.initial.is_some())
            .finish()
    }
}

/// Ordered action steps of one transition segment and its target.
pub struct TranTable<M: Machine + 'static> {
    pub target: &'static MState<M>,
    pub actions: &'static [Action<M>],
}

impl<M: Machine> fmt::Debug for TranTable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranTable")
            .field("target", &self.target.name)
            .field("steps", &self.actions.len())
            .finish()
    }
}

/// What a handler or an action did.
///
/// Transition variants carry the table to execute, so nothing has to be
/// staged in the machine between the handler returning and the dispatcher
/// acting on it.
pub enum Outcome<M: Machine + 'static> {
    /// Not handled here, try the superstate.
    Super,
    /// Not handled here, try the host state of this submachine. Also
    /// returned by the exit action of a submachine state.
    SuperSub(&'static MState<M>),
    /// Not handled because a guard failed. Scanned like [`Outcome::Super`].
    Unhandled,
    /// Handled without a state change.
    Handled,
    /// An entry action ran for the given state.
    Entry(&'static MState<M>),
    /// An exit action ran for the given state.
    Exit(&'static MState<M>),
    /// Nothing worth reporting.
    Null,
    /// Regular transition.
    Tran(&'static TranTable<M>),
    /// Initial transition of a composite state or submachine.
    TranInit(&'static TranTable<M>),
    /// Transition to the recorded history of the table's target.
    TranHist {
        table: &'static TranTable<M>,
        history: &'static MState<M>,
    },
    /// Transition into a submachine entry point.
    TranEp(&'static TranTable<M>),
    /// Transition through a submachine exit point. `action` runs after the
    /// table and continues the transition at host level.
    TranXp {
        table: &'static TranTable<M>,
        action: Action<M>,
    },
}

impl<M: Machine> Clone for Outcome<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Machine> Copy for Outcome<M> {}

/// Field-less mirror of [`Outcome`], handy for assertions and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Super,
    SuperSub,
    Unhandled,
    Handled,
    Entry,
    Exit,
    Null,
    Tran,
    TranInit,
    TranHist,
    TranEp,
    TranXp,
}

impl<M: Machine> Outcome<M> {
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Super => OutcomeKind::Super,
            Outcome::SuperSub(_) => OutcomeKind::SuperSub,
            Outcome::Unhandled => OutcomeKind::Unhandled,
            Outcome::Handled => OutcomeKind::Handled,
            Outcome::Entry(_) => OutcomeKind::Entry,
            Outcome::Exit(_) => OutcomeKind::Exit,
            Outcome::Null => OutcomeKind::Null,
            Outcome::Tran(_) => OutcomeKind::Tran,
            Outcome::TranInit(_) => OutcomeKind::TranInit,
            Outcome::TranHist { .. } => OutcomeKind::TranHist,
            Outcome::TranEp(_) => OutcomeKind::TranEp,
            Outcome::TranXp { .. } => OutcomeKind::TranXp,
        }
    }

    /// Any kind of transition, including initial-transition continuations.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        self.nested_table().is_some()
    }

    /// A transition that continues a chain already in progress rather than
    /// starting a new one from a handler.
    #[must_use]
    pub fn is_drill_down(&self) -> bool {
        matches!(
            self,
            Outcome::TranInit(_)
                | Outcome::TranHist { .. }
                | Outcome::TranEp(_)
                | Outcome::TranXp { .. }
        )
    }

    /// The table carried by a transition outcome.
    #[must_use]
    pub fn nested_table(&self) -> Option<&'static TranTable<M>> {
        match *self {
            Outcome::Tran(table)
            | Outcome::TranInit(table)
            | Outcome::TranEp(table)
            | Outcome::TranHist { table, .. }
            | Outcome::TranXp { table, .. } => Some(table),
            _ => None,
        }
    }
}

impl<M: Machine> fmt::Debug for Outcome<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::SuperSub(host) => write!(f, "SuperSub({})", host.name),
            Outcome::Entry(s) => write!(f, "Entry({})", s.name),
            Outcome::Exit(s) => write!(f, "Exit({})", s.name),
            Outcome::TranHist { table, history } => {
                write!(f, "TranHist({} -> {})", table.target.name, history.name)
            }
            other => match other.nested_table() {
                Some(table) => write!(f, "{:?}({})", other.kind(), table.target.name),
                None => write!(f, "{:?}", other.kind()),
            },
        }
    }
}
