//! Fatal internal-consistency violations.
//!
//! A fault means a state table or the calling code is broken; there is no
//! safe way to continue the run-to-completion step. Every fault goes through
//! [`fault`], which logs (with `debug-log`) and panics.

use core::fmt;

/// Assertion that failed, tagged with the module and id it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `init` called on a machine that already left the top state, or whose
    /// initial handler was already consumed.
    InitPrecondition,
    /// The top-most initial handler returned something other than a
    /// regular transition.
    InitNotTaken,
    /// `dispatch` called before `init`.
    DispatchBeforeInit,
    /// A state handler returned an outcome that makes no sense while
    /// scanning the hierarchy.
    UnexpectedScanOutcome,
    /// The transition loop met an outcome that is not a transition.
    UnexpectedTransition,
    /// A table step returned a handler-only outcome (handled, unhandled,
    /// super or submachine super).
    UnexpectedTableStep,
    /// An exit action returned something other than exit or submachine exit.
    UnexpectedExitOutcome,
    /// Walking up from the current state never reached the transition source.
    SourceNotAncestor,
    /// The history leaf is not nested inside the transition source.
    HistoryPathBroken,
    /// More entry actions on the history path than the entry buffer holds.
    HistoryTooDeep,
    /// A guaranteed (margin 0) post found the queue full.
    QueueOverflow,
    /// LIFO post into a full queue.
    LifoOverflow,
    /// Active object priority outside 1..=63.
    BadPriority,
    /// `start` called twice on the same active object.
    AlreadyStarted,
    /// Time event armed while already armed, or with zero ticks.
    TimeEvtArm,
    /// Time event re-armed with zero ticks.
    TimeEvtRearm,
    /// Two runnables in one scheduler share a priority.
    DuplicatePriority,
}

impl Fault {
    /// Module that raised the fault.
    #[must_use]
    pub const fn module(self) -> &'static str {
        match self {
            Fault::QueueOverflow | Fault::LifoOverflow | Fault::BadPriority | Fault::AlreadyStarted => {
                "active"
            }
            Fault::TimeEvtArm | Fault::TimeEvtRearm => "time",
            Fault::DuplicatePriority => "sched",
            _ => "msm",
        }
    }

    /// Numeric id within the module.
    #[must_use]
    pub const fn id(self) -> u16 {
        match self {
            Fault::InitPrecondition => 200,
            Fault::InitNotTaken => 210,
            Fault::DispatchBeforeInit => 300,
            Fault::UnexpectedScanOutcome => 310,
            Fault::UnexpectedTransition => 330,
            Fault::UnexpectedTableStep => 400,
            Fault::UnexpectedExitOutcome => 510,
            Fault::SourceNotAncestor => 511,
            Fault::HistoryPathBroken => 610,
            Fault::HistoryTooDeep => 620,
            Fault::QueueOverflow => 110,
            Fault::LifoOverflow => 210,
            Fault::BadPriority => 300,
            Fault::AlreadyStarted => 310,
            Fault::TimeEvtArm => 100,
            Fault::TimeEvtRearm => 110,
            Fault::DuplicatePriority => 100,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Fault::InitPrecondition => "init called twice or without an initial handler",
            Fault::InitNotTaken => "top-most initial transition not taken",
            Fault::DispatchBeforeInit => "dispatch before init",
            Fault::UnexpectedScanOutcome => "unexpected handler outcome while scanning",
            Fault::UnexpectedTransition => "unexpected outcome in transition chain",
            Fault::UnexpectedTableStep => "unexpected transition-action table step outcome",
            Fault::UnexpectedExitOutcome => "unexpected exit action outcome",
            Fault::SourceNotAncestor => "transition source is not an ancestor of the current state",
            Fault::HistoryPathBroken => "history state is not nested in the transition source",
            Fault::HistoryTooDeep => "history entry path exceeds the maximum entry depth",
            Fault::QueueOverflow => "event queue overflow on guaranteed post",
            Fault::LifoOverflow => "event queue overflow on LIFO post",
            Fault::BadPriority => "active object priority out of range",
            Fault::AlreadyStarted => "active object started twice",
            Fault::TimeEvtArm => "time event already armed or armed with zero ticks",
            Fault::TimeEvtRearm => "time event re-armed with zero ticks",
            Fault::DuplicatePriority => "duplicate priority in scheduler set",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.module(), self.id(), self.describe())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Fault {}

/// Fail fast on a broken invariant.
#[cold]
#[track_caller]
pub fn fault(f: Fault) -> ! {
    #[cfg(feature = "debug-log")]
    log::error!("fault {f}");
    panic!("{f}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_module_and_id() {
        assert_eq!(
            Fault::HistoryTooDeep.to_string(),
            "msm:620: history entry path exceeds the maximum entry depth"
        );
        assert_eq!(Fault::QueueOverflow.module(), "active");
        assert_eq!(Fault::TimeEvtRearm.id(), 110);
    }

    #[test]
    #[should_panic(expected = "msm:300")]
    fn fault_panics_with_its_id() {
        fault(Fault::DispatchBeforeInit);
    }
}
