use super::Machine;
use crate::fault::{Fault, fault};
use crate::state::{MState, Outcome};
use crate::trace::{RecordKind, TraceRecord, Tracer};

/// Exit every state from `s` up to, but not including, the transition
/// source `ts`.
///
/// States without an exit action are passed over silently. An exit action
/// that answers [`Outcome::SuperSub`] belongs to a submachine, and the walk
/// continues at that submachine's host instead of the lexical superstate.
pub(crate) fn exit_to_source<M, T>(
    me: &mut M,
    mut s: &'static MState<M>,
    ts: &'static MState<M>,
    tracer: &mut T,
) where
    M: Machine,
    T: Tracer + ?Sized,
{
    let name = me.msm().name();
    while !s.is(ts) {
        let next = match s.exit {
            Some(exit) => match exit(me) {
                Outcome::Exit(_) => {
                    tracer.record(&TraceRecord::new(RecordKind::StateExit, name).target(s.name));
                    s.superstate
                }
                Outcome::SuperSub(host) => Some(host),
                _ => fault(Fault::UnexpectedExitOutcome),
            },
            None => s.superstate,
        };
        s = next.unwrap_or_else(|| fault(Fault::SourceNotAncestor));
    }
}
