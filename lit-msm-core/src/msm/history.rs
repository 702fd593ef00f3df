use heapless::Vec;

use super::{MAX_ENTRY_DEPTH, Machine};
use crate::fault::{Fault, fault};
use crate::state::{MState, Outcome};
use crate::trace::{RecordKind, TraceRecord, Tracer};

/// Re-enter `hist` from the composite state the machine currently sits in.
///
/// Entry actions between the composite (exclusive) and `hist` (inclusive)
/// run outermost first. Returns whatever the initial action of `hist`
/// returns, or [`Outcome::Null`] when it has none.
pub(crate) fn enter_history<M, T>(me: &mut M, hist: &'static MState<M>, tracer: &mut T) -> Outcome<M>
where
    M: Machine,
    T: Tracer + ?Sized,
{
    let name = me.msm().name();
    let ts = me.msm().current();

    tracer.record(
        &TraceRecord::new(RecordKind::TranHist, name)
            .source(ts.name)
            .target(hist.name),
    );

    let mut path: Vec<&'static MState<M>, MAX_ENTRY_DEPTH> = Vec::new();
    let mut s = hist;
    while !s.is(ts) {
        if s.entry.is_some() && path.push(s).is_err() {
            fault(Fault::HistoryTooDeep);
        }
        s = s.superstate.unwrap_or_else(|| fault(Fault::HistoryPathBroken));
    }

    for s in path.iter().rev() {
        if let Some(entry) = s.entry {
            let _ = entry(me);
            tracer.record(&TraceRecord::new(RecordKind::StateEntry, name).target(s.name));
        }
    }

    me.msm_mut().set_state(hist);

    match hist.initial {
        Some(initial) => initial(me),
        None => Outcome::Null,
    }
}
