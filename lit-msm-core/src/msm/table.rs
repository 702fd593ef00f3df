use super::Machine;
use crate::fault::{Fault, fault};
use crate::state::{Outcome, TranTable};
use crate::trace::{RecordKind, TraceRecord, Tracer};

/// Run every step of `table` and land in its target.
///
/// If the last step started a nested segment (an initial transition, an
/// entry or exit point, history), the machine lands in that segment's target
/// instead and the returned outcome tells the caller to keep drilling.
pub(crate) fn exec_table<M, T>(me: &mut M, table: &'static TranTable<M>, tracer: &mut T) -> Outcome<M>
where
    M: Machine,
    T: Tracer + ?Sized,
{
    let name = me.msm().name();
    let mut r = Outcome::Null;

    for &action in table.actions {
        r = action(me);
        match r {
            Outcome::Entry(s) => {
                tracer.record(&TraceRecord::new(RecordKind::StateEntry, name).target(s.name));
            }
            Outcome::Exit(s) => {
                tracer.record(&TraceRecord::new(RecordKind::StateExit, name).target(s.name));
            }
            Outcome::TranInit(nested) => tracer.record(
                &TraceRecord::new(RecordKind::StateInit, name)
                    .source(table.target.name)
                    .target(nested.target.name),
            ),
            Outcome::TranEp(nested) => tracer.record(
                &TraceRecord::new(RecordKind::TranEp, name)
                    .source(table.target.name)
                    .target(nested.target.name),
            ),
            Outcome::TranXp { table: nested, .. } => tracer.record(
                &TraceRecord::new(RecordKind::TranXp, name)
                    .source(table.target.name)
                    .target(nested.target.name),
            ),
            Outcome::Null | Outcome::Tran(_) | Outcome::TranHist { .. } => {}
            Outcome::Super | Outcome::SuperSub(_) | Outcome::Unhandled | Outcome::Handled => {
                fault(Fault::UnexpectedTableStep)
            }
        }
    }

    let target = match r.nested_table() {
        Some(nested) if r.is_drill_down() => nested.target,
        _ => table.target,
    };
    me.msm_mut().set_state(target);

    r
}
