//! Integration tests for the kernel with host-side sinks and tooling

use crate::common::*;
use anyhow::{Context, Result};
use lit_msm_core::active::Active;
use lit_msm_core::test_utils::RecordingTracer;
use lit_msm_core::test_utils::fixture::{S12, S211, TestMachine, sig};
use lit_msm_core::trace::{Filtered, RecordKind, TraceBuffer, TraceFilter, TracingTracer};
use lit_msm_core::{Fault, StateMachine};
use serde_json::json;

#[test]
fn test_trace_records_serialize_to_json() -> Result<()> {
    let mut m = TestMachine::new();
    let mut tracer = RecordingTracer::new();
    m.init_traced(None, &mut tracer);

    let first = serde_json::to_value(tracer.records().first().context("no records")?)?;
    assert_eq!(
        first,
        json!({
            "kind": "StateInit",
            "machine": "test",
            "signal": null,
            "source": "top",
            "target": "s",
        })
    );

    tracer.clear();
    m.dispatch_traced(&sig::C, &mut tracer);
    let tran = tracer.last(RecordKind::Tran).context("no tran record")?;
    let value = serde_json::to_value(tran)?;
    assert_eq!(value["signal"], json!(sig::C.0));
    assert_eq!(value["source"], "s1");
    assert_eq!(value["target"], "s211");
    Ok(())
}

#[test]
fn test_tracing_sink_under_a_subscriber() {
    setup_tracing();

    let mut m = TestMachine::new();
    m.init_traced(None, &mut TracingTracer);
    for s in [sig::B, sig::T, sig::H, sig::X] {
        m.dispatch_traced(&s, &mut TracingTracer);
    }

    assert!(m.state().unwrap().is(&S12));
}

#[test]
fn test_trace_ring_dump_for_host_tooling() -> Result<()> {
    let mut ao: Active<TestMachine, 8> = Active::new(TestMachine::new(), 1);
    let mut filter = TraceFilter::all();
    filter.off(RecordKind::StateEntry).off(RecordKind::StateExit);
    let mut trace = Filtered::new(filter, TraceBuffer::<64>::new());

    ao.start(&mut trace);
    ao.post(sig::G, 1, &mut trace)?;
    ao.post(sig::I, 1, &mut trace)?;
    while ao.dispatch_next(&mut trace) {}
    assert!(ao.machine().is_in_state(&S211));

    let mut dump = Vec::new();
    let n = trace.inner_mut().drain(|stamped| dump.push(serde_json::to_value(stamped)));
    let dump = dump.into_iter().collect::<Result<Vec<_>, _>>()?;

    assert_eq!(n, dump.len());
    assert!(dump.iter().all(|v| v["record"]["kind"] != "StateEntry"));
    let seqs: Vec<u64> = dump.iter().filter_map(|v| v["seq"].as_u64()).collect();
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(dump.last().context("empty dump")?["record"]["kind"], "InternTran");
    Ok(())
}

#[test]
fn test_errors_compose_with_anyhow() -> Result<()> {
    let mut ao: Active<TestMachine, 1> = Active::new(TestMachine::new(), 1);
    ao.start(&mut RecordingTracer::new());
    ao.post(sig::I, 0, &mut RecordingTracer::new())?;

    let err = ao
        .post(sig::I, 1, &mut RecordingTracer::new())
        .context("second post")
        .unwrap_err();
    assert_eq!(format!("{err:#}"), "second post: event queue has no room above the margin");

    let fault = anyhow::Error::new(Fault::HistoryTooDeep);
    assert!(fault.to_string().starts_with("msm:620"));
    Ok(())
}
