//! Tracers that forward records to a logging facade.

#[cfg(any(feature = "debug-log", feature = "std"))]
use super::{TraceRecord, Tracer};

/// Emits every record through `log` at trace level.
#[cfg(feature = "debug-log")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

#[cfg(feature = "debug-log")]
impl Tracer for LogTracer {
    fn record(&mut self, record: &TraceRecord) {
        log::trace!(
            "{:?} sm={} sig={:?} src={} tgt={}",
            record.kind,
            record.machine,
            record.signal.map(|s| s.0),
            record.source.unwrap_or("-"),
            record.target.unwrap_or("-"),
        );
    }
}

/// Emits every record as a structured `tracing` event.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracer;

#[cfg(feature = "std")]
impl Tracer for TracingTracer {
    fn record(&mut self, record: &TraceRecord) {
        tracing::debug!(
            target: "lit_msm",
            kind = ?record.kind,
            machine = record.machine,
            signal = record.signal.map(|s| s.0),
            source = record.source,
            target_state = record.target,
            "msm trace"
        );
    }
}
