//! Software tracing hook.
//!
//! The kernel describes what happened during a run-to-completion step as a
//! stream of [`TraceRecord`]s handed to a [`Tracer`]. Encoding, transport and
//! storage are up to the sink. Tracers are called synchronously from inside
//! `dispatch`, so they must not block and must not call back into the machine
//! being traced.

pub mod buffer;
pub mod filter;
mod sinks;

pub use buffer::{Stamped, TraceBuffer};
pub use filter::{Filtered, TraceFilter};
#[cfg(feature = "debug-log")]
pub use sinks::LogTracer;
#[cfg(feature = "std")]
pub use sinks::TracingTracer;

use crate::state::Signal;

/// Milestones the kernel and the active-object layer report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum RecordKind {
    /// Start of a dispatch: signal, machine, current state.
    Dispatch = 0,
    /// A guard left the event unhandled at `source`.
    Unhandled,
    StateEntry,
    StateExit,
    /// Initial transition from `source` into `target`.
    StateInit,
    /// `init` finished in `target`.
    InitTran,
    TranEp,
    TranXp,
    TranHist,
    /// A transition chain from `source` ended in `target`.
    Tran,
    /// Handled at `source` without a state change.
    InternTran,
    /// Nobody claimed the event.
    Ignored,
    Post,
    PostLifo,
    /// A post with margin that did not fit.
    PostAttempt,
    Get,
    TimeEvtArm,
    TimeEvtDisarm,
    TimeEvtPost,
}

impl RecordKind {
    pub const COUNT: usize = 19;

    pub const ALL: [RecordKind; Self::COUNT] = [
        RecordKind::Dispatch,
        RecordKind::Unhandled,
        RecordKind::StateEntry,
        RecordKind::StateExit,
        RecordKind::StateInit,
        RecordKind::InitTran,
        RecordKind::TranEp,
        RecordKind::TranXp,
        RecordKind::TranHist,
        RecordKind::Tran,
        RecordKind::InternTran,
        RecordKind::Ignored,
        RecordKind::Post,
        RecordKind::PostLifo,
        RecordKind::PostAttempt,
        RecordKind::Get,
        RecordKind::TimeEvtArm,
        RecordKind::TimeEvtDisarm,
        RecordKind::TimeEvtPost,
    ];

    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u8)
    }

    /// Records produced by the state machine kernel itself.
    #[must_use]
    pub const fn is_kernel(self) -> bool {
        (self as u8) <= (RecordKind::Ignored as u8)
    }
}

/// One trace milestone and the identities it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceRecord {
    pub kind: RecordKind,
    /// Name of the machine (or active object) the record is about.
    pub machine: &'static str,
    pub signal: Option<Signal>,
    pub source: Option<&'static str>,
    pub target: Option<&'static str>,
}

impl TraceRecord {
    #[must_use]
    pub const fn new(kind: RecordKind, machine: &'static str) -> Self {
        Self {
            kind,
            machine,
            signal: None,
            source: None,
            target: None,
        }
    }

    #[must_use]
    pub const fn signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    #[must_use]
    pub const fn source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub const fn target(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }
}

/// Receiver of trace records.
pub trait Tracer {
    fn record(&mut self, record: &TraceRecord);
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    fn record(&mut self, record: &TraceRecord) {
        (**self).record(record);
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracer;

impl Tracer for NullTracer {
    #[inline]
    fn record(&mut self, _record: &TraceRecord) {}
}
