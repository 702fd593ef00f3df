//! Capturing tracer for assertions on emitted records.

use heapless::Vec;

use crate::trace::{RecordKind, TraceRecord, Tracer};

/// Records captured per tracer before it refuses more.
pub const RECORDER_CAPACITY: usize = 256;

/// Keeps every record it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingTracer {
    records: Vec<TraceRecord, RECORDER_CAPACITY>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<RecordKind, RECORDER_CAPACITY> {
        self.records.iter().map(|r| r.kind).collect()
    }

    /// Target names of every record of `kind`, e.g. the states entered.
    #[must_use]
    pub fn targets(&self, kind: RecordKind) -> Vec<&'static str, RECORDER_CAPACITY> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.target)
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// The last record of `kind`, if any.
    #[must_use]
    pub fn last(&self, kind: RecordKind) -> Option<&TraceRecord> {
        self.records.iter().rev().find(|r| r.kind == kind)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Tracer for RecordingTracer {
    fn record(&mut self, record: &TraceRecord) {
        self.records
            .push(*record)
            .expect("RecordingTracer full; clear it between steps");
    }
}
