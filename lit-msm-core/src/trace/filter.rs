//! Two-layer record filtering: by record kind, then by machine.

use super::{RecordKind, TraceRecord, Tracer};

/// Decides which records reach the sink.
///
/// Both layers must pass: the record kind has to be switched on, and when an
/// object filter is set the record has to be about that machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceFilter {
    kinds: u32,
    machine: Option<&'static str>,
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl TraceFilter {
    const ALL_KINDS: u32 = u32::MAX >> (32 - RecordKind::COUNT);

    /// Everything on, no object filter.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kinds: Self::ALL_KINDS,
            machine: None,
        }
    }

    /// Everything off.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            kinds: 0,
            machine: None,
        }
    }

    pub fn on(&mut self, kind: RecordKind) -> &mut Self {
        self.kinds |= kind.bit();
        self
    }

    pub fn off(&mut self, kind: RecordKind) -> &mut Self {
        self.kinds &= !kind.bit();
        self
    }

    pub fn all_on(&mut self) -> &mut Self {
        self.kinds = Self::ALL_KINDS;
        self
    }

    pub fn all_off(&mut self) -> &mut Self {
        self.kinds = 0;
        self
    }

    /// Only pass records about `machine`; `None` passes every machine.
    pub fn machine(&mut self, machine: Option<&'static str>) -> &mut Self {
        self.machine = machine;
        self
    }

    #[must_use]
    pub fn is_enabled(&self, kind: RecordKind) -> bool {
        self.kinds & kind.bit() != 0
    }

    #[must_use]
    pub fn passes(&self, record: &TraceRecord) -> bool {
        self.is_enabled(record.kind) && self.machine.is_none_or(|m| m == record.machine)
    }
}

/// Wraps a tracer behind a [`TraceFilter`].
#[derive(Debug, Default)]
pub struct Filtered<T> {
    pub filter: TraceFilter,
    inner: T,
}

impl<T: Tracer> Filtered<T> {
    pub fn new(filter: TraceFilter, inner: T) -> Self {
        Self { filter, inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Tracer> Tracer for Filtered<T> {
    fn record(&mut self, record: &TraceRecord) {
        if self.filter.passes(record) {
            self.inner.record(record);
        }
    }
}
