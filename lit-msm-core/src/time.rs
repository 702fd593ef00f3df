//! Tick-driven time events.
//!
//! A [`TimeEvent`] counts down in units of an external tick (a timer
//! interrupt, a host loop) and produces its event on expiry. A zero interval
//! makes it one-shot; otherwise it reloads and fires again every `interval`
//! ticks until disarmed.

use crate::active::Active;
use crate::fault::{Fault, fault};
use crate::msm::Machine;
use crate::state::Event;
use crate::trace::{NullTracer, RecordKind, TraceRecord, Tracer};

#[derive(Debug, Clone)]
pub struct TimeEvent<E> {
    name: &'static str,
    event: E,
    ctr: u32,
    interval: u32,
}

impl<E: Event + Clone> TimeEvent<E> {
    /// Disarmed time event that will deliver `event`.
    pub const fn new(name: &'static str, event: E) -> Self {
        Self {
            name,
            event,
            ctr: 0,
            interval: 0,
        }
    }

    /// Fire after `n_ticks`, then every `interval` ticks (0 for one-shot).
    pub fn arm(&mut self, n_ticks: u32, interval: u32) {
        self.arm_traced(n_ticks, interval, &mut NullTracer);
    }

    pub fn arm_traced<T: Tracer + ?Sized>(&mut self, n_ticks: u32, interval: u32, tracer: &mut T) {
        if n_ticks == 0 || self.is_armed() {
            fault(Fault::TimeEvtArm);
        }
        self.ctr = n_ticks;
        self.interval = interval;
        tracer.record(&TraceRecord::new(RecordKind::TimeEvtArm, self.name).signal(self.event.signal()));
    }

    /// Stop the countdown. Returns whether it was running.
    pub fn disarm(&mut self) -> bool {
        self.disarm_traced(&mut NullTracer)
    }

    pub fn disarm_traced<T: Tracer + ?Sized>(&mut self, tracer: &mut T) -> bool {
        let was_armed = self.is_armed();
        if was_armed {
            tracer.record(
                &TraceRecord::new(RecordKind::TimeEvtDisarm, self.name).signal(self.event.signal()),
            );
        }
        self.ctr = 0;
        was_armed
    }

    /// Restart the countdown at `n_ticks`, keeping the interval. Returns
    /// whether it was already running.
    pub fn rearm(&mut self, n_ticks: u32) -> bool {
        if n_ticks == 0 {
            fault(Fault::TimeEvtRearm);
        }
        let was_armed = self.is_armed();
        self.ctr = n_ticks;
        was_armed
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.ctr != 0
    }

    /// Ticks left until expiry, 0 when disarmed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.ctr
    }

    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Advance one tick. Returns a copy of the event if it just expired.
    pub fn tick(&mut self) -> Option<E> {
        if self.ctr == 0 {
            return None;
        }
        self.ctr -= 1;
        if self.ctr != 0 {
            return None;
        }
        self.ctr = self.interval;
        Some(self.event.clone())
    }

    /// Advance one tick and post the event to `target` if it expired.
    ///
    /// The post uses margin 0, so a full queue at expiry is a fault.
    pub fn tick_into<M, const N: usize, T>(&mut self, target: &mut Active<M, N>, tracer: &mut T) -> bool
    where
        M: Machine<Event = E>,
        T: Tracer + ?Sized,
    {
        let Some(e) = self.tick() else {
            return false;
        };
        tracer.record(
            &TraceRecord::new(RecordKind::TimeEvtPost, self.name)
                .signal(e.signal())
                .target(target.machine().msm().name()),
        );
        // margin 0 never returns Err
        let _ = target.post(e, 0, tracer);
        true
    }
}
