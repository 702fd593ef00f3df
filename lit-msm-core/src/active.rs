//! Active objects: a machine plus its own bounded event queue.
//!
//! Producers (interrupt handlers, time events, other machines) post events;
//! the scheduler later takes them out one at a time and runs one
//! run-to-completion step per event. Posting never dispatches, so a machine
//! is never re-entered from inside its own step.
//!
//! The queue is a plain field, so producers running in interrupt context
//! must reach the object through a critical section of the caller's choice.

use core::fmt;

use heapless::Deque;

use crate::StateMachine;
use crate::fault::{Fault, fault};
use crate::msm::Machine;
use crate::sched::Runnable;
use crate::state::Event;
use crate::trace::{RecordKind, TraceRecord, Tracer};

/// Highest priority an active object may use.
pub const MAX_PRIORITY: u8 = 63;

/// Returned when a post with a non-zero margin does not fit.
#[derive(Debug, PartialEq, Eq)]
pub enum PostError<E> {
    /// Fewer free slots than the requested margin; the event is handed back.
    Full(E),
}

impl<E> PostError<E> {
    pub fn into_inner(self) -> E {
        match self {
            PostError::Full(e) => e,
        }
    }
}

impl<E> fmt::Display for PostError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostError::Full(_) => write!(f, "event queue has no room above the margin"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for PostError<E> {}

/// A machine that owns a FIFO of `N` pending events.
pub struct Active<M: Machine, const N: usize> {
    machine: M,
    queue: Deque<M::Event, N>,
    prio: u8,
    min_free: usize,
    started: bool,
}

impl<M: Machine, const N: usize> Active<M, N> {
    /// Wrap `machine` at priority `prio` (1..=[`MAX_PRIORITY`], higher runs first).
    pub fn new(machine: M, prio: u8) -> Self {
        if prio == 0 || prio > MAX_PRIORITY {
            fault(Fault::BadPriority);
        }
        Self {
            machine,
            queue: Deque::new(),
            prio,
            min_free: N,
            started: false,
        }
    }

    /// Run the machine's top-most initial transition.
    pub fn start<T: Tracer + ?Sized>(&mut self, tracer: &mut T) {
        if self.started {
            fault(Fault::AlreadyStarted);
        }
        self.started = true;
        self.machine.init_traced(None, tracer);
    }

    /// Append `e` if more than `margin` slots would remain free.
    ///
    /// With `margin == 0` the post is guaranteed: a full queue is a fault
    /// rather than an error.
    ///
    /// # Errors
    /// Returns `PostError::Full(e)` when the margin cannot be honoured.
    pub fn post<T: Tracer + ?Sized>(
        &mut self,
        e: M::Event,
        margin: usize,
        tracer: &mut T,
    ) -> Result<(), PostError<M::Event>> {
        let name = self.machine.msm().name();
        let sig = e.signal();
        if self.free() > margin {
            tracer.record(&TraceRecord::new(RecordKind::Post, name).signal(sig));
            // a free slot was checked above
            let _ = self.queue.push_back(e);
            self.track_min_free();
            Ok(())
        } else {
            if margin == 0 {
                fault(Fault::QueueOverflow);
            }
            #[cfg(feature = "debug-log")]
            log::warn!("{name}: post of signal {} refused, {} free", sig.0, self.free());
            tracer.record(&TraceRecord::new(RecordKind::PostAttempt, name).signal(sig));
            Err(PostError::Full(e))
        }
    }

    /// Put `e` at the front so it is processed next. Overflow is a fault.
    pub fn post_lifo<T: Tracer + ?Sized>(&mut self, e: M::Event, tracer: &mut T) {
        let name = self.machine.msm().name();
        let sig = e.signal();
        if self.queue.push_front(e).is_err() {
            fault(Fault::LifoOverflow);
        }
        tracer.record(&TraceRecord::new(RecordKind::PostLifo, name).signal(sig));
        self.track_min_free();
    }

    /// Take one event off the queue and process it to completion.
    ///
    /// Returns `false` without doing anything if the queue was empty.
    pub fn dispatch_next<T: Tracer + ?Sized>(&mut self, tracer: &mut T) -> bool {
        let Some(e) = self.queue.pop_front() else {
            return false;
        };
        tracer.record(
            &TraceRecord::new(RecordKind::Get, self.machine.msm().name()).signal(e.signal()),
        );
        self.machine.dispatch_traced(&e, tracer);
        true
    }

    #[must_use]
    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    #[must_use]
    pub fn priority(&self) -> u8 {
        self.prio
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn free(&self) -> usize {
        N - self.queue.len()
    }

    /// Fewest free slots seen since construction.
    #[must_use]
    pub fn min_free(&self) -> usize {
        self.min_free
    }

    fn track_min_free(&mut self) {
        self.min_free = self.min_free.min(self.free());
    }
}

impl<M: Machine, const N: usize> fmt::Debug for Active<M, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Active")
            .field("machine", self.machine.msm())
            .field("prio", &self.prio)
            .field("queued", &self.queue.len())
            .field("min_free", &self.min_free)
            .finish()
    }
}

impl<M: Machine, const N: usize> Runnable for Active<M, N> {
    fn name(&self) -> &'static str {
        self.machine.msm().name()
    }

    fn priority(&self) -> u8 {
        self.prio
    }

    fn is_ready(&self) -> bool {
        !self.queue.is_empty()
    }

    fn step(&mut self, tracer: &mut dyn Tracer) -> bool {
        self.dispatch_next(tracer)
    }
}

/// Place an [`Active`] in static memory and get a `&'static mut` to it.
///
/// ```rust,ignore
/// let blinky = lit_msm_core::static_active!(BLINKY: Blinky, 8, Blinky::new(), 1);
/// blinky.start(&mut NullTracer);
/// ```
///
/// # Panics
///
/// Panics if the same expansion runs twice.
#[macro_export]
macro_rules! static_active {
    ($(#[$attr:meta])* $name:ident: $machine:ty, $capacity:expr, $init:expr, $prio:expr) => {{
        $(#[$attr])*
        static $name: $crate::__private::StaticCell<$crate::active::Active<$machine, $capacity>> =
            $crate::__private::StaticCell::new();
        $name.init($crate::active::Active::new($init, $prio))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Signal;
    use crate::test_utils::RecordingTracer;
    use crate::test_utils::fixture::{S2, S11, TestMachine, sig};
    use crate::trace::NullTracer;

    fn started<const N: usize>() -> Active<TestMachine, N> {
        let mut ao = Active::new(TestMachine::new(), 3);
        ao.start(&mut NullTracer);
        ao
    }

    #[test]
    fn fifo_order_and_one_step_per_event() {
        let mut ao = started::<4>();
        let mut tracer = RecordingTracer::new();

        ao.post(sig::C, 0, &mut tracer).unwrap();
        ao.post(sig::I, 0, &mut tracer).unwrap();
        assert_eq!(ao.len(), 2);
        assert!(ao.machine().is_in_state(&S11));

        assert!(ao.dispatch_next(&mut tracer));
        assert!(ao.machine().is_in_state(&S2));
        assert_eq!(ao.machine().counter, 0);

        assert!(ao.dispatch_next(&mut tracer));
        assert_eq!(ao.machine().counter, 1);
        assert!(!ao.dispatch_next(&mut tracer));

        assert_eq!(tracer.count(RecordKind::Post), 2);
        assert_eq!(tracer.count(RecordKind::Get), 2);
        assert_eq!(tracer.count(RecordKind::Dispatch), 2);
    }

    #[test]
    fn margin_refuses_without_fault() {
        let mut ao = started::<3>();
        let mut tracer = RecordingTracer::new();

        ao.post(sig::I, 1, &mut tracer).unwrap();
        ao.post(sig::I, 1, &mut tracer).unwrap();
        let err = ao.post(sig::A, 1, &mut tracer).unwrap_err();

        assert_eq!(err, PostError::Full(sig::A));
        assert_eq!(err.into_inner(), sig::A);
        assert_eq!(ao.len(), 2);
        assert_eq!(ao.min_free(), 1);
        assert_eq!(tracer.count(RecordKind::PostAttempt), 1);
    }

    #[test]
    #[should_panic(expected = "active:110")]
    fn guaranteed_post_into_full_queue_is_fatal() {
        let mut ao = started::<1>();
        ao.post(sig::I, 0, &mut NullTracer).unwrap();
        let _ = ao.post(sig::I, 0, &mut NullTracer);
    }

    #[test]
    fn lifo_jumps_the_queue() {
        let mut ao = started::<4>();
        ao.post(sig::I, 0, &mut NullTracer).unwrap();
        ao.post_lifo(sig::C, &mut NullTracer);

        ao.dispatch_next(&mut NullTracer);
        assert!(ao.machine().is_in_state(&S2));
        assert_eq!(ao.machine().counter, 0);
    }

    #[test]
    #[should_panic(expected = "active:210")]
    fn lifo_overflow_is_fatal() {
        let mut ao = started::<1>();
        ao.post_lifo(sig::I, &mut NullTracer);
        ao.post_lifo(sig::I, &mut NullTracer);
    }

    #[test]
    #[should_panic(expected = "active:310")]
    fn double_start_is_fatal() {
        let mut ao = started::<1>();
        ao.start(&mut NullTracer);
    }

    #[test]
    #[should_panic(expected = "active:300")]
    fn priority_zero_is_rejected() {
        let _ = Active::<TestMachine, 1>::new(TestMachine::new(), 0);
    }

    #[test]
    fn static_placement() {
        let ao = crate::static_active!(STATIC_AO: TestMachine, 2, TestMachine::new(), 7);
        ao.start(&mut NullTracer);
        ao.post(Signal::user(7), 0, &mut NullTracer).unwrap();
        assert!(ao.dispatch_next(&mut NullTracer));
        assert_eq!(ao.machine().counter, 1);
        assert_eq!(ao.priority(), 7);
    }
}
