//! Cooperative priority scheduler.
//!
//! [`Vanilla`] never preempts: it picks the highest-priority object with a
//! pending event, runs exactly one run-to-completion step on it, and then
//! looks again. Compared to a preemptive kernel the latency of a
//! high-priority object is bounded by the longest single step of any object.

use crate::fault::{Fault, fault};
use crate::trace::Tracer;

/// Anything the scheduler can run one step of.
pub trait Runnable {
    fn name(&self) -> &'static str;

    /// Unique within a scheduled set, higher runs first.
    fn priority(&self) -> u8;

    fn is_ready(&self) -> bool;

    /// Run one step. Returns `false` if there was nothing to do.
    fn step(&mut self, tracer: &mut dyn Tracer) -> bool;
}

/// Non-preemptive "vanilla" scheduler over a borrowed set of objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vanilla {
    steps: u64,
}

impl Vanilla {
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: 0 }
    }

    /// Steps run since construction.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Give one event to the highest-priority ready object.
    ///
    /// Returns `false` when every object is idle.
    pub fn run_once(&mut self, set: &mut [&mut dyn Runnable], tracer: &mut dyn Tracer) -> bool {
        check_unique_priorities(set);

        let mut best: Option<usize> = None;
        for (i, r) in set.iter().enumerate() {
            if !r.is_ready() {
                continue;
            }
            if best.is_none_or(|b| r.priority() > set[b].priority()) {
                best = Some(i);
            }
        }

        let Some(i) = best else {
            return false;
        };

        #[cfg(feature = "debug-log")]
        log::trace!("vanilla: stepping {} (prio {})", set[i].name(), set[i].priority());

        let ran = set[i].step(tracer);
        if ran {
            self.steps += 1;
        }
        ran
    }

    /// Keep stepping until nothing is ready. Returns the number of steps run.
    ///
    /// Never returns if the objects keep posting to each other forever.
    pub fn run_until_idle(&mut self, set: &mut [&mut dyn Runnable], tracer: &mut dyn Tracer) -> usize {
        let mut n = 0;
        while self.run_once(set, tracer) {
            n += 1;
        }
        n
    }
}

fn check_unique_priorities(set: &[&mut dyn Runnable]) {
    // one bit per possible `u8` priority
    let mut seen = [0u64; 4];
    for r in set {
        let p = usize::from(r.priority());
        let (word, bit) = (p / 64, 1u64 << (p % 64));
        if seen[word] & bit != 0 {
            fault(Fault::DuplicatePriority);
        }
        seen[word] |= bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateMachine;
    use crate::active::Active;
    use crate::test_utils::RecordingTracer;
    use crate::test_utils::fixture::{S2, TestMachine, sig};
    use crate::trace::{NullTracer, RecordKind};

    fn started(prio: u8) -> Active<TestMachine, 4> {
        let mut ao = Active::new(TestMachine::new(), prio);
        ao.start(&mut NullTracer);
        ao
    }

    #[test]
    fn idle_set_runs_nothing() {
        let mut a = started(1);
        let mut sched = Vanilla::new();
        assert!(!sched.run_once(&mut [&mut a], &mut NullTracer));
        assert_eq!(sched.steps(), 0);
    }

    #[test]
    fn higher_priority_drains_first() {
        let mut low = started(1);
        let mut high = started(5);
        low.post(sig::I, 0, &mut NullTracer).unwrap();
        high.post(sig::I, 0, &mut NullTracer).unwrap();
        high.post(sig::C, 0, &mut NullTracer).unwrap();

        let mut sched = Vanilla::new();
        let mut tracer = RecordingTracer::new();

        assert!(sched.run_once(&mut [&mut low, &mut high], &mut tracer));
        assert_eq!(high.machine().counter, 1);
        assert_eq!(low.machine().counter, 0);

        assert!(sched.run_once(&mut [&mut low, &mut high], &mut tracer));
        assert!(high.machine().is_in_state(&S2));
        assert_eq!(low.machine().counter, 0);

        assert_eq!(sched.run_until_idle(&mut [&mut low, &mut high], &mut tracer), 1);
        assert_eq!(low.machine().counter, 1);
        assert_eq!(sched.steps(), 3);
        assert_eq!(tracer.count(RecordKind::Get), 3);
    }

    /// A bare runnable with a hand-picked priority and a step budget.
    struct Ticker {
        prio: u8,
        left: u32,
    }

    impl Runnable for Ticker {
        fn name(&self) -> &'static str {
            "ticker"
        }
        fn priority(&self) -> u8 {
            self.prio
        }
        fn is_ready(&self) -> bool {
            self.left > 0
        }
        fn step(&mut self, _tracer: &mut dyn Tracer) -> bool {
            self.left -= 1;
            true
        }
    }

    #[test]
    fn priorities_a_multiple_of_64_apart_are_distinct() {
        let mut a = Ticker { prio: 0, left: 1 };
        let mut b = Ticker { prio: 64, left: 1 };
        let mut c = Ticker { prio: 128, left: 1 };
        let mut d = Ticker { prio: 255, left: 1 };

        let mut sched = Vanilla::new();
        let n = sched.run_until_idle(&mut [&mut a, &mut b, &mut c, &mut d], &mut NullTracer);
        assert_eq!(n, 4);
        assert_eq!(sched.steps(), 4);
    }

    #[test]
    #[should_panic(expected = "sched:100")]
    fn duplicate_high_priorities_are_fatal() {
        let mut a = Ticker { prio: 200, left: 1 };
        let mut b = Ticker { prio: 200, left: 1 };
        let _ = Vanilla::new().run_once(&mut [&mut a, &mut b], &mut NullTracer);
    }

    #[test]
    #[should_panic(expected = "sched:100")]
    fn duplicate_priorities_are_fatal() {
        let mut a = started(2);
        let mut b = started(2);
        let _ = Vanilla::new().run_once(&mut [&mut a, &mut b], &mut NullTracer);
    }
}
