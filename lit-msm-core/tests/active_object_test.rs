// lit-msm-core/tests/active_object_test.rs
//
// Two active objects under the vanilla scheduler: a blinker driven by a
// periodic time event and a counter it pings on every "on" edge.

#[cfg(test)]
pub mod active_object_test {
    use lit_msm_core::active::{Active, PostError};
    use lit_msm_core::prelude::*;
    use lit_msm_core::trace::{Filtered, RecordKind, TraceBuffer, TraceFilter};

    const TIMEOUT: Signal = Signal::user(0);
    const PING: Signal = Signal::user(1);

    pub struct Blinker {
        msm: Msm<Blinker>,
        pings_due: u32,
    }

    impl Machine for Blinker {
        type Event = Signal;
        fn msm(&self) -> &Msm<Self> {
            &self.msm
        }
        fn msm_mut(&mut self) -> &mut Msm<Self> {
            &mut self.msm
        }
    }

    static OFF: MState<Blinker> = MState {
        handler: Some(Blinker::off),
        ..MState::new("off", None)
    };
    static ON: MState<Blinker> = MState {
        handler: Some(Blinker::on),
        entry: Some(Blinker::on_e),
        ..MState::new("on", None)
    };
    static TO_OFF: TranTable<Blinker> = TranTable {
        target: &OFF,
        actions: &[],
    };
    static TO_ON: TranTable<Blinker> = TranTable {
        target: &ON,
        actions: &[Blinker::on_e],
    };

    impl Blinker {
        fn new() -> Self {
            Self {
                msm: Msm::new("blinker", |_, _| Outcome::Tran(&TO_OFF)),
                pings_due: 0,
            }
        }
        fn off(_me: &mut Self, e: &Signal) -> Outcome<Self> {
            match *e {
                TIMEOUT => Outcome::Tran(&TO_ON),
                _ => Outcome::Super,
            }
        }
        fn on(_me: &mut Self, e: &Signal) -> Outcome<Self> {
            match *e {
                TIMEOUT => Outcome::Tran(&TO_OFF),
                _ => Outcome::Super,
            }
        }
        fn on_e(me: &mut Self) -> Outcome<Self> {
            me.pings_due += 1;
            Outcome::Entry(&ON)
        }
    }

    pub struct Counter {
        msm: Msm<Counter>,
        count: u32,
    }

    impl Machine for Counter {
        type Event = Signal;
        fn msm(&self) -> &Msm<Self> {
            &self.msm
        }
        fn msm_mut(&mut self) -> &mut Msm<Self> {
            &mut self.msm
        }
    }

    static COUNTING: MState<Counter> = MState {
        handler: Some(Counter::counting),
        ..MState::new("counting", None)
    };
    static TO_COUNTING: TranTable<Counter> = TranTable {
        target: &COUNTING,
        actions: &[],
    };

    impl Counter {
        fn new() -> Self {
            Self {
                msm: Msm::new("counter", |_, _| Outcome::Tran(&TO_COUNTING)),
                count: 0,
            }
        }
        fn counting(me: &mut Self, e: &Signal) -> Outcome<Self> {
            match *e {
                PING => {
                    me.count += 1;
                    Outcome::Handled
                }
                _ => Outcome::Super,
            }
        }
    }

    #[test]
    fn periodic_time_event_drives_the_blinker() {
        let blinker: &mut Active<Blinker, 4> =
            lit_msm_core::static_active!(BLINKER: Blinker, 4, Blinker::new(), 2);
        let mut counter: Active<Counter, 4> = Active::new(Counter::new(), 1);
        let mut timeout = TimeEvent::new("blink", TIMEOUT);
        let mut sched = Vanilla::new();

        let mut filter = TraceFilter::none();
        filter.on(RecordKind::Tran).machine(Some("blinker"));
        let mut trace = Filtered::new(filter, TraceBuffer::<32>::new());

        blinker.start(&mut trace);
        counter.start(&mut trace);
        timeout.arm(2, 2);

        for _ in 0..8 {
            timeout.tick_into(&mut *blinker, &mut trace);
            sched.run_until_idle(&mut [&mut *blinker, &mut counter], &mut trace);

            let due = core::mem::take(&mut blinker.machine_mut().pings_due);
            for _ in 0..due {
                counter.post(PING, 0, &mut trace).unwrap();
            }
            sched.run_until_idle(&mut [&mut *blinker, &mut counter], &mut trace);
        }

        // four expiries: off -> on -> off -> on -> off
        assert!(blinker.machine().is_in_state(&OFF));
        assert_eq!(counter.machine().count, 2);
        assert_eq!(sched.steps(), 6);

        let tran_targets: Vec<_> = trace.inner().iter().map(|s| s.record.target).collect();
        assert_eq!(
            tran_targets,
            [Some("on"), Some("off"), Some("on"), Some("off")]
        );
        assert!(trace.inner().iter().all(|s| s.record.machine == "blinker"));
    }

    #[test]
    fn margin_post_hands_the_event_back() {
        let mut counter: Active<Counter, 2> = Active::new(Counter::new(), 1);
        let mut trace = TraceBuffer::<8>::new();
        counter.start(&mut trace);
        trace.clear();

        assert!(counter.post(PING, 1, &mut trace).is_ok());
        assert_eq!(counter.post(PING, 1, &mut trace), Err(PostError::Full(PING)));
        assert_eq!(counter.len(), 1);

        let kinds: Vec<_> = trace.iter().map(|s| s.record.kind).collect();
        assert_eq!(kinds, [RecordKind::Post, RecordKind::PostAttempt]);
    }

    #[test]
    fn trace_ring_keeps_the_latest_records() {
        let mut counter: Active<Counter, 8> = Active::new(Counter::new(), 1);
        let mut trace = TraceBuffer::<4>::new();
        counter.start(&mut NullTracer);

        for _ in 0..3 {
            counter.post(PING, 0, &mut trace).unwrap();
        }
        while counter.dispatch_next(&mut trace) {}

        // 3 posts plus 3 x (get, dispatch, intern-tran)
        assert_eq!(trace.dropped(), 8);
        assert_eq!(trace.len(), 4);
        let last = trace.iter().last().unwrap();
        assert_eq!(last.seq, 12);
        assert_eq!(last.record.kind, RecordKind::InternTran);
        assert_eq!(counter.machine().count, 3);
        assert_eq!(counter.min_free(), 5);
    }
}
