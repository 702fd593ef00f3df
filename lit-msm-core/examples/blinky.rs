//! LED chaser on the host.
//!
//! `running` steps through four LEDs on every `TIMEOUT`. `BUTTON` pauses
//! and a second `BUTTON` resumes at the LED that was lit, through a
//! transition to history. The "board" is a simulated tick loop.
//!
//! ```sh
//! RUST_LOG=lit_msm=debug cargo run -p lit-msm-core --example blinky --features std
//! ```

use lit_msm_core::prelude::*;
use lit_msm_core::trace::TracingTracer;
use tracing_subscriber::EnvFilter;

const TIMEOUT: Signal = Signal::user(0);
const BUTTON: Signal = Signal::user(1);

const TICKS_PER_SEC: u32 = 100;

struct Blinky {
    msm: Msm<Blinky>,
    lit: Option<usize>,
    resume: &'static MState<Blinky>,
}

impl Machine for Blinky {
    type Event = Signal;
    fn msm(&self) -> &Msm<Self> {
        &self.msm
    }
    fn msm_mut(&mut self) -> &mut Msm<Self> {
        &mut self.msm
    }
}

static RUNNING: MState<Blinky> = MState {
    handler: Some(Blinky::running),
    exit: Some(Blinky::running_x),
    initial: Some(Blinky::running_i),
    ..MState::new("running", None)
};
static PAUSED: MState<Blinky> = MState {
    handler: Some(Blinky::paused),
    ..MState::new("paused", None)
};

// Each LED state hands over to the next one on `TIMEOUT`; `led_x` is shared.
macro_rules! chain {
    ($($state:ident $name:literal $idx:literal $entry:ident $handler:ident => $next:ident $next_entry:ident;)*) => {
        $(
            static $state: MState<Blinky> = MState {
                handler: Some(Blinky::$handler),
                entry: Some(Blinky::$entry),
                exit: Some(Blinky::led_x),
                ..MState::new($name, Some(&RUNNING))
            };

            impl Blinky {
                fn $entry(me: &mut Self) -> Outcome<Self> {
                    me.lit = Some($idx);
                    tracing::info!(led = $idx, "on");
                    Outcome::Entry(&$state)
                }

                fn $handler(_me: &mut Self, e: &Signal) -> Outcome<Self> {
                    static NEXT: TranTable<Blinky> = TranTable {
                        target: &$next,
                        actions: &[Blinky::led_x, Blinky::$next_entry],
                    };
                    match *e {
                        TIMEOUT => Outcome::Tran(&NEXT),
                        _ => Outcome::Super,
                    }
                }
            }
        )*
    };
}

chain! {
    LED0 "led0" 0 led0_e led0 => LED1 led1_e;
    LED1 "led1" 1 led1_e led1 => LED2 led2_e;
    LED2 "led2" 2 led2_e led2 => LED3 led3_e;
    LED3 "led3" 3 led3_e led3 => LED0 led0_e;
}

static INIT: TranTable<Blinky> = TranTable {
    target: &RUNNING,
    actions: &[Blinky::running_i],
};
static RUNNING_INIT: TranTable<Blinky> = TranTable {
    target: &LED0,
    actions: &[Blinky::led0_e],
};
static PAUSE: TranTable<Blinky> = TranTable {
    target: &PAUSED,
    actions: &[Blinky::running_x],
};
static RESUME: TranTable<Blinky> = TranTable {
    target: &RUNNING,
    actions: &[],
};

impl Blinky {
    fn new() -> Self {
        Self {
            msm: Msm::new("blinky", |_, _| Outcome::Tran(&INIT)),
            lit: None,
            resume: &LED0,
        }
    }

    fn running(_me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            BUTTON => Outcome::Tran(&PAUSE),
            _ => Outcome::Super,
        }
    }

    fn running_x(me: &mut Self) -> Outcome<Self> {
        if let Some(leaf) = me.msm.state() {
            me.resume = leaf;
        }
        Outcome::Exit(&RUNNING)
    }

    fn running_i(_me: &mut Self) -> Outcome<Self> {
        Outcome::TranInit(&RUNNING_INIT)
    }

    fn paused(me: &mut Self, e: &Signal) -> Outcome<Self> {
        match *e {
            BUTTON => Outcome::TranHist {
                table: &RESUME,
                history: me.resume,
            },
            // time keeps running while paused
            TIMEOUT => Outcome::Handled,
            _ => Outcome::Super,
        }
    }

    fn led_x(me: &mut Self) -> Outcome<Self> {
        let state = me.msm.state().unwrap_or(&LED0);
        if let Some(idx) = me.lit.take() {
            tracing::info!(led = idx, "off");
        }
        Outcome::Exit(state)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let blinky = lit_msm_core::static_active!(BLINKY: Blinky, 8, Blinky::new(), 1);
    let mut timeout = TimeEvent::new("blinky.timeout", TIMEOUT);
    let mut sched = Vanilla::new();
    let mut tracer = TracingTracer;

    blinky.start(&mut tracer);
    timeout.arm(TICKS_PER_SEC / 4, TICKS_PER_SEC / 4);

    // three seconds of simulated ticks, with a button press at 1s and 2s
    for tick in 1..=3 * TICKS_PER_SEC {
        timeout.tick_into(&mut *blinky, &mut tracer);
        if tick % TICKS_PER_SEC == 0 && tick < 3 * TICKS_PER_SEC {
            if let Err(e) = blinky.post(BUTTON, 1, &mut tracer) {
                tracing::warn!(%e, "button press lost");
            }
        }
        sched.run_until_idle(&mut [&mut *blinky], &mut tracer);
    }

    tracing::info!(
        state = blinky.machine().msm().state_name(),
        steps = sched.steps(),
        min_free = blinky.min_free(),
        "done"
    );
}
