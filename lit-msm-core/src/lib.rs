// Copyright 2025 0xjcf
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg_attr(not(any(feature = "std", test)), no_std)]

//! # lit-msm
//! An allocation-free meta state machine kernel for embedded and host code.
//!
//! States are `static` descriptors, transitions are `static` tables of exit
//! and entry actions, and every `dispatch` is one run-to-completion step that
//! walks those tables. Around the kernel sit an optional tracing hook, a
//! bounded event queue per machine ([`active::Active`]), tick-driven
//! [`time::TimeEvent`]s and a cooperative priority scheduler ([`sched`]).

pub mod active;
pub mod fault;
pub mod msm;
pub mod sched;
pub mod state;
pub mod time;
pub mod trace;

#[cfg(any(test, feature = "test-probes"))]
pub mod test_utils;

pub use fault::Fault;
pub use msm::{MAX_ENTRY_DEPTH, Machine, Msm};
pub use state::{Action, Event, Evt, MState, Outcome, OutcomeKind, Signal, TranTable};
pub use trace::{NullTracer, TraceRecord, Tracer};

#[doc(hidden)]
pub mod __private {
    pub use static_cell::StaticCell;
}

pub mod prelude {
    pub use crate::active::{Active, PostError};
    pub use crate::sched::{Runnable, Vanilla};
    pub use crate::time::TimeEvent;
    pub use crate::StateMachine;
    pub use crate::msm::{Machine, Msm};
    pub use crate::state::{Event, Evt, MState, Outcome, Signal, TranTable};
    pub use crate::trace::{NullTracer, Tracer};
}

/// Lifecycle every machine exposes: one `init`, then any number of
/// run-to-completion `dispatch` steps.
///
/// Implemented for every [`Machine`]. A machine must never be dispatched
/// into from its own handlers, actions or tracer.
pub trait StateMachine {
    type Event: Event;
    type State: 'static;

    /// Take the top-most initial transition. Calling it twice without a
    /// [`Msm::reset`] is a fault.
    fn init(&mut self) {
        self.init_traced(None, &mut NullTracer);
    }

    fn init_traced<T: Tracer + ?Sized>(&mut self, e: Option<&Self::Event>, tracer: &mut T);

    fn dispatch(&mut self, e: &Self::Event) {
        self.dispatch_traced(e, &mut NullTracer);
    }

    fn dispatch_traced<T: Tracer + ?Sized>(&mut self, e: &Self::Event, tracer: &mut T);

    /// Whether `state` is the current leaf or one of its ancestors.
    fn is_in_state(&self, state: &Self::State) -> bool;

    /// Current leaf, `None` before `init`.
    fn state(&self) -> Option<&'static Self::State>;
}

impl<M: Machine> StateMachine for M {
    type Event = M::Event;
    type State = MState<M>;

    fn init_traced<T: Tracer + ?Sized>(&mut self, e: Option<&Self::Event>, tracer: &mut T) {
        msm::init(self, e, tracer);
    }

    fn dispatch_traced<T: Tracer + ?Sized>(&mut self, e: &Self::Event, tracer: &mut T) {
        msm::dispatch(self, e, tracer);
    }

    fn is_in_state(&self, state: &MState<M>) -> bool {
        self.msm().is_in_state(state)
    }

    fn state(&self) -> Option<&'static MState<M>> {
        self.msm().state()
    }
}
