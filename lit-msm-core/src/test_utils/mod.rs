//! Fixtures shared by unit tests, integration tests and benches.

pub mod fixture;
pub mod recorder;

pub use recorder::RecordingTracer;
