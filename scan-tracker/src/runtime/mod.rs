//! Runtime integration layer.
//!
//! Keeps thread and runtime ownership in one place. The broker session lives
//! on its own OS thread with its own current-thread runtime, while fan-out
//! runs as a task on whichever runtime constructed the tracker.

pub(crate) mod session_runtime;
