//! The host environment that owns in-flight resources and delivers their
//! lifecycle signals.
//!
//! Everything here runs on one thread: signals are delivered between turns of
//! the event loop, never concurrently with `start_loading_fragment`.

mod env;
mod resource;
mod signal;
mod success;

pub use env::Environment;
pub use resource::{ResourceHandle, ResourceTable};
pub use signal::{noop, ReadyState, Signal, SignalCallback, SignalKind, SignalStyle};
pub use success::{callback_key, SuccessCallback, SuccessRegistry, CALLBACK_PREFIX};
