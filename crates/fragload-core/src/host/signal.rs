//! Lifecycle signals a resource can emit.

use std::rc::Rc;

use super::Environment;

/// Loading state reported by hosts that only have a generic state-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Uninitialized,
    Loading,
    Loaded,
    Interactive,
    Complete,
}

impl ReadyState {
    /// `Loaded` and `Complete` mean the host is done with the resource.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReadyState::Loaded | ReadyState::Complete)
    }
}

/// One signal delivered for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Load,
    Error,
    ReadyStateChange(ReadyState),
}

impl Signal {
    pub fn kind(self) -> SignalKind {
        match self {
            Signal::Load => SignalKind::Load,
            Signal::Error => SignalKind::Error,
            Signal::ReadyStateChange(_) => SignalKind::ReadyStateChange,
        }
    }
}

/// The fixed set of signal slots on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Load,
    Error,
    ReadyStateChange,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [
        SignalKind::Load,
        SignalKind::Error,
        SignalKind::ReadyStateChange,
    ];
}

/// Which signals the host emits when a fetch finishes.
///
/// `Distinct` hosts report `Load` or `Error`. `ReadyState` hosts only report
/// state changes and cannot tell success from failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalStyle {
    #[default]
    Distinct,
    ReadyState,
}

/// Callback stored in a resource's signal slot. Receives the environment so
/// it can detach the resource it belongs to.
pub type SignalCallback = Rc<dyn Fn(&mut Environment, Signal)>;

/// A callback that ignores its signal.
pub fn noop() -> SignalCallback {
    Rc::new(|_: &mut Environment, _: Signal| {})
}
