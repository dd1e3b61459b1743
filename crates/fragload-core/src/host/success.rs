//! Out-of-band success path.
//!
//! Fetched code announces success itself as its last action, by invoking the
//! callback registered under [`callback_key`] for its fragment. The registry
//! also remembers which resources were started for each fragment so the
//! announcement can finalize them before the host reports its own signal.

use std::collections::HashMap;

use super::ResourceHandle;
use crate::fragment::FragmentId;

/// Prefix of the name fetched code calls to announce success.
pub const CALLBACK_PREFIX: &str = "runAsyncCallback";

/// Name under which the success callback for `fragment` is published,
/// e.g. `runAsyncCallback7`.
pub fn callback_key(fragment: FragmentId) -> String {
    format!("{CALLBACK_PREFIX}{fragment}")
}

/// Invoked once when a fragment's code announces it has loaded.
pub type SuccessCallback = Box<dyn FnOnce(FragmentId)>;

#[derive(Default)]
pub struct SuccessRegistry {
    callbacks: HashMap<FragmentId, SuccessCallback>,
    tracked: HashMap<FragmentId, Vec<ResourceHandle>>,
}

impl SuccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the success callback for `fragment`, replacing any earlier one.
    pub fn register(&mut self, fragment: FragmentId, callback: SuccessCallback) {
        self.callbacks.insert(fragment, callback);
    }

    pub fn is_registered(&self, fragment: FragmentId) -> bool {
        self.callbacks.contains_key(&fragment)
    }

    /// Drops the registration for `fragment`. Returns whether one existed.
    pub fn clear(&mut self, fragment: FragmentId) -> bool {
        self.callbacks.remove(&fragment).is_some()
    }

    pub(super) fn take(&mut self, fragment: FragmentId) -> Option<SuccessCallback> {
        self.callbacks.remove(&fragment)
    }

    /// Records that `handle` is an attempt at loading `fragment`.
    pub fn track(&mut self, fragment: FragmentId, handle: ResourceHandle) {
        self.tracked.entry(fragment).or_default().push(handle);
    }

    pub fn untrack(&mut self, fragment: FragmentId, handle: ResourceHandle) {
        if let Some(handles) = self.tracked.get_mut(&fragment) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.tracked.remove(&fragment);
            }
        }
    }

    pub fn tracked(&self, fragment: FragmentId) -> &[ResourceHandle] {
        self.tracked.get(&fragment).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(super) fn take_tracked(&mut self, fragment: FragmentId) -> Vec<ResourceHandle> {
        self.tracked.remove(&fragment).unwrap_or_default()
    }
}
