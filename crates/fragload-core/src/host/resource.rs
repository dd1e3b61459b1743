//! Resource records and the parent collection they are installed into.
//!
//! A resource is created inert, becomes observable on `install`, and is
//! finalized by `detach`. Membership in the parent collection is the only
//! record of whether a resource has already been finalized.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::signal::{SignalCallback, SignalKind};

/// Opaque id of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(u64);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

struct Resource {
    url: String,
    callbacks: HashMap<SignalKind, SignalCallback>,
}

/// Owns every live resource plus the ordered parent collection of attached ones.
#[derive(Default)]
pub struct ResourceTable {
    next_id: u64,
    resources: HashMap<ResourceHandle, Resource>,
    /// Attached resources, in install order.
    parent: Vec<ResourceHandle>,
    /// Installed but not yet handed to a transport.
    pending: VecDeque<ResourceHandle>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resource that will fetch `url` once installed.
    pub fn create_resource(&mut self, url: &str) -> ResourceHandle {
        let handle = ResourceHandle(self.next_id);
        self.next_id += 1;
        self.resources.insert(
            handle,
            Resource {
                url: url.to_string(),
                callbacks: HashMap::new(),
            },
        );
        handle
    }

    /// Attaches `handle` to the parent collection and queues it for fetching.
    /// Unknown or already-attached handles are ignored.
    pub fn install(&mut self, handle: ResourceHandle) {
        if !self.resources.contains_key(&handle) || self.is_attached(handle) {
            tracing::debug!(%handle, "install ignored for unknown or attached resource");
            return;
        }
        self.parent.push(handle);
        self.pending.push_back(handle);
    }

    /// Removes `handle` from the parent collection. Returns false, and changes
    /// nothing, if it was not attached.
    pub fn detach(&mut self, handle: ResourceHandle) -> bool {
        let Some(pos) = self.parent.iter().position(|h| *h == handle) else {
            return false;
        };
        self.parent.remove(pos);
        self.pending.retain(|h| *h != handle);
        true
    }

    pub fn is_attached(&self, handle: ResourceHandle) -> bool {
        self.parent.contains(&handle)
    }

    /// Attached resources in install order.
    pub fn attached(&self) -> &[ResourceHandle] {
        &self.parent
    }

    pub fn url(&self, handle: ResourceHandle) -> Option<&str> {
        self.resources.get(&handle).map(|r| r.url.as_str())
    }

    pub fn set_callback(&mut self, handle: ResourceHandle, kind: SignalKind, callback: SignalCallback) {
        if let Some(r) = self.resources.get_mut(&handle) {
            r.callbacks.insert(kind, callback);
        }
    }

    pub fn callback(&self, handle: ResourceHandle, kind: SignalKind) -> Option<SignalCallback> {
        self.resources
            .get(&handle)
            .and_then(|r| r.callbacks.get(&kind))
            .cloned()
    }

    /// Drops every signal callback on `handle`.
    pub fn clear_callbacks(&mut self, handle: ResourceHandle) {
        if let Some(r) = self.resources.get_mut(&handle) {
            r.callbacks.clear();
        }
    }

    /// Forgets the resource entirely. Detaches first if still attached.
    pub fn release(&mut self, handle: ResourceHandle) {
        self.detach(handle);
        self.resources.remove(&handle);
    }

    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.resources.contains_key(&handle)
    }

    /// Drains installed resources not yet started, with their URLs. Resources
    /// detached in the meantime are skipped.
    pub fn take_pending(&mut self) -> Vec<(ResourceHandle, String)> {
        let mut out = Vec::with_capacity(self.pending.len());
        while let Some(handle) = self.pending.pop_front() {
            if let Some(r) = self.resources.get(&handle) {
                out.push((handle, r.url.clone()));
            }
        }
        out
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
