//! The host environment: resources, success registrations, and dispatch.

use super::{
    callback_key, ResourceHandle, ResourceTable, Signal, SuccessCallback, SuccessRegistry,
};
use crate::fragment::FragmentId;

#[derive(Default)]
pub struct Environment {
    resources: ResourceTable,
    success: SuccessRegistry,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceTable {
        &mut self.resources
    }

    pub fn success(&self) -> &SuccessRegistry {
        &self.success
    }

    pub fn success_mut(&mut self) -> &mut SuccessRegistry {
        &mut self.success
    }

    /// Shorthand for `success_mut().register(..)`.
    pub fn on_success(&mut self, fragment: FragmentId, callback: SuccessCallback) {
        tracing::trace!(%fragment, key = %callback_key(fragment), "success callback registered");
        self.success.register(fragment, callback);
    }

    /// Runs the callback wired to `signal`'s slot on `handle`, if any.
    /// Released resources and empty slots make this a no-op.
    pub fn deliver(&mut self, handle: ResourceHandle, signal: Signal) {
        let Some(callback) = self.resources.callback(handle, signal.kind()) else {
            tracing::trace!(%handle, ?signal, "signal has no receiver");
            return;
        };
        callback(self, signal);
    }

    /// The fetched code for `fragment` announced success.
    ///
    /// Every attempt still attached for `fragment` is detached and released
    /// first, so a host signal arriving afterwards finds nothing to act on.
    /// Then the registered success callback, if any, runs once. Returns
    /// whether a callback ran.
    pub fn signal_success(&mut self, fragment: FragmentId) -> bool {
        for handle in self.success.take_tracked(fragment) {
            if self.resources.detach(handle) {
                self.resources.clear_callbacks(handle);
                self.resources.release(handle);
            }
        }
        match self.success.take(fragment) {
            Some(callback) => {
                tracing::debug!(%fragment, "fragment announced success");
                callback(fragment);
                true
            }
            None => {
                tracing::debug!(%fragment, "success announced with no registered callback");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SignalKind;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn deliver_runs_slot_callback() {
        let mut env = Environment::new();
        let h = env.resources_mut().create_resource("https://x/1.cache.js");
        let hits = Rc::new(Cell::new(0));
        let hits_cb = Rc::clone(&hits);
        env.resources_mut().set_callback(
            h,
            SignalKind::Error,
            Rc::new(move |_: &mut Environment, _: Signal| hits_cb.set(hits_cb.get() + 1)),
        );
        env.deliver(h, Signal::Load);
        assert_eq!(hits.get(), 0, "load slot is empty");
        env.deliver(h, Signal::Error);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn deliver_to_released_resource_is_noop() {
        let mut env = Environment::new();
        let h = env.resources_mut().create_resource("https://x/1.cache.js");
        env.resources_mut().release(h);
        env.deliver(h, Signal::Error);
    }

    #[test]
    fn signal_success_detaches_tracked_and_runs_callback_once() {
        let mut env = Environment::new();
        let f = FragmentId(4);
        let h = env.resources_mut().create_resource("https://x/4.cache.js");
        env.resources_mut().install(h);
        env.success_mut().track(f, h);
        let ran = Rc::new(Cell::new(0));
        let ran_cb = Rc::clone(&ran);
        env.on_success(f, Box::new(move |got: FragmentId| {
            assert_eq!(got, FragmentId(4));
            ran_cb.set(ran_cb.get() + 1);
        }));

        assert!(env.signal_success(f));
        assert!(!env.resources().is_attached(h));
        assert!(!env.resources().contains(h));
        assert_eq!(ran.get(), 1);

        assert!(!env.signal_success(f), "callback is consumed");
        assert_eq!(ran.get(), 1);
    }
}
