//! At-most-once termination for one fragment load.
//!
//! Every signal slot on the resource gets the same callback. The first one to
//! run detaches the resource; any later one sees it already detached and
//! returns without touching anything.

use std::rc::Rc;

use crate::error::CodeDownloadError;
use crate::fragment::FragmentId;
use crate::host::{noop, Environment, ResourceHandle, ResourceTable, Signal, SignalCallback, SignalKind};
use crate::strategy::LoadTerminatedHandler;

/// Callback run when the host gives up on a resource.
pub type TerminationCallback = Rc<dyn Fn(&mut Environment, CodeDownloadError)>;

/// One in-flight load, owned by its termination callback.
struct LoadRequest {
    fragment: FragmentId,
    handle: ResourceHandle,
    handler: Rc<dyn LoadTerminatedHandler>,
}

/// Wires `callback` into every signal slot of `handle`.
///
/// `Load` and `Error` fire it directly. `ReadyStateChange` fires it only once
/// the state is `Loaded` or `Complete`, and swaps itself for a no-op first.
pub fn set_on_terminated(resources: &mut ResourceTable, handle: ResourceHandle, callback: TerminationCallback) {
    for kind in SignalKind::ALL {
        let callback = Rc::clone(&callback);
        let slot: SignalCallback = match kind {
            SignalKind::Load | SignalKind::Error => {
                Rc::new(move |env: &mut Environment, _: Signal| {
                    callback(env, CodeDownloadError::terminated())
                })
            }
            SignalKind::ReadyStateChange => Rc::new(move |env: &mut Environment, signal: Signal| {
                let Signal::ReadyStateChange(state) = signal else {
                    return;
                };
                if !state.is_terminal() {
                    return;
                }
                env.resources_mut()
                    .set_callback(handle, SignalKind::ReadyStateChange, noop());
                callback(env, CodeDownloadError::terminated());
            }),
        };
        resources.set_callback(handle, kind, slot);
    }
}

/// Builds the termination callback for one load of `fragment` through `handle`.
///
/// On first call: detaches the resource, clears the fragment's success
/// registration, drops the resource's callbacks, then notifies `handler`.
/// On any later call the detach fails and nothing happens.
pub fn guard(
    handle: ResourceHandle,
    fragment: FragmentId,
    handler: Rc<dyn LoadTerminatedHandler>,
) -> TerminationCallback {
    let request = LoadRequest {
        fragment,
        handle,
        handler,
    };
    Rc::new(move |env: &mut Environment, error: CodeDownloadError| {
        if !env.resources_mut().detach(request.handle) {
            tracing::trace!(fragment = %request.fragment, handle = %request.handle, "already finalized");
            return;
        }
        env.success_mut().clear(request.fragment);
        env.success_mut().untrack(request.fragment, request.handle);
        env.resources_mut().clear_callbacks(request.handle);
        env.resources_mut().release(request.handle);
        tracing::debug!(fragment = %request.fragment, handle = %request.handle, "fragment load terminated");
        request.handler.load_terminated(error);
    })
}
