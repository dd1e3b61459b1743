//! Loading strategies: the entry point callers use to fetch a fragment.
//!
//! A load moves Built (URL chosen, serial consumed) → Installed (resource
//! attached, waiting on the host) → Terminated (guard fired). Success is
//! announced out of band by the fetched code and is not a termination.

use std::rc::Rc;

use crate::error::CodeDownloadError;
use crate::fragment::FragmentId;
use crate::guard;
use crate::host::Environment;
use crate::serial::SerialRegistry;
use crate::url_model::{build_url, ModuleLocation, DEFAULT_DEFERRED_DIRECTORY};

/// Receives the single termination notice for a load.
pub trait LoadTerminatedHandler {
    fn load_terminated(&self, error: CodeDownloadError);
}

impl<F> LoadTerminatedHandler for F
where
    F: Fn(CodeDownloadError),
{
    fn load_terminated(&self, error: CodeDownloadError) {
        self(error)
    }
}

pub trait LoadingStrategy {
    /// Starts one attempt at loading `fragment`. Never blocks and never fails
    /// synchronously; `handler` hears about termination on a later turn.
    fn start_loading_fragment(
        &mut self,
        env: &mut Environment,
        fragment: FragmentId,
        handler: Rc<dyn LoadTerminatedHandler>,
    );
}

/// Loads each fragment by installing a resource that fetches its `.cache.js`
/// artifact under the module base.
#[derive(Debug)]
pub struct ScriptTagStrategy {
    location: ModuleLocation,
    directory: String,
    serials: SerialRegistry,
}

impl ScriptTagStrategy {
    pub fn new(location: ModuleLocation, serials: SerialRegistry) -> Self {
        Self {
            location,
            directory: DEFAULT_DEFERRED_DIRECTORY.to_string(),
            serials,
        }
    }

    /// Overrides the artifact directory (default `deferredjs/`).
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn location(&self) -> &ModuleLocation {
        &self.location
    }

    pub fn serials(&self) -> &SerialRegistry {
        &self.serials
    }

    /// URL for the next attempt at `fragment`. Not stable: every call consumes
    /// a serial so repeated attempts never share a URL.
    fn next_url(&mut self, fragment: FragmentId) -> String {
        let serial = self.serials.next_serial(fragment);
        build_url(
            self.location.base_url(),
            self.location.build_id(),
            &self.directory,
            fragment,
            serial,
        )
    }
}

impl LoadingStrategy for ScriptTagStrategy {
    fn start_loading_fragment(
        &mut self,
        env: &mut Environment,
        fragment: FragmentId,
        handler: Rc<dyn LoadTerminatedHandler>,
    ) {
        let url = self.next_url(fragment);
        let handle = env.resources_mut().create_resource(&url);
        let on_terminated = guard::guard(handle, fragment, handler);
        guard::set_on_terminated(env.resources_mut(), handle, on_terminated);
        env.success_mut().track(fragment, handle);
        env.resources_mut().install(handle);
        tracing::debug!(%fragment, %handle, %url, "fragment load installed");
    }
}
