pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod event_loop;
pub mod fragment;
pub mod guard;
pub mod host;
pub mod serial;
pub mod sink;
pub mod strategy;
pub mod transport;
pub mod url_model;

pub use error::{CodeDownloadError, Reason};
pub use event_loop::EventLoop;
pub use fragment::FragmentId;
pub use host::Environment;
pub use serial::SerialRegistry;
pub use strategy::{LoadTerminatedHandler, LoadingStrategy, ScriptTagStrategy};
pub use url_model::ModuleLocation;
