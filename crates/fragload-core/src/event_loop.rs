//! Single-threaded pump that turns transport completions into host signals.

use anyhow::Result;
use std::time::Duration;

use crate::host::{Environment, ReadyState, ResourceHandle, Signal, SignalStyle};
use crate::sink::CodeSink;
use crate::transport::{FetchOutcome, Transport};

pub struct EventLoop<T, S> {
    transport: T,
    sink: S,
    style: SignalStyle,
}

impl<T: Transport, S: CodeSink> EventLoop<T, S> {
    pub fn new(transport: T, sink: S, style: SignalStyle) -> Self {
        Self {
            transport,
            sink,
            style,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// True when nothing is waiting to start and nothing is in flight.
    pub fn is_idle(&self, env: &Environment) -> bool {
        !env.resources().has_pending() && self.transport.in_flight() == 0
    }

    /// One turn: start newly installed resources, then poll the transport
    /// once and deliver a signal for each finished fetch. Returns how many
    /// resources received a signal.
    pub fn turn(&mut self, env: &mut Environment, wait: Duration) -> Result<usize> {
        let mut signalled = 0;
        for (handle, url) in env.resources_mut().take_pending() {
            if let Err(e) = self.transport.begin(handle, &url) {
                tracing::warn!(%handle, url = %url, "could not start fetch: {}", e);
                self.fail(env, handle);
                signalled += 1;
            }
        }
        if self.transport.in_flight() == 0 {
            return Ok(signalled);
        }

        for completion in self.transport.poll(wait)? {
            let handle = completion.handle;
            match completion.outcome {
                FetchOutcome::Delivered { status, body } => {
                    tracing::debug!(%handle, url = %completion.url, status, bytes = body.len(), "fragment delivered");
                    let evaluation = self.sink.evaluate(&completion.url, &body);
                    if let Some(fragment) = evaluation.announced {
                        env.signal_success(fragment);
                    }
                    self.succeed(env, handle);
                }
                FetchOutcome::Failed(e) => {
                    tracing::warn!(%handle, url = %completion.url, "fragment fetch failed: {}", e);
                    self.fail(env, handle);
                }
            }
            signalled += 1;
        }
        Ok(signalled)
    }

    /// Turns until idle. Loads started from inside callbacks are picked up
    /// on the following turn.
    pub fn run_until_idle(&mut self, env: &mut Environment, wait: Duration) -> Result<()> {
        while !self.is_idle(env) {
            self.turn(env, wait)?;
        }
        Ok(())
    }

    fn succeed(&self, env: &mut Environment, handle: ResourceHandle) {
        match self.style {
            SignalStyle::Distinct => env.deliver(handle, Signal::Load),
            SignalStyle::ReadyState => {
                env.deliver(handle, Signal::ReadyStateChange(ReadyState::Loading));
                env.deliver(handle, Signal::ReadyStateChange(ReadyState::Loaded));
            }
        }
    }

    fn fail(&self, env: &mut Environment, handle: ResourceHandle) {
        match self.style {
            SignalStyle::Distinct => env.deliver(handle, Signal::Error),
            SignalStyle::ReadyState => {
                env.deliver(handle, Signal::ReadyStateChange(ReadyState::Loaded))
            }
        }
    }
}
