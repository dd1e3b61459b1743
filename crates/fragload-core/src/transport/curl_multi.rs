//! Curl multi transport: every in-flight fragment is an Easy2 handle on one
//! multi handle, advanced by `poll` on the caller's thread.

use anyhow::Context;
use std::time::Duration;

use curl::easy::Easy2;
use curl::multi::{Easy2Handle, Multi};

use super::handler::FragmentBody;
use super::{Completion, FetchError, FetchOutcome, Transport};
use crate::config::FetchConfig;
use crate::host::ResourceHandle;

/// Per-transfer curl settings.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_redirections: u32,
    pub max_body_bytes: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

struct Active {
    easy: Easy2Handle<FragmentBody>,
    handle: ResourceHandle,
    url: String,
}

pub struct CurlMultiTransport {
    multi: Multi,
    active: Vec<Active>,
    options: FetchOptions,
}

impl CurlMultiTransport {
    pub fn new(options: FetchOptions) -> Self {
        Self {
            multi: Multi::new(),
            active: Vec::new(),
            options,
        }
    }

    fn configure(&self, url: &str) -> Result<Easy2<FragmentBody>, curl::Error> {
        let mut easy = Easy2::new(FragmentBody::new(self.options.max_body_bytes));
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.options.max_redirections)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(self.options.timeout)?;
        Ok(easy)
    }

    /// Removes a finished transfer from the multi handle and classifies it.
    fn finish(&mut self, index: usize, result: Result<(), curl::Error>) -> anyhow::Result<Completion> {
        let Active { easy, handle, url } = self.active.remove(index);
        let mut easy = self.multi.remove2(easy).context("curl multi remove")?;
        let outcome = match result {
            Err(e) => FetchOutcome::Failed(FetchError::Curl(e)),
            Ok(()) => {
                let status = easy.response_code().unwrap_or(0);
                if (200..300).contains(&status) {
                    FetchOutcome::Delivered {
                        status,
                        body: easy.get_mut().take_body(),
                    }
                } else {
                    FetchOutcome::Failed(FetchError::Http(status))
                }
            }
        };
        Ok(Completion { handle, url, outcome })
    }
}

impl Transport for CurlMultiTransport {
    fn begin(&mut self, handle: ResourceHandle, url: &str) -> Result<(), FetchError> {
        let easy = self.configure(url)?;
        let easy = self.multi.add2(easy)?;
        tracing::debug!(%handle, url, "fetch started");
        self.active.push(Active {
            easy,
            handle,
            url: url.to_string(),
        });
        Ok(())
    }

    fn poll(&mut self, wait: Duration) -> anyhow::Result<Vec<Completion>> {
        if self.active.is_empty() {
            return Ok(Vec::new());
        }
        let running = self.multi.perform().context("curl multi perform")?;

        let mut finished: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        let active = &self.active;
        self.multi.messages(|msg| {
            for (i, a) in active.iter().enumerate() {
                if let Some(result) = msg.result_for2(&a.easy) {
                    finished.push((i, result));
                    break;
                }
            }
        });
        // Highest index first so earlier removals don't shift later ones.
        finished.sort_by(|a, b| b.0.cmp(&a.0));

        let mut completions = Vec::with_capacity(finished.len());
        for (index, result) in finished {
            completions.push(self.finish(index, result)?);
        }
        completions.reverse();

        if completions.is_empty() && running > 0 {
            self.multi
                .wait(&mut [], wait)
                .context("curl multi wait")?;
        }
        Ok(completions)
    }

    fn in_flight(&self) -> usize {
        self.active.len()
    }
}
