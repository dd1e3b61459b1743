//! Where delivered fragment code goes.
//!
//! The loader never runs fetched code. A sink receives the bytes and reports
//! whether they end with the fragment's success announcement, which is what
//! running them would have done last.

mod directory;

pub use directory::{DeliveredFragment, DirectorySink};

use crate::fragment::FragmentId;
use crate::host::CALLBACK_PREFIX;

/// What happened when a body was handed to a sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Fragment whose success callback the body invoked, if any.
    pub announced: Option<FragmentId>,
}

impl Evaluation {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn announced(fragment: FragmentId) -> Self {
        Self {
            announced: Some(fragment),
        }
    }
}

pub trait CodeSink {
    fn evaluate(&mut self, url: &str, body: &[u8]) -> Evaluation;
}

impl<F> CodeSink for F
where
    F: FnMut(&str, &[u8]) -> Evaluation,
{
    fn evaluate(&mut self, url: &str, body: &[u8]) -> Evaluation {
        self(url, body)
    }
}

/// Finds the success announcement in the last non-blank line of `body`,
/// e.g. `__module.runAsyncCallback7();` → fragment 7.
pub fn announced_fragment(body: &[u8]) -> Option<FragmentId> {
    let text = String::from_utf8_lossy(body);
    let last = text.lines().rev().find(|l| !l.trim().is_empty())?;
    let (_, rest) = last.rsplit_once(CALLBACK_PREFIX)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Sink that only looks for the announcement.
pub fn trailer_sink(_url: &str, body: &[u8]) -> Evaluation {
    announced_fragment(body).map_or_else(Evaluation::silent, Evaluation::announced)
}
