//! Tests for the fetch retry loop.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use fragload_core::config::{FetchConfig, FragloadConfig};
use fragload_core::host::{ResourceHandle, SignalStyle};
use fragload_core::sink::trailer_sink;
use fragload_core::transport::{Completion, FetchError, FetchOutcome, Transport};
use fragload_core::{EventLoop, FragmentId, ModuleLocation, ScriptTagStrategy, SerialRegistry};

use crate::cli::commands::fetch::{load_fragments, Progress};
use crate::cli::commands::{run_fetch, FetchRequest};
use crate::cli::ModuleArgs;

/// Answers each URL from a fixed table; unknown URLs fail with 404.
#[derive(Default)]
struct TableTransport {
    bodies: HashMap<String, Vec<u8>>,
    queued: Vec<(ResourceHandle, String)>,
    requested: Vec<String>,
}

impl TableTransport {
    fn with(bodies: &[(&str, &str)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(u, b)| (u.to_string(), b.as_bytes().to_vec()))
                .collect(),
            ..Self::default()
        }
    }
}

impl Transport for TableTransport {
    fn begin(&mut self, handle: ResourceHandle, url: &str) -> Result<(), FetchError> {
        self.requested.push(url.to_string());
        self.queued.push((handle, url.to_string()));
        Ok(())
    }

    fn poll(&mut self, _wait: Duration) -> anyhow::Result<Vec<Completion>> {
        Ok(self
            .queued
            .drain(..)
            .map(|(handle, url)| {
                let outcome = match self.bodies.get(&url) {
                    Some(body) => FetchOutcome::Delivered {
                        status: 200,
                        body: body.clone(),
                    },
                    None => FetchOutcome::Failed(FetchError::Http(404)),
                };
                Completion { handle, url, outcome }
            })
            .collect())
    }

    fn in_flight(&self) -> usize {
        self.queued.len()
    }
}

fn strategy() -> ScriptTagStrategy {
    let location = ModuleLocation::new("https://x/", "abc123").unwrap();
    ScriptTagStrategy::new(location, SerialRegistry::new())
}

fn run(
    transport: TableTransport,
    fragments: &[u32],
    attempts: u32,
) -> (BTreeMap<FragmentId, Progress>, Vec<String>) {
    let mut el = EventLoop::new(transport, trailer_sink, SignalStyle::Distinct);
    let mut s = strategy();
    let ids: Vec<FragmentId> = fragments.iter().copied().map(FragmentId).collect();
    let progress = load_fragments(&mut el, &mut s, &ids, attempts).unwrap();
    (progress, el.transport().requested.clone())
}

#[test]
fn failing_fragment_stops_after_attempts() {
    let (progress, requested) = run(TableTransport::default(), &[4], 3);
    assert_eq!(
        progress[&FragmentId(4)],
        Progress {
            attempts: 3,
            loaded: false
        }
    );
    assert_eq!(
        requested,
        vec![
            "https://x/deferredjs/abc123/4.cache.js",
            "https://x/deferredjs/abc123/4.cache.js?serial=1",
            "https://x/deferredjs/abc123/4.cache.js?serial=2",
        ]
    );
}

#[test]
fn duplicate_fragments_start_one_load() {
    let transport = TableTransport::with(&[(
        "https://x/deferredjs/abc123/5.cache.js",
        "f();\nrunAsyncCallback5();\n",
    )]);
    let (progress, requested) = run(transport, &[5, 5, 5], 2);
    assert_eq!(progress.len(), 1);
    assert_eq!(
        progress[&FragmentId(5)],
        Progress {
            attempts: 1,
            loaded: true
        }
    );
    assert_eq!(requested, vec!["https://x/deferredjs/abc123/5.cache.js"]);
}

#[test]
fn retry_requests_next_serial_and_can_succeed() {
    // Only the cache-busted URL has the fragment; the first attempt 404s.
    let transport = TableTransport::with(&[(
        "https://x/deferredjs/abc123/6.cache.js?serial=1",
        "runAsyncCallback6();",
    )]);
    let (progress, requested) = run(transport, &[6], 3);
    assert_eq!(
        progress[&FragmentId(6)],
        Progress {
            attempts: 2,
            loaded: true
        }
    );
    assert_eq!(
        requested,
        vec![
            "https://x/deferredjs/abc123/6.cache.js",
            "https://x/deferredjs/abc123/6.cache.js?serial=1",
        ]
    );
}

#[test]
fn zero_attempts_still_tries_once() {
    let (progress, requested) = run(TableTransport::default(), &[2], 0);
    assert_eq!(progress[&FragmentId(2)].attempts, 1);
    assert_eq!(requested.len(), 1);
}

#[test]
fn run_fetch_errors_when_a_fragment_never_loads() {
    let out = tempfile::tempdir().unwrap();
    let cfg = FragloadConfig {
        fetch: Some(FetchConfig {
            connect_timeout_secs: 2,
            timeout_secs: 5,
            ..FetchConfig::default()
        }),
        ..FragloadConfig::default()
    };
    let req = FetchRequest {
        fragments: vec![FragmentId(1), FragmentId(1)],
        module: ModuleArgs {
            base_url: Some("http://127.0.0.1:1/".to_string()),
            build_id: Some("abc123".to_string()),
            directory: None,
        },
        out: out.path().to_path_buf(),
        attempts: 2,
        json: true,
    };
    let err = run_fetch(&cfg, req).unwrap_err();
    assert!(
        err.to_string().contains("1 of 1 fragment(s) failed"),
        "unexpected error: {err:#}"
    );
}
