//! `fragload fetch` – load fragments over HTTP, retrying as the caller.
//!
//! The core makes exactly one attempt per `start_loading_fragment`. Retrying
//! is this command's decision: a terminated fragment is started again until
//! it has used `attempts` tries, and every retry gets the next serial.

use anyhow::Result;
use fragload_core::config::FragloadConfig;
use fragload_core::sink::{CodeSink, DirectorySink};
use fragload_core::transport::{CurlMultiTransport, FetchOptions, Transport};
use fragload_core::{
    CodeDownloadError, Environment, EventLoop, FragmentId, LoadingStrategy, ScriptTagStrategy,
    SerialRegistry,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::cli::ModuleArgs;

const POLL_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct FetchRequest {
    pub fragments: Vec<FragmentId>,
    pub module: ModuleArgs,
    pub out: PathBuf,
    pub attempts: u32,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadEvent {
    Loaded(FragmentId),
    Terminated(FragmentId),
}

/// Per-fragment outcome of [`load_fragments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Progress {
    pub attempts: u32,
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
struct FragmentReport {
    fragment: FragmentId,
    attempts: u32,
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

/// Starts one attempt for `fragment`; both outcomes land in `events`.
fn start(
    env: &mut Environment,
    strategy: &mut ScriptTagStrategy,
    events: &Rc<RefCell<Vec<LoadEvent>>>,
    fragment: FragmentId,
) {
    let on_loaded = Rc::clone(events);
    env.on_success(
        fragment,
        Box::new(move |f: FragmentId| on_loaded.borrow_mut().push(LoadEvent::Loaded(f))),
    );
    let on_terminated = Rc::clone(events);
    strategy.start_loading_fragment(
        env,
        fragment,
        Rc::new(move |e: CodeDownloadError| {
            tracing::debug!(%fragment, "attempt ended: {}", e);
            on_terminated
                .borrow_mut()
                .push(LoadEvent::Terminated(fragment));
        }),
    );
}

/// Loads every distinct fragment in `fragments`, starting a fresh attempt
/// after each termination until `max_attempts` tries are used. Returns once
/// nothing is pending or in flight.
pub(crate) fn load_fragments<T: Transport, S: CodeSink>(
    event_loop: &mut EventLoop<T, S>,
    strategy: &mut ScriptTagStrategy,
    fragments: &[FragmentId],
    max_attempts: u32,
) -> Result<BTreeMap<FragmentId, Progress>> {
    let max_attempts = max_attempts.max(1);
    let mut env = Environment::new();
    let events: Rc<RefCell<Vec<LoadEvent>>> = Rc::default();

    let mut progress: BTreeMap<FragmentId, Progress> = BTreeMap::new();
    for &fragment in fragments {
        if progress.contains_key(&fragment) {
            continue;
        }
        progress.insert(
            fragment,
            Progress {
                attempts: 1,
                loaded: false,
            },
        );
        start(&mut env, strategy, &events, fragment);
    }

    loop {
        event_loop.turn(&mut env, POLL_WAIT)?;
        let batch: Vec<LoadEvent> = events.borrow_mut().drain(..).collect();
        for event in batch {
            match event {
                LoadEvent::Loaded(fragment) => {
                    if let Some(entry) = progress.get_mut(&fragment) {
                        entry.loaded = true;
                    }
                    tracing::info!(%fragment, "fragment loaded");
                }
                LoadEvent::Terminated(fragment) => {
                    let Some(entry) = progress.get_mut(&fragment) else {
                        continue;
                    };
                    if entry.loaded {
                        continue;
                    }
                    if entry.attempts < max_attempts {
                        entry.attempts += 1;
                        tracing::info!(%fragment, attempt = entry.attempts, "retrying fragment");
                        start(&mut env, strategy, &events, fragment);
                    } else {
                        tracing::warn!(%fragment, attempts = entry.attempts, "fragment failed to load");
                    }
                }
            }
        }
        if event_loop.is_idle(&env) && events.borrow().is_empty() {
            break;
        }
    }
    Ok(progress)
}

pub fn run_fetch(cfg: &FragloadConfig, req: FetchRequest) -> Result<()> {
    let location = cfg.module_location(
        req.module.base_url.as_deref(),
        req.module.build_id.as_deref(),
    )?;
    let directory = req
        .module
        .directory
        .clone()
        .unwrap_or_else(|| cfg.directory.clone());

    let mut strategy =
        ScriptTagStrategy::new(location, SerialRegistry::new()).with_directory(directory);
    let transport = CurlMultiTransport::new(FetchOptions::from(&cfg.fetch_or_default()));
    let sink = DirectorySink::new(&req.out)?;
    tracing::debug!(
        base = strategy.location().base_url(),
        build = strategy.location().build_id(),
        out = %sink.out_dir().display(),
        "fetching fragments"
    );
    let mut event_loop = EventLoop::new(transport, sink, cfg.signal_style);

    let progress = load_fragments(&mut event_loop, &mut strategy, &req.fragments, req.attempts)?;

    let reports: Vec<FragmentReport> = progress
        .iter()
        .map(|(&fragment, p)| {
            let stored = p
                .loaded
                .then(|| event_loop.sink().delivered_for(fragment))
                .flatten();
            FragmentReport {
                fragment,
                attempts: p.attempts,
                loaded: p.loaded,
                path: stored.map(|d| d.path.clone()),
                sha256: stored.map(|d| d.sha256.clone()),
            }
        })
        .collect();

    if req.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{:<10} {:<9} {:<8} {}", "FRAGMENT", "ATTEMPTS", "STATE", "PATH");
        for r in &reports {
            println!(
                "{:<10} {:<9} {:<8} {}",
                r.fragment.to_string(),
                r.attempts,
                if r.loaded { "loaded" } else { "failed" },
                r.path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }

    let failed = reports.iter().filter(|r| !r.loaded).count();
    if failed > 0 {
        anyhow::bail!("{} of {} fragment(s) failed to load", failed, reports.len());
    }
    Ok(())
}
