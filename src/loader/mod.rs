//! On-demand loading of the external editing toolkit.
//!
//! A [`ToolkitLoader`] fetches the manifest's scripts one after another, each
//! only once the previous one completed, and fans the outcome out to every
//! caller that asked while the load was in flight. Share one `Rc<ToolkitLoader>`
//! between popups to load the toolkit once per process.

mod fetch;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

pub use fetch::{FetchCallback, FetchError, FetchResult, FsScriptFetcher, ScriptFetcher};

pub const DEFAULT_BASE_PATH: &str = "libs";
pub const DEFAULT_SCRIPTS: [&str; 2] = ["fabric.js", "darkroom.js"];

#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    #[error("failed to load toolkit script {path}: {source}")]
    ScriptFailed {
        path: String,
        #[source]
        source: Arc<FetchError>,
    },
}

pub type LoaderResult<T> = std::result::Result<T, LoaderError>;

pub type ReadyCallback = Box<dyn FnOnce(LoaderResult<()>)>;

/// Ordered scripts that make up the toolkit. Later scripts depend on earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptManifest {
    base_path: String,
    scripts: Vec<String>,
}

impl ScriptManifest {
    pub fn new(base_path: impl Into<String>, scripts: Vec<String>) -> Self {
        Self {
            base_path: base_path.into(),
            scripts,
        }
    }

    pub fn paths(&self) -> Vec<String> {
        let base = self.base_path.trim_end_matches('/');
        self.scripts
            .iter()
            .map(|script| {
                if base.is_empty() {
                    script.clone()
                } else {
                    format!("{base}/{script}")
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl Default for ScriptManifest {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_PATH,
            DEFAULT_SCRIPTS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

enum LoadPhase {
    NotLoaded,
    Loading { next: usize },
    Failed { next: usize, error: LoaderError },
    Loaded,
}

struct LoaderInner {
    phase: LoadPhase,
    waiters: Vec<ReadyCallback>,
}

pub struct ToolkitLoader {
    fetcher: Rc<dyn ScriptFetcher>,
    paths: Vec<String>,
    inner: RefCell<LoaderInner>,
}

impl ToolkitLoader {
    pub fn new(fetcher: Rc<dyn ScriptFetcher>, manifest: &ScriptManifest) -> Rc<Self> {
        Rc::new(Self {
            fetcher,
            paths: manifest.paths(),
            inner: RefCell::new(LoaderInner {
                phase: LoadPhase::NotLoaded,
                waiters: Vec::new(),
            }),
        })
    }

    pub fn status(&self) -> LoadStatus {
        match self.inner.borrow().phase {
            LoadPhase::NotLoaded => LoadStatus::NotLoaded,
            LoadPhase::Loading { .. } => LoadStatus::Loading,
            LoadPhase::Failed { .. } => LoadStatus::Failed,
            LoadPhase::Loaded => LoadStatus::Loaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == LoadStatus::Loaded
    }

    /// Invokes `on_ready` once the toolkit is available.
    ///
    /// Runs `on_ready` before returning when already loaded (or already failed),
    /// otherwise queues it behind the single in-flight load.
    pub fn ensure_loaded(self: &Rc<Self>, on_ready: impl FnOnce(LoaderResult<()>) + 'static) {
        if let Some(error) = self.failure() {
            on_ready(Err(error));
            return;
        }
        if self.is_loaded() {
            on_ready(Ok(()));
            return;
        }

        let start = {
            let mut inner = self.inner.borrow_mut();
            inner.waiters.push(Box::new(on_ready));
            if matches!(inner.phase, LoadPhase::NotLoaded) {
                inner.phase = LoadPhase::Loading { next: 0 };
                true
            } else {
                tracing::debug!(waiters = inner.waiters.len(), "toolkit load already in flight");
                false
            }
        };

        if start {
            tracing::info!(scripts = self.paths.len(), "loading editing toolkit");
            self.fetch_from(0);
        }
    }

    fn failure(&self) -> Option<LoaderError> {
        match &self.inner.borrow().phase {
            LoadPhase::Failed { error, .. } => Some(error.clone()),
            _ => None,
        }
    }

    /// Restarts a failed load from the script that failed. Returns whether a fetch started.
    pub fn retry(self: &Rc<Self>) -> bool {
        let next = {
            let mut inner = self.inner.borrow_mut();
            let LoadPhase::Failed { next, .. } = inner.phase else {
                return false;
            };
            inner.phase = LoadPhase::Loading { next };
            next
        };
        tracing::info!(script = next, "retrying editing toolkit load");
        self.fetch_from(next);
        true
    }

    fn fetch_from(self: &Rc<Self>, index: usize) {
        let Some(path) = self.paths.get(index).cloned() else {
            self.finish(Ok(()));
            return;
        };

        tracing::debug!(%path, index, "fetching toolkit script");
        let loader = Rc::clone(self);
        let requested = path.clone();
        self.fetcher.fetch(
            &path,
            Box::new(move |result| loader.on_script_done(index, requested, result)),
        );
    }

    fn on_script_done(self: &Rc<Self>, index: usize, path: String, result: FetchResult<()>) {
        match result {
            Ok(()) => {
                self.inner.borrow_mut().phase = LoadPhase::Loading { next: index + 1 };
                self.fetch_from(index + 1);
            }
            Err(err) => {
                tracing::warn!(%path, error = %err, "toolkit script failed to load");
                let error = LoaderError::ScriptFailed {
                    path,
                    source: Arc::new(err),
                };
                self.inner.borrow_mut().phase = LoadPhase::Failed {
                    next: index,
                    error: error.clone(),
                };
                self.finish(Err(error));
            }
        }
    }

    fn finish(&self, result: LoaderResult<()>) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if result.is_ok() {
                inner.phase = LoadPhase::Loaded;
                tracing::info!("editing toolkit loaded");
            }
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            waiter(result.clone());
        }
    }
}

impl std::fmt::Debug for ToolkitLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitLoader")
            .field("paths", &self.paths)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Holds fetch completions until the test resolves them.
    #[derive(Default)]
    struct ManualFetcher {
        requests: RefCell<Vec<String>>,
        pending: RefCell<Vec<(String, FetchCallback)>>,
    }

    impl ManualFetcher {
        fn resolve_next(&self, result: FetchResult<()>) -> String {
            let (path, done) = self.pending.borrow_mut().remove(0);
            done(result);
            path
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl ScriptFetcher for ManualFetcher {
        fn fetch(&self, path: &str, done: FetchCallback) {
            self.requests.borrow_mut().push(path.to_string());
            self.pending.borrow_mut().push((path.to_string(), done));
        }
    }

    fn not_found(path: &str) -> FetchError {
        FetchError::NotFound { path: path.into() }
    }

    #[test]
    fn manifest_paths_join_base_path() {
        assert_eq!(
            ScriptManifest::default().paths(),
            vec!["libs/fabric.js".to_string(), "libs/darkroom.js".to_string()]
        );
        assert_eq!(
            ScriptManifest::new("", vec!["a.js".into()]).paths(),
            vec!["a.js".to_string()]
        );
        assert_eq!(
            ScriptManifest::new("cdn/", vec!["a.js".into()]).paths(),
            vec!["cdn/a.js".to_string()]
        );
    }

    #[test]
    fn scripts_are_fetched_sequentially() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::default());

        loader.ensure_loaded(|_| {});
        assert_eq!(fetcher.requests(), vec!["libs/fabric.js"]);

        fetcher.resolve_next(Ok(()));
        assert_eq!(fetcher.requests(), vec!["libs/fabric.js", "libs/darkroom.js"]);
        assert_eq!(loader.status(), LoadStatus::Loading);

        fetcher.resolve_next(Ok(()));
        assert!(loader.is_loaded());
    }

    #[test]
    fn concurrent_calls_fetch_once_and_fire_every_callback() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::default());
        let fired = Rc::new(Cell::new(0));

        for _ in 0..5 {
            let fired = fired.clone();
            loader.ensure_loaded(move |result| {
                assert!(result.is_ok());
                fired.set(fired.get() + 1);
            });
        }
        assert_eq!(fired.get(), 0);

        fetcher.resolve_next(Ok(()));
        fetcher.resolve_next(Ok(()));

        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(fired.get(), 5);
    }

    #[test]
    fn loaded_toolkit_runs_callback_before_returning() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::default());
        loader.ensure_loaded(|_| {});
        fetcher.resolve_next(Ok(()));
        fetcher.resolve_next(Ok(()));

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        loader.ensure_loaded(move |result| flag.set(result.is_ok()));

        assert!(fired.get());
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn failure_stops_the_chain_and_reports_to_waiters() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::default());
        let outcome = Rc::new(RefCell::new(None));

        let sink = outcome.clone();
        loader.ensure_loaded(move |result| *sink.borrow_mut() = Some(result));
        fetcher.resolve_next(Err(not_found("libs/fabric.js")));

        assert_eq!(loader.status(), LoadStatus::Failed);
        assert_eq!(fetcher.requests(), vec!["libs/fabric.js"]);
        let outcome = outcome.borrow_mut().take().expect("callback should fire");
        let err = outcome.expect_err("load should fail");
        assert!(matches!(err, LoaderError::ScriptFailed { ref path, .. } if path == "libs/fabric.js"));
    }

    #[test]
    fn retry_resumes_from_the_failed_script() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::default());
        loader.ensure_loaded(|_| {});
        fetcher.resolve_next(Ok(()));
        fetcher.resolve_next(Err(not_found("libs/darkroom.js")));
        assert!(!loader.is_loaded());

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        assert!(loader.retry());
        loader.ensure_loaded(move |result| flag.set(result.is_ok()));
        assert_eq!(
            fetcher.requests(),
            vec!["libs/fabric.js", "libs/darkroom.js", "libs/darkroom.js"]
        );

        fetcher.resolve_next(Ok(()));
        assert!(loader.is_loaded());
        assert!(fired.get());
        assert!(!loader.retry());
    }

    #[test]
    fn empty_manifest_loads_immediately() {
        let fetcher = Rc::new(ManualFetcher::default());
        let loader = ToolkitLoader::new(fetcher.clone(), &ScriptManifest::new("libs", Vec::new()));
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        loader.ensure_loaded(move |result| flag.set(result.is_ok()));

        assert!(fired.get());
        assert!(fetcher.requests().is_empty());
    }
}
