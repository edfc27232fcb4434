use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::scheduler::FrameScheduler;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("script not found: {path}")]
    NotFound { path: PathBuf },
    #[error("script is empty: {path}")]
    Empty { path: PathBuf },
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

pub type FetchCallback = Box<dyn FnOnce(FetchResult<()>)>;

/// Fetches one toolkit script. `done` fires exactly once, after `fetch` returns or during it.
pub trait ScriptFetcher {
    fn fetch(&self, path: &str, done: FetchCallback);
}

/// Resolves scripts under a root directory and reports completion on the next frame.
pub struct FsScriptFetcher {
    root: PathBuf,
    scheduler: Rc<dyn FrameScheduler>,
}

impl FsScriptFetcher {
    pub fn new(root: impl Into<PathBuf>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            root: root.into(),
            scheduler,
        }
    }

    fn read_script(&self, path: &str) -> FetchResult<()> {
        let full_path = self.root.join(path);
        match fs::metadata(&full_path) {
            Ok(metadata) if metadata.len() == 0 => {
                return Err(FetchError::Empty { path: full_path });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound { path: full_path });
            }
            Err(source) => {
                return Err(FetchError::Io {
                    path: full_path,
                    source,
                })
            }
        }
        fs::read(&full_path)
            .map(|_| ())
            .map_err(|source| FetchError::Io {
                path: full_path,
                source,
            })
    }
}

impl ScriptFetcher for FsScriptFetcher {
    fn fetch(&self, path: &str, done: FetchCallback) {
        let result = self.read_script(path);
        tracing::debug!(path, ok = result.is_ok(), "script fetch resolved");
        self.scheduler.request_frame(Box::new(move || done(result)));
    }
}
