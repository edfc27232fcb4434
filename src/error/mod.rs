use crate::state::StateError;
use thiserror::Error;

pub type PopupResult<T> = std::result::Result<T, PopupError>;

/// Errors returned by popup operations.
///
/// Loader, surface and session failures never abort an operation: they are
/// reported through `loadFailed` or logged, so only state errors surface here.
#[derive(Debug, Error)]
pub enum PopupError {
    #[error(transparent)]
    State(#[from] StateError),
}
