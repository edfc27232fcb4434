use super::event::PopupTrigger;
use super::model::PopupState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid state transition: from {from:?} using trigger {trigger:?}")]
    InvalidStateTransition {
        from: PopupState,
        trigger: PopupTrigger,
    },
}
