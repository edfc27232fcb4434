use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::{PopupState, PopupTrigger, StateTransition};

const TRANSITION_HISTORY_LIMIT: usize = 64;

#[derive(Debug)]
pub struct StateMachine {
    state: PopupState,
    transition_history: VecDeque<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PopupState::default(),
            transition_history: VecDeque::new(),
        }
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn can_transition(&self, trigger: PopupTrigger) -> bool {
        self.next_state(trigger).is_some()
    }

    pub fn next_state(&self, trigger: PopupTrigger) -> Option<PopupState> {
        use PopupState::*;
        use PopupTrigger::*;
        match (self.state, trigger) {
            (_, BeginLoad) => Some(Loading),
            (Hidden | Loading, ResumeLoading) => Some(Loading),
            (Hidden | Ready, Reveal) => Some(Ready),
            (Loading, SurfaceReady) => Some(Ready),
            (_, Hide) => Some(Hidden),
            _ => None,
        }
    }

    pub fn transition(&mut self, trigger: PopupTrigger) -> StateResult<PopupState> {
        tracing::debug!(from = ?self.state, trigger = ?trigger, "request popup transition");
        let next = self.next_state(trigger).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, trigger = ?trigger, "invalid popup transition requested");
            StateError::InvalidStateTransition { from, trigger }
        })?;

        let record = StateTransition::new(Some(self.state), trigger, next);
        self.state = next;
        if self.transition_history.len() == TRANSITION_HISTORY_LIMIT {
            self.transition_history.pop_front();
        }
        self.transition_history.push_back(record);

        Ok(self.state)
    }

    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.transition_history.iter()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PopupState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_triggers() {
        let mut machine = StateMachine::new();
        assert!(machine.can_transition(PopupTrigger::BeginLoad));
        assert!(machine.can_transition(PopupTrigger::Reveal));
        assert!(!machine.can_transition(PopupTrigger::SurfaceReady));

        let _ = machine
            .transition(PopupTrigger::BeginLoad)
            .expect("hidden -> loading should transition");

        assert!(machine.can_transition(PopupTrigger::SurfaceReady));
        assert!(machine.can_transition(PopupTrigger::Hide));
        assert!(!machine.can_transition(PopupTrigger::Reveal));
    }

    #[test]
    fn transition_records_history_with_ordered_entries() {
        let mut machine = StateMachine::new();
        let _ = machine
            .transition(PopupTrigger::BeginLoad)
            .expect("begin load should work");
        let _ = machine
            .transition(PopupTrigger::SurfaceReady)
            .expect("surface ready should work");
        let _ = machine
            .transition(PopupTrigger::Hide)
            .expect("hide should work");

        assert_eq!(machine.state(), PopupState::Hidden);
        let history: Vec<_> = machine.history().copied().collect();
        assert_eq!(
            history,
            vec![
                StateTransition::new(
                    Some(PopupState::Hidden),
                    PopupTrigger::BeginLoad,
                    PopupState::Loading
                ),
                StateTransition::new(
                    Some(PopupState::Loading),
                    PopupTrigger::SurfaceReady,
                    PopupState::Ready
                ),
                StateTransition::new(
                    Some(PopupState::Ready),
                    PopupTrigger::Hide,
                    PopupState::Hidden
                ),
            ]
        );
    }

    #[test]
    fn hidden_during_load_resumes_loading_instead_of_revealing() {
        let mut machine = StateMachine::new();
        let _ = machine.transition(PopupTrigger::BeginLoad).expect("load");
        let _ = machine.transition(PopupTrigger::Hide).expect("hide");

        assert_eq!(
            machine.transition(PopupTrigger::ResumeLoading).expect("resume"),
            PopupState::Loading
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(PopupTrigger::SurfaceReady)
            .expect_err("hidden -> surface ready should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: PopupState::Hidden,
                trigger: PopupTrigger::SurfaceReady
            }
        ));
        assert_eq!(machine.state(), PopupState::Hidden);
        assert_eq!(machine.history().count(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let mut machine = StateMachine::new();
        for _ in 0..(TRANSITION_HISTORY_LIMIT + 10) {
            let _ = machine.transition(PopupTrigger::Hide).expect("hide");
        }
        assert_eq!(machine.history().count(), TRANSITION_HISTORY_LIMIT);
    }
}
