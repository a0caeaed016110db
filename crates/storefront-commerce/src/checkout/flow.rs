//! Checkout attempt state machine.

use std::fmt;

use crate::error::CommerceError;
use crate::ids::CheckoutId;
use serde::{Deserialize, Serialize};

/// States of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    /// Checking cart and shipping details.
    Validating,
    /// Waiting on the gateway.
    Submitting,
    /// Shopper handed off to the hosted payment page.
    Redirected,
    Failed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Redirected => "redirected",
            CheckoutState::Failed => "failed",
        }
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Redirected | CheckoutState::Failed)
    }

    /// Check if `self -> to` is a legal move.
    pub fn can_transition_to(&self, to: CheckoutState) -> bool {
        matches!(
            (self, to),
            (CheckoutState::Idle, CheckoutState::Validating)
                | (CheckoutState::Validating, CheckoutState::Submitting)
                | (CheckoutState::Validating, CheckoutState::Failed)
                | (CheckoutState::Submitting, CheckoutState::Redirected)
                | (CheckoutState::Submitting, CheckoutState::Failed)
        )
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checkout attempt. A new submission always starts a new attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAttempt {
    pub id: CheckoutId,
    state: CheckoutState,
    history: Vec<CheckoutState>,
}

impl CheckoutAttempt {
    /// Start a fresh attempt in `Idle`.
    pub fn new() -> Self {
        Self::with_id(CheckoutId::generate())
    }

    pub fn with_id(id: CheckoutId) -> Self {
        Self {
            id,
            state: CheckoutState::Idle,
            history: vec![CheckoutState::Idle],
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Every state visited, starting with `Idle`.
    pub fn history(&self) -> &[CheckoutState] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Move to `to`.
    ///
    /// # Errors
    ///
    /// [`CommerceError::InvalidCheckoutTransition`] if the move isn't allowed
    /// from the current state. The attempt is left where it was.
    pub fn advance(&mut self, to: CheckoutState) -> Result<(), CommerceError> {
        if !self.state.can_transition_to(to) {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(checkout_id = %self.id, from = %self.state, state = %to, "checkout transition");
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Move to `Failed` from wherever failure is allowed.
    pub(crate) fn fail(&mut self) {
        if self.state.can_transition_to(CheckoutState::Failed) {
            self.state = CheckoutState::Failed;
            self.history.push(CheckoutState::Failed);
            tracing::debug!(checkout_id = %self.id, state = %self.state, "checkout transition");
        }
    }
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut attempt = CheckoutAttempt::new();
        assert_eq!(attempt.state(), CheckoutState::Idle);

        attempt.advance(CheckoutState::Validating).unwrap();
        attempt.advance(CheckoutState::Submitting).unwrap();
        attempt.advance(CheckoutState::Redirected).unwrap();

        assert!(attempt.is_terminal());
        assert_eq!(
            attempt.history(),
            &[
                CheckoutState::Idle,
                CheckoutState::Validating,
                CheckoutState::Submitting,
                CheckoutState::Redirected,
            ]
        );
    }

    #[test]
    fn test_cannot_skip_validation() {
        let mut attempt = CheckoutAttempt::new();
        let err = attempt.advance(CheckoutState::Submitting).unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InvalidCheckoutTransition {
                from: CheckoutState::Idle,
                to: CheckoutState::Submitting,
            }
        ));
        assert_eq!(attempt.state(), CheckoutState::Idle);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut attempt = CheckoutAttempt::new();
        attempt.advance(CheckoutState::Validating).unwrap();
        attempt.fail();
        assert_eq!(attempt.state(), CheckoutState::Failed);

        assert!(attempt.advance(CheckoutState::Submitting).is_err());
        assert!(attempt.advance(CheckoutState::Validating).is_err());

        // Failing twice is a no-op.
        attempt.fail();
        assert_eq!(attempt.history().len(), 3);
    }

    #[test]
    fn test_idle_cannot_fail_directly() {
        let mut attempt = CheckoutAttempt::new();
        attempt.fail();
        assert_eq!(attempt.state(), CheckoutState::Idle);
    }
}
