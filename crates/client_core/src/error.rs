use shared::domain::PaymentMethod;
use thiserror::Error;

use crate::{flow::FlowState, form::FieldError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Trigger or page data the controller needs is absent; logged, never shown.
    #[error("missing required element: {0}")]
    MissingElement(String),
    #[error("form is invalid: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Transport(String),
    /// Business error declared by the backend, verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("the server did not return a payment link")]
    MissingPaymentUrl,
    #[error("payment method '{0}' is not offered on this page")]
    MethodDisabled(PaymentMethod),
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: FlowState,
    },
}

impl FlowError {
    /// Whether the presentation layer should show this error to the contributor.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            FlowError::Transport(_) | FlowError::Rejected(_) | FlowError::MissingPaymentUrl
        )
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
