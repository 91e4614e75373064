//! Error taxonomy for the order workflow.
//!
//! Every failure an [`crate::Order`] operation can produce maps onto one of
//! five kinds:
//!
//! | kind               | cause                                              | retry?                          |
//! |--------------------|----------------------------------------------------|---------------------------------|
//! | `Validation`       | malformed constructor input                        | never                           |
//! | `Precondition`     | order is not in a state that allows the operation  | never (caller bug)              |
//! | `InvalidSelection` | chosen option is not from the live quote           | never                           |
//! | `Remote`           | provider reported a failure or sent garbage        | caller decides                  |
//! | `Transport`        | network / timeout                                  | reads only; never blind on submit |
//!
//! Nothing here retries on its own. A submission is not idempotent on the
//! provider side, so a retry after a transport failure may double-order.

use std::fmt;

use thiserror::Error;

use crate::transport::{RemoteError, TransportError, WireError};

/// Field-level validation failure for a value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The two external parties an order needs before it can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Destination,
    Customer,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Destination => write!(f, "destination"),
            Party::Customer => write!(f, "customer"),
        }
    }
}

/// An operation was invoked while the order was in an insufficient state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("a destination must be set before quoting shipping options")]
    NoDestination,
    #[error("the order must contain at least one product")]
    NoProducts,
    #[error("a {0} is required to submit an order")]
    MissingParty(Party),
    #[error("pick a shipping option before submitting the order")]
    NoShippingOptionSelected,
    #[error("this order has already been submitted")]
    AlreadySubmitted,
    #[error("this order has not yet been submitted")]
    NotYetSubmitted,
}

/// Why a shipping option could not be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no live shipping quote; quote shipping options before picking one")]
    NoLiveQuote,
    #[error("shipping option '{name}' did not come from the current quote")]
    NotFromLiveQuote { name: String },
}

/// Top-level error for every [`crate::Order`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<WireError> for OrderError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Remote(e) => OrderError::Remote(e),
            WireError::Transport(e) => OrderError::Transport(e),
        }
    }
}

impl OrderError {
    /// The precondition that failed, if this is a precondition error.
    pub fn precondition(&self) -> Option<&PreconditionError> {
        match self {
            OrderError::Precondition(p) => Some(p),
            _ => None,
        }
    }
}
