use thiserror::Error;

use crate::lifecycle::NodeState;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("expected root element <{expected}>, found <{found}>")]
    RootMismatch { expected: String, found: String },

    #[error("cannot {action} a node in state {state}")]
    InvalidTransition {
        state: NodeState,
        action: &'static str,
    },

    #[error("parse failed with {count} field error(s); first: {first}")]
    ParseFailed { count: usize, first: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
