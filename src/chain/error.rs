use thiserror::Error;

/// Misuse of a chain. These are programming errors in the caller and abort
/// whatever operation triggered them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Chain {0} cannot be joined to itself")]
    SelfJoin(String),

    #[error("Chain {0} has no following chain to promote into")]
    NoFollower(String),

    #[error("Chain {0} is empty")]
    EmptyChain(String),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Chain {0} already exists")]
    DuplicateChain(String),

    #[error("Chain {0} still has elements")]
    ChainNotEmpty(String),

    #[error("Element {0} is not part of any chain")]
    UnknownItem(String),

    #[error("Element {0} is already part of a chain")]
    DuplicateItem(String),
}

pub type ChainResult<T> = Result<T, ChainError>;
