//! Error taxonomy shared by the tree, the context stack and both ingestion backends.
use crate::backend::Backend;
use crate::data::Tag;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input text is not valid for the selected format.
    #[error("{backend} parse error: {message}")]
    Parse { backend: Backend, message: String },

    /// A foreign parse-tree node has no mapping onto `Data`.
    #[error("unsupported node: {0}")]
    UnsupportedType(String),

    #[error("{0} support not enabled in this build")]
    FeatureDisabled(Backend),

    #[error("context stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },

    #[error("context stack underflow")]
    StackUnderflow,

    /// `allocate` on a node that already left `None`.
    #[error("node already initialized as {0}")]
    AlreadyInitialized(Tag),

    #[error("cannot allocate storage for {0}")]
    InvalidAllocation(Tag),

    #[error("expected {expected} node, found {found}")]
    TagMismatch { expected: Tag, found: Tag },
}

impl Error {
    pub(crate) fn parse(backend: Backend, message: impl std::fmt::Display) -> Self {
        Error::Parse { backend, message: message.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
