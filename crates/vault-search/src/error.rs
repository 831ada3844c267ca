#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Query parse error: {message} near byte {position}")]
    Parse { message: String, position: usize },

    #[error("Query is not a basic filter: {0}")]
    NotRepresentable(String),

    #[error("Invalid search options: {0}")]
    InvalidOptions(String),
}

impl QueryError {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Byte offset of a parse failure, for pointing at the offending input.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
