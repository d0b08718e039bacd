use derive_more::From;
use epd_lang::LangError;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum DetectReason {
    #[error("document or profile rules are empty")]
    EmptyInput,
    #[error("{0}")]
    InvalidRuleSet(String),
    #[error("document is neither an EPCIS document nor a bare event")]
    UnrecognizedDocumentShape,
    #[error("{0}")]
    Expression(LangError),
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for DetectReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::EmptyInput => 3001,
            Self::InvalidRuleSet(_) => 3002,
            Self::UnrecognizedDocumentShape => 3003,
            Self::Expression(_) => 3004,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type DetectError = StructError<DetectReason>;
pub type DetectResult<T> = Result<T, DetectError>;

/// Wrap an evaluation failure without losing the underlying [`LangError`].
pub(crate) fn expression_error(err: LangError) -> DetectError {
    StructError::from(DetectReason::Expression(err))
}
