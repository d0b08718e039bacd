/// Failure raised while parsing or evaluating a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LangError {
    #[error("parse error in {expression:?}: {message}")]
    Parse { expression: String, message: String },
    #[error("unknown helper `_.{0}`")]
    UnknownHelper(String),
    #[error("helper `_.{helper}` expects {expected} argument(s), got {found}")]
    Arity {
        helper: String,
        expected: &'static str,
        found: usize,
    },
    #[error("unknown method `{method}` on {receiver}")]
    UnknownMethod {
        method: String,
        receiver: &'static str,
    },
}

pub type LangResult<T> = Result<T, LangError>;
