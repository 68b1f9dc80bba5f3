use thiserror::Error;

/// Reasons a deposit or withdraw form does not produce a request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("Input was cancelled")]
    Cancelled,
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Amount is not a number: {0}")]
    MalformedAmount(String),
    #[error("Amount must be positive and finite, got {0}")]
    NonPositiveAmount(f64),
}

#[derive(Error, Debug)]
pub enum LanguageError {
    #[error("Invalid language `{0}`")]
    ParseLanguageError(String),
}
