use thiserror::Error;

/// Failures surfaced by deck construction and probability queries.
///
/// Every error is local to the call that produced it; nothing here is retried
/// because all computations are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddsError {
    #[error("deck has no cards")]
    EmptyDeck,
    #[error("invalid {parameter}: {message}")]
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },
    #[error("declared deck size {declared} does not match {actual} counted copies")]
    DeckSizeMismatch { declared: u32, actual: u32 },
    #[error("'{id}' has {copies} copies; allowed range is 1..={max}", max = crate::model::deck::MAX_COPIES)]
    InvalidCopies { id: String, copies: u32 },
    #[error("'{0}' is listed more than once")]
    DuplicateCard(String),
    #[error("binomial coefficient overflow for population {population}, draws {draws}")]
    Overflow { population: u32, draws: u32 },
}

impl OddsError {
    pub(crate) fn invalid(parameter: &'static str, message: impl Into<String>) -> Self {
        OddsError::InvalidParameter {
            parameter,
            message: message.into(),
        }
    }
}

pub type OddsResult<T> = Result<T, OddsError>;
