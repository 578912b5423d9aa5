//! Errors specific to the arrangement search

use raidcalc_common::Error as CommonError;
use thiserror::Error;

/// Errors raised when the search outgrows its limits
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("more than {limit} disk selections")]
    TooManySelections { limit: usize },

    #[error("more than {limit} candidate configurations")]
    TooManyCandidates { limit: usize },
}

impl From<SearchError> for CommonError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::TooManySelections { limit } => CommonError::SearchLimitExceeded {
                what: "selections",
                limit,
            },
            SearchError::TooManyCandidates { limit } => CommonError::SearchLimitExceeded {
                what: "candidates",
                limit,
            },
        }
    }
}
