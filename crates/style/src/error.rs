use pagewright_traits::FontError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Drawing context has no {0} entry")]
    MissingEntry(&'static str),
}
