use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Price series is not strictly increasing by date at index {index} ({previous} then {current})")]
    UnorderedDates {
        index: usize,
        previous: String,
        current: String,
    },
}
