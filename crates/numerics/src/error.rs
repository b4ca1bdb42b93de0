use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericsError {
    #[error("Not enough data to perform calculation: {0}")]
    EmptyInput(String),

    #[error("Price {value} at index {index} is not positive; log returns are undefined")]
    NonPositivePrice { index: usize, value: f64 },

    #[error("Length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("A three-parameter fit needs at least 3 observations, found {0}")]
    InsufficientObservations(usize),

    #[error("Design matrix is rank-deficient: {0}")]
    RankDeficient(String),

    #[error("Least-squares solve failed: {0}")]
    Solve(String),
}
