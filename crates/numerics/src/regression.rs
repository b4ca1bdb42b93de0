use crate::error::NumericsError;
use nalgebra::{DMatrix, DVector};

/// Singular values at or below this fraction of the largest one mark the
/// design matrix as rank-deficient.
pub const RANK_TOLERANCE: f64 = 1e-12;

/// Solution of `y ≈ intercept + power_coeff·x1 + cos_coeff·x2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub intercept: f64,
    pub power_coeff: f64,
    pub cos_coeff: f64,
}

/// Ordinary least squares for `y ≈ a + b·x1 + c·x2`.
///
/// The design matrix `[1, x1, x2]` is decomposed with an SVD so that
/// near-collinear regressors are detected rather than silently amplified.
pub fn fit_three_parameter(y: &[f64], x1: &[f64], x2: &[f64]) -> Result<Coefficients, NumericsError> {
    let n = y.len();
    if x1.len() != n {
        return Err(NumericsError::LengthMismatch { context: "fit x1", expected: n, found: x1.len() });
    }
    if x2.len() != n {
        return Err(NumericsError::LengthMismatch { context: "fit x2", expected: n, found: x2.len() });
    }
    if n < 3 {
        return Err(NumericsError::InsufficientObservations(n));
    }
    if y.iter().chain(x1).chain(x2).any(|v| !v.is_finite()) {
        return Err(NumericsError::Solve("inputs contain non-finite values".to_string()));
    }

    let design = DMatrix::from_fn(n, 3, |row, col| match col {
        0 => 1.0,
        1 => x1[row],
        _ => x2[row],
    });
    let rhs = DVector::from_column_slice(y);

    let svd = design.svd(true, true);
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    if largest <= 0.0 || smallest <= largest * RANK_TOLERANCE {
        return Err(NumericsError::RankDeficient(format!(
            "singular values span {:e} to {:e}",
            smallest, largest
        )));
    }

    let solution = svd
        .solve(&rhs, 0.0)
        .map_err(|e| NumericsError::Solve(e.to_string()))?;

    Ok(Coefficients {
        intercept: solution[0],
        power_coeff: solution[1],
        cos_coeff: solution[2],
    })
}
