use crate::regressors::Regressors;
use numerics::{Coefficients, NumericsError, fit_three_parameter, normalize_log_returns};

/// Everything computed for one window position. Never persisted.
#[derive(Debug, Clone)]
pub struct WindowFit<'a> {
    pub log_prices: Vec<f64>,
    pub time_power: &'a [f64],
    pub cos_term: &'a [f64],
    pub coefficients: Coefficients,
}

impl WindowFit<'_> {
    pub fn bubble_index(&self) -> f64 {
        bubble_index(&self.coefficients)
    }
}

/// Normalizes one window of prices and fits the model against the shared regressors.
pub fn fit_window<'a>(prices: &[f64], regressors: &'a Regressors) -> Result<WindowFit<'a>, NumericsError> {
    if prices.len() != regressors.len() {
        return Err(NumericsError::LengthMismatch {
            context: "window",
            expected: regressors.len(),
            found: prices.len(),
        });
    }
    let log_prices = normalize_log_returns(prices)?;
    let coefficients = fit_three_parameter(&log_prices, regressors.time_power(), regressors.cos_term())?;

    Ok(WindowFit {
        log_prices,
        time_power: regressors.time_power(),
        cos_term: regressors.cos_term(),
        coefficients,
    })
}

/// The per-day statistic: the negated power-law coefficient.
///
/// Growth that accelerates towards the critical time fits with a negative
/// power coefficient, so bubble-like windows score positive.
pub fn bubble_index(coefficients: &Coefficients) -> f64 {
    let value = -coefficients.power_coeff;
    // Normalise -0.0 so identical fits always print identically.
    if value == 0.0 { 0.0 } else { value }
}
