use crate::date::DateKey;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered daily price history for one instrument.
///
/// Dates are unique and strictly increasing; every price is finite and positive.
/// Missing trading days are simply absent. The series is read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    dates: Vec<DateKey>,
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(dates: Vec<DateKey>, prices: Vec<f64>) -> Result<Self, CoreError> {
        if dates.len() != prices.len() {
            return Err(CoreError::InvalidInput(
                "price series".to_string(),
                format!("{} dates but {} prices", dates.len(), prices.len()),
            ));
        }

        for (index, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(CoreError::UnorderedDates {
                    index: index + 1,
                    previous: pair[0].to_string(),
                    current: pair[1].to_string(),
                });
            }
        }

        if let Some((index, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(CoreError::InvalidInput(
                "price series".to_string(),
                format!("price {} at index {} ({}) is not positive", price, index, dates[index]),
            ));
        }

        Ok(Self { dates, prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[DateKey] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn first_date(&self) -> Option<DateKey> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<DateKey> {
        self.dates.last().copied()
    }

    /// Number of days that receive a bubble index value for the given window.
    pub fn admissible_days(&self, window: usize) -> usize {
        self.len().saturating_sub(window)
    }
}

/// Hyperparameters of the log-periodic model for one run task.
///
/// These are swept externally and never re-estimated by the fit itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    omega: f64,
    m_coeff: f64,
    t_crit: f64,
    window: usize,
}

impl ModelParameters {
    /// The smallest window that still leaves a solvable three-parameter fit.
    pub const MIN_WINDOW: usize = 3;

    pub fn new(omega: f64, m_coeff: f64, t_crit: f64, window: usize) -> Result<Self, CoreError> {
        if !omega.is_finite() || omega <= 0.0 {
            return Err(CoreError::InvalidInput("omega".to_string(), format!("{} must be positive", omega)));
        }
        if !m_coeff.is_finite() || m_coeff <= 0.0 || m_coeff >= 1.0 {
            return Err(CoreError::InvalidInput(
                "m_coeff".to_string(),
                format!("{} must lie strictly between 0 and 1", m_coeff),
            ));
        }
        // Every regressor base is t_crit + k for k >= 0, so a positive t_crit
        // keeps the power and logarithm defined across the whole window.
        if !t_crit.is_finite() || t_crit <= 0.0 {
            return Err(CoreError::InvalidInput("t_crit".to_string(), format!("{} must be positive", t_crit)));
        }
        if window < Self::MIN_WINDOW {
            return Err(CoreError::InvalidInput(
                "window".to_string(),
                format!("{} is below the minimum of {}", window, Self::MIN_WINDOW),
            ));
        }

        Ok(Self { omega, m_coeff, t_crit, window })
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn m_coeff(&self) -> f64 {
        self.m_coeff
    }

    pub fn t_crit(&self) -> f64 {
        self.t_crit
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// Identifies an instrument within its category (e.g. `Stocks/TSLA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub category: String,
    pub name: String,
}

impl Selection {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self { category: category.into(), name: name.into() }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let err = PriceSeries::new(vec![day("2020-01-02"), day("2020-01-01")], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CoreError::UnorderedDates { index: 1, .. }));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        assert!(PriceSeries::new(vec![day("2020-01-02"), day("2020-01-02")], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn series_rejects_non_positive_prices() {
        assert!(PriceSeries::new(vec![day("2020-01-01"), day("2020-01-02")], vec![1.0, 0.0]).is_err());
        assert!(PriceSeries::new(vec![day("2020-01-01")], vec![f64::NAN]).is_err());
    }

    #[test]
    fn admissible_days_saturates() {
        let series = PriceSeries::new(vec![day("2020-01-01"), day("2020-01-02")], vec![1.0, 2.0]).unwrap();
        assert_eq!(series.admissible_days(1), 1);
        assert_eq!(series.admissible_days(2), 0);
        assert_eq!(series.admissible_days(52), 0);
    }

    #[test]
    fn model_parameters_validate_ranges() {
        assert!(ModelParameters::new(6.28, 0.38, 21.0, 52).is_ok());
        assert!(ModelParameters::new(0.0, 0.38, 21.0, 52).is_err());
        assert!(ModelParameters::new(6.28, 1.0, 21.0, 52).is_err());
        assert!(ModelParameters::new(6.28, 0.38, 0.0, 52).is_err());
        assert!(ModelParameters::new(6.28, 0.38, 21.0, 2).is_err());
    }
}
