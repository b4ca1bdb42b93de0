use crate::error::NumericsError;
use crate::transform::{map_into, multiply_into, subtract_into};

/// Starting level of the synthetic price series.
pub const BASE_LEVEL: f64 = 100.0;

/// Rebases a price series to start at 100.0 and returns its natural log.
///
/// Simple returns `r_i = (p_i - p_{i-1}) / p_{i-1}` are compounded onto a
/// synthetic level `v_i = v_{i-1} + v_{i-1} * r_i` with `v_0 = 100`, and
/// `ln(v_i)` is returned for every index.
pub fn normalize_log_returns(prices: &[f64]) -> Result<Vec<f64>, NumericsError> {
    if prices.is_empty() {
        return Err(NumericsError::EmptyInput("normalize_log_returns".to_string()));
    }
    if let Some((index, &value)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(NumericsError::NonPositivePrice { index, value });
    }

    let steps = prices.len() - 1;
    let current = &prices[1..];
    let previous = &prices[..steps];

    let mut change = vec![0.0; steps];
    subtract_into(current, previous, &mut change)?;
    let mut inverse = vec![0.0; steps];
    map_into(previous, &mut inverse, |p| 1.0 / p)?;
    let mut returns = vec![0.0; steps];
    multiply_into(&change, &inverse, &mut returns)?;

    let mut normalized = Vec::with_capacity(prices.len());
    let mut level = BASE_LEVEL;
    normalized.push(level.ln());
    for r in returns {
        level = level * r + level;
        normalized.push(level.ln());
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_price_yields_log_base() {
        assert_eq!(normalize_log_returns(&[42.0]).unwrap(), vec![BASE_LEVEL.ln()]);
    }

    #[test]
    fn constant_series_is_flat() {
        let out = normalize_log_returns(&[7.5; 20]).unwrap();
        assert_eq!(out, vec![BASE_LEVEL.ln(); 20]);
    }

    #[test]
    fn tracks_relative_moves() {
        let out = normalize_log_returns(&[50.0, 100.0, 25.0]).unwrap();
        assert!((out[1] - 200.0_f64.ln()).abs() < 1e-12);
        assert!((out[2] - 50.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn rejects_empty_and_non_positive_input() {
        assert!(matches!(normalize_log_returns(&[]), Err(NumericsError::EmptyInput(_))));
        assert_eq!(
            normalize_log_returns(&[1.0, -2.0, 3.0]),
            Err(NumericsError::NonPositivePrice { index: 1, value: -2.0 })
        );
        assert!(normalize_log_returns(&[1.0, 0.0]).is_err());
    }

    proptest! {
        #[test]
        fn output_matches_log_of_rebased_price(prices in prop::collection::vec(0.01f64..1e6, 1..200)) {
            let out = normalize_log_returns(&prices).unwrap();
            prop_assert_eq!(out.len(), prices.len());
            for (i, value) in out.iter().enumerate() {
                let expected = (BASE_LEVEL * prices[i] / prices[0]).ln();
                prop_assert!((value - expected).abs() < 1e-8, "index {}: {} vs {}", i, value, expected);
            }
        }

        #[test]
        fn scale_invariant(prices in prop::collection::vec(0.5f64..500.0, 2..100), scale in 0.01f64..100.0) {
            let scaled: Vec<f64> = prices.iter().map(|p| p * scale).collect();
            let a = normalize_log_returns(&prices).unwrap();
            let b = normalize_log_returns(&scaled).unwrap();
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
