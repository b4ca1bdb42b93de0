use core_types::ModelParameters;
use numerics::transform::reverse_in_place;

/// The two model regressors for one window length, in chronological order.
///
/// Position `k` days before the window's most recent day sits `t_crit + k`
/// days ahead of the critical time, so
/// `time_power = (t_crit + k)^m` and `cos_term = cos(omega * ln(t_crit + k))`.
/// They depend only on the model parameters, so one instance serves every
/// window of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Regressors {
    time_power: Vec<f64>,
    cos_term: Vec<f64>,
}

impl Regressors {
    pub fn build(params: &ModelParameters) -> Self {
        let window = params.window();
        let mut time_power = Vec::with_capacity(window);
        let mut cos_term = Vec::with_capacity(window);

        // Generated walking backward from the most recent day.
        for k in 0..window {
            let dt = params.t_crit() + k as f64;
            time_power.push(dt.powf(params.m_coeff()));
            cos_term.push((params.omega() * dt.ln()).cos());
        }
        reverse_in_place(&mut time_power);
        reverse_in_place(&mut cos_term);

        Self { time_power, cos_term }
    }

    pub fn time_power(&self) -> &[f64] {
        &self.time_power
    }

    pub fn cos_term(&self) -> &[f64] {
        &self.cos_term
    }

    pub fn len(&self) -> usize {
        self.time_power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_power.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recent_day_is_last() {
        let params = ModelParameters::new(6.28, 0.38, 21.0, 52).unwrap();
        let regressors = Regressors::build(&params);
        assert_eq!(regressors.len(), 52);
        assert_eq!(regressors.time_power()[51], 21.0_f64.powf(0.38));
        assert_eq!(regressors.time_power()[0], 72.0_f64.powf(0.38));
        assert_eq!(regressors.cos_term()[51], (6.28 * 21.0_f64.ln()).cos());
    }

    #[test]
    fn every_value_is_finite() {
        let params = ModelParameters::new(6.28, 0.9, 0.01, 500).unwrap();
        let regressors = Regressors::build(&params);
        assert!(regressors.time_power().iter().all(|v| v.is_finite() && *v > 0.0));
        assert!(regressors.cos_term().iter().all(|v| v.is_finite() && v.abs() <= 1.0));
    }
}
