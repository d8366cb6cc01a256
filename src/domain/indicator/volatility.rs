//! Rolling volatility of daily returns.
//!
//! VOL(w)[i] = sample stddev(R[i-w+1..=i]), defined only when all w returns
//! in the window are defined. Since R[0] is undefined, the first w values are
//! undefined. A window below 2 has no sample deviation and stays undefined.

use crate::domain::stats::sample_stddev;

pub fn rolling_volatility(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; returns.len()];
    if window < 2 {
        return values;
    }

    let mut buffer = Vec::with_capacity(window);
    for i in (window - 1)..returns.len() {
        buffer.clear();
        buffer.extend(returns[i + 1 - window..=i].iter().map_while(|r| *r));
        if buffer.len() == window {
            values[i] = sample_stddev(&buffer);
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::returns::daily_returns;
    use approx::assert_relative_eq;

    #[test]
    fn volatility_warmup_is_window_length() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 5) as f64).collect();
        let vol = rolling_volatility(&daily_returns(&closes), 30);

        assert_eq!(vol.iter().filter(|v| v.is_none()).count(), 30);
        assert!(vol[29].is_none());
        assert!(vol[30].is_some());
    }

    #[test]
    fn volatility_matches_sample_stddev() {
        let returns = vec![None, Some(0.01), Some(-0.02), Some(0.03)];
        let vol = rolling_volatility(&returns, 3);

        assert_eq!(vol[..3], [None, None, None]);
        let expected = sample_stddev(&[0.01, -0.02, 0.03]).unwrap();
        assert_relative_eq!(vol[3].unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn volatility_constant_price_is_zero() {
        let vol = rolling_volatility(&daily_returns(&[50.0; 10]), 5);
        assert_relative_eq!(vol[9].unwrap(), 0.0);
        assert!(vol.iter().flatten().all(|v| *v >= 0.0));
    }

    #[test]
    fn volatility_skips_windows_with_gaps() {
        let returns = vec![None, Some(0.01), None, Some(0.02), Some(0.03)];
        let vol = rolling_volatility(&returns, 2);

        assert!(vol[2].is_none());
        assert!(vol[3].is_none());
        assert!(vol[4].is_some());
    }

    #[test]
    fn volatility_small_windows_are_undefined() {
        let returns = vec![None, Some(0.01), Some(0.02)];
        assert_eq!(rolling_volatility(&returns, 1), vec![None, None, None]);
        assert_eq!(rolling_volatility(&returns, 0), vec![None, None, None]);
        assert_eq!(rolling_volatility(&returns, 5), vec![None, None, None]);
    }
}
