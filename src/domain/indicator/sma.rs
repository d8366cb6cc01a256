//! Simple moving average of closing prices.
//!
//! MA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) values are undefined. A window longer than the series
//! (or zero) leaves every value undefined.

pub fn moving_average(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return values;
    }

    let mut window_sum: f64 = closes[..period].iter().sum();
    values[period - 1] = Some(window_sum / period as f64);

    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        values[i] = Some(window_sum / period as f64);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup() {
        let ma = moving_average(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(ma[0].is_none());
        assert!(ma[1].is_none());
        assert!(ma[2].is_some());
        assert!(ma[4].is_some());
    }

    #[test]
    fn sma_values() {
        let ma = moving_average(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_relative_eq!(ma[2].unwrap(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(ma[3].unwrap(), 30.0, epsilon = 1e-12);
        assert_relative_eq!(ma[4].unwrap(), 40.0, epsilon = 1e-12);
    }

    #[test]
    fn sma_fifty_has_forty_nine_undefined() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64).sin()).collect();
        let ma = moving_average(&closes, 50);

        assert_eq!(ma.iter().filter(|v| v.is_none()).count(), 49);
        let expected = closes[..50].iter().sum::<f64>() / 50.0;
        assert_relative_eq!(ma[49].unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn sma_window_longer_than_series_is_all_undefined() {
        let ma = moving_average(&[1.0, 2.0, 3.0], 200);
        assert_eq!(ma, vec![None, None, None]);
    }

    #[test]
    fn sma_window_equal_to_series() {
        let ma = moving_average(&[1.0, 2.0, 3.0], 3);
        assert_eq!(ma[..2], [None, None]);
        assert_relative_eq!(ma[2].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn sma_zero_window() {
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }
}
