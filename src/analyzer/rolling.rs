//! Trailing-window aggregates over a series with gaps.
//!
//! The window at index `i` covers `max(0, i + 1 - window)..=i`. Missing prices are
//! skipped; a window with no prices yields `None`.

fn trailing(prices: &[Option<f64>], i: usize, window: usize) -> impl Iterator<Item = f64> + '_ {
    let start = (i + 1).saturating_sub(window);
    prices[start..=i].iter().flatten().copied()
}

pub fn rolling_mean(prices: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    let (sum, count) = trailing(prices, i, window).fold((0.0, 0usize), |(s, c), p| (s + p, c + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn rolling_min(prices: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    trailing(prices, i, window).reduce(f64::min)
}

pub fn rolling_max(prices: &[Option<f64>], i: usize, window: usize) -> Option<f64> {
    trailing(prices, i, window).reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_truncated_at_start_of_history() {
        let prices = [Some(4.0), Some(2.0), Some(6.0)];
        assert_eq!(rolling_mean(&prices, 0, 7), Some(4.0));
        assert_eq!(rolling_mean(&prices, 2, 7), Some(4.0));
        assert_eq!(rolling_min(&prices, 1, 7), Some(2.0));
    }

    #[test]
    fn window_slides() {
        let prices = [Some(1.0), Some(10.0), Some(3.0), Some(5.0)];
        assert_eq!(rolling_min(&prices, 3, 2), Some(3.0));
        assert_eq!(rolling_max(&prices, 3, 2), Some(5.0));
        assert_eq!(rolling_mean(&prices, 3, 3), Some(6.0));
    }

    #[test]
    fn gaps_are_skipped_not_zeroed() {
        let prices = [Some(10.0), None, Some(20.0)];
        assert_eq!(rolling_mean(&prices, 2, 3), Some(15.0));
        assert_eq!(rolling_min(&prices, 2, 3), Some(10.0));
    }

    #[test]
    fn all_gap_window_is_none() {
        let prices = [Some(10.0), None, None];
        assert_eq!(rolling_mean(&prices, 2, 2), None);
        assert_eq!(rolling_min(&prices, 2, 2), None);
        assert_eq!(rolling_max(&prices, 2, 2), None);
        assert_eq!(rolling_max(&prices, 2, 3), Some(10.0));
    }
}
