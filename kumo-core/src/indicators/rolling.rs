//! Rolling window extrema and index shifts.
//!
//! Windows are inclusive and trailing: the window at `i` covers
//! `values[i + 1 - period..=i]`. A window that is short or contains a NaN
//! yields NaN.

use std::collections::VecDeque;

/// Highest value over each trailing window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |kept, incoming| kept > incoming)
}

/// Lowest value over each trailing window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |kept, incoming| kept < incoming)
}

/// Monotonic-deque sweep. `dominates(a, b)` is true when `a` should stay
/// ahead of a newer `b` in the deque.
fn rolling_extreme(values: &[f64], period: usize, dominates: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut window: VecDeque<usize> = VecDeque::with_capacity(period);
    let mut last_nan: Option<usize> = None;

    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            last_nan = Some(i);
        } else {
            while let Some(&back) = window.back() {
                if dominates(values[back], value) {
                    break;
                }
                window.pop_back();
            }
            window.push_back(i);
        }

        let start = (i + 1).saturating_sub(period);
        while window.front().is_some_and(|&front| front < start) {
            window.pop_front();
        }

        if i + 1 < period || last_nan.is_some_and(|j| j >= start) {
            continue;
        }
        if let Some(&front) = window.front() {
            result[i] = values[front];
        }
    }

    result
}

/// Move every value `by` positions later: `out[i] = values[i - by]`.
pub fn shift_forward(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in by..n {
        result[i] = values[i - by];
    }
    result
}

/// Move every value `by` positions earlier: `out[i] = values[i + by]`.
pub fn shift_backward(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in 0..n.saturating_sub(by) {
        result[i] = values[i + by];
    }
    result
}
