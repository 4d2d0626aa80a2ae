//! NaN-aware percentile

/// Percentile `p` (0-100) of the non-NaN values, with linear interpolation
/// between the two nearest ranks.
///
/// Returns `None` when nothing is left after dropping NaNs.
pub fn nan_percentile<I>(values: I, p: f64) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    if lo == hi {
        return Some(sorted[lo]);
    }
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
