//! Position weighting for ingredient lists

/// Exponent of the positional falloff `1 / (i + 1)^exp`.
pub const POSITION_EXPONENT: f64 = 0.3;

/// Aggregate reported for an empty ingredient list.
pub const EMPTY_LIST_SCORE: f64 = 60.0;

/// Weight of the ingredient at 0-based `position`.
pub fn position_weight(position: usize) -> f64 {
    1.0 / ((position + 1) as f64).powf(POSITION_EXPONENT)
}

/// Position-weighted mean of `scores`, rounded to one decimal.
pub fn weighted_mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return EMPTY_LIST_SCORE;
    }

    let (weighted_sum, total_weight) =
        scores.iter().enumerate().fold((0.0, 0.0), |(sum, total), (position, score)| {
            let weight = position_weight(position);
            (sum + score * weight, total + weight)
        });

    round_one_decimal(weighted_sum / total_weight)
}

/// Unweighted mean truncated to an integer.
pub fn truncated_mean(scores: &[f64]) -> u32 {
    if scores.is_empty() {
        return EMPTY_LIST_SCORE as u32;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(0.0, 100.0).trunc() as u32
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
