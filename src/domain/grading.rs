//! Note grading rules

/// Weight of the continuous-evaluation mark
pub const CE_WEIGHT: f32 = 0.4;
/// Weight of the final-exam mark
pub const FE_WEIGHT: f32 = 0.6;

/// Compute the weighted average of the two exam terms, rounded to two
/// decimals. A missing term counts as zero; the score is always recomputed
/// server-side and never trusted from client input.
pub fn weighted_score(ce: Option<f32>, fe: Option<f32>) -> f32 {
    let ce = ce.unwrap_or(0.0);
    let fe = fe.unwrap_or(0.0);
    ((ce * CE_WEIGHT + fe * FE_WEIGHT) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_score_both_terms() {
        assert_eq!(weighted_score(Some(10.0), Some(15.0)), 13.0);
        assert_eq!(weighted_score(Some(20.0), Some(20.0)), 20.0);
    }

    #[test]
    fn test_weighted_score_missing_terms_count_as_zero() {
        assert_eq!(weighted_score(None, Some(10.0)), 6.0);
        assert_eq!(weighted_score(Some(10.0), None), 4.0);
        assert_eq!(weighted_score(None, None), 0.0);
    }

    #[test]
    fn test_weighted_score_rounds_to_two_decimals() {
        // 0.4 * 11.11 + 0.6 * 13.33 = 12.442 -> 12.44
        assert_eq!(weighted_score(Some(11.11), Some(13.33)), 12.44);
    }
}
