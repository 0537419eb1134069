/// Scales the sampled per-commit average up to `full_count` commits.
///
/// Returns `sampled_changes` unchanged when nothing was sampled or when the
/// sample already covers the whole population.
pub fn estimate_total(sampled_changes: u64, sampled_count: u64, full_count: u64) -> f64 {
    if sampled_count == 0 || full_count <= sampled_count {
        return sampled_changes as f64;
    }
    (sampled_changes as f64 / sampled_count as f64) * full_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_coverage_is_returned_verbatim() {
        assert_eq!(estimate_total(420, 7, 7), 420.0);
        assert_eq!(estimate_total(420, 7, 3), 420.0);
    }

    #[test]
    fn empty_sample_is_not_scaled() {
        assert_eq!(estimate_total(0, 0, 40), 0.0);
        assert_eq!(estimate_total(15, 0, 40), 15.0);
    }

    #[test]
    fn partial_sample_scales_by_average() {
        assert_eq!(estimate_total(500, 10, 40), 2000.0);
        assert_eq!(estimate_total(3, 2, 5), 7.5);
    }

    #[test]
    fn estimates_never_go_negative() {
        for sampled in 1..6u64 {
            for full in sampled..12 {
                for changes in [0u64, 1, 17, 9_999] {
                    let est = estimate_total(changes, sampled, full);
                    assert!(est >= 0.0);
                    if full == sampled {
                        assert_eq!(est, changes as f64);
                    }
                }
            }
        }
    }
}
