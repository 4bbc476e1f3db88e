//! Link Budget (C2): elevation → permitted bit-rate.

/// `data_rate(elev_deg, max_rate, α, mask)` as spec §4.2.
///
/// Zero at or below the mask; otherwise `max_rate · clamp(sin(e), 0, 1)^α`,
/// which reaches `max_rate` at zenith.
pub fn data_rate(elev_deg: f64, max_rate: f64, alpha: f64, mask_deg: f64) -> f64 {
    if elev_deg <= mask_deg {
        return 0.0;
    }
    let s = elev_deg.to_radians().sin().clamp(0.0, 1.0);
    max_rate * s.powf(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn at_or_below_mask_is_zero() {
        assert_eq!(data_rate(10.0, 0.258, 1.5, 10.0), 0.0);
        assert_eq!(data_rate(5.0, 0.258, 1.5, 10.0), 0.0);
    }

    #[test]
    fn zenith_equals_max_rate() {
        assert_abs_diff_eq!(data_rate(90.0, 0.258, 1.5, 10.0), 0.258, epsilon = 1e-9);
    }

    #[test]
    fn alpha_zero_is_max_rate_above_mask() {
        // Testable property 10: for α=0 and any e > mask, data_rate = max_rate.
        assert_abs_diff_eq!(data_rate(15.0, 0.5, 0.0, 10.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(data_rate(89.0, 0.5, 0.0, 10.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn scenario_s2_matches_spec() {
        // S2: mask=10, e=30, max_rate=0.258 Mbps, α=1.5 → rate ≈ 0.0912 Mbps.
        let rate = data_rate(30.0, 0.258, 1.5, 10.0);
        assert_abs_diff_eq!(rate, 0.0912, epsilon = 1e-3);
    }

    #[test]
    fn monotonic_non_decreasing_above_mask() {
        // Testable property 3.
        let mask = 10.0;
        let mut prev = 0.0;
        let mut e = mask + 0.5;
        while e <= 90.0 {
            let r = data_rate(e, 1.0, 1.5, mask);
            assert!(r + 1e-12 >= prev, "rate decreased at e={e}: {r} < {prev}");
            prev = r;
            e += 0.5;
        }
    }
}
