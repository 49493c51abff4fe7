use proptest::prelude::*;

use drip_types::{Rate, Timestamp, TransferAmount, PRECISION};

proptest! {
    /// Display then parse yields the same rate.
    #[test]
    fn rate_display_parse_roundtrip(raw in 0u128..(u64::MAX as u128 * 1_000)) {
        let rate = Rate::from_raw(raw);
        let parsed: Rate = rate.to_string().parse().unwrap();
        prop_assert_eq!(parsed, rate);
    }

    /// Whole-number rates scale by PRECISION exactly.
    #[test]
    fn whole_rates_scale_by_precision(whole in 0u64..1_000_000) {
        let rate: Rate = whole.to_string().parse().unwrap();
        prop_assert_eq!(rate.raw(), whole as u128 * PRECISION);
    }

    /// Elapsed time is additive across an intermediate point.
    #[test]
    fn elapsed_is_additive(a in 0u64..1_000_000, b in 0u64..1_000_000, c in 0u64..1_000_000) {
        let t0 = Timestamp::new(a);
        let t1 = Timestamp::new(a + b);
        let t2 = Timestamp::new(a + b + c);
        prop_assert_eq!(
            t0.checked_elapsed_since(t2),
            Some(t0.checked_elapsed_since(t1).unwrap() + t1.checked_elapsed_since(t2).unwrap())
        );
    }

    /// Looking back from an earlier instant is never clamped to zero.
    #[test]
    fn backward_elapsed_is_none(a in 0u64..1_000_000, back in 1u64..1_000_000) {
        let later = Timestamp::new(a + back);
        prop_assert_eq!(later.checked_elapsed_since(Timestamp::new(a)), None);
    }

    /// Any amount other than the sentinel stays exact.
    #[test]
    fn non_sentinel_amounts_are_exact(raw in 0u128..u128::MAX) {
        prop_assert_eq!(TransferAmount::from(raw), TransferAmount::Exact(raw));
    }
}
