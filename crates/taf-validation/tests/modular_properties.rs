//! Property tests for the modular arithmetic behind wind directions.

use proptest::prelude::*;

use taf_validation::{add, shortest_arc, subtract, ModulusError};

const LIMIT: i64 = 1 << 62;

proptest! {
    #[test]
    fn add_stays_in_range(a in -LIMIT..=LIMIT, b in -LIMIT..=LIMIT, m in 1_i64..1_000_000) {
        let sum = add(a, b, m).unwrap();
        prop_assert!((0..m).contains(&sum));
    }

    #[test]
    fn subtract_stays_in_range(a in -LIMIT..=LIMIT, b in -LIMIT..=LIMIT, m in 1_i64..1_000_000) {
        let diff = subtract(a, b, m).unwrap();
        prop_assert!((0..m).contains(&diff));
    }

    #[test]
    fn adding_the_negation_subtracts(a in -LIMIT..=LIMIT, b in -LIMIT..=LIMIT, m in 1_i64..1_000_000) {
        prop_assert_eq!(add(a, -b, m).unwrap(), subtract(a, b, m).unwrap());
    }

    #[test]
    fn add_and_subtract_invert(a in -LIMIT..=LIMIT, b in -LIMIT..=LIMIT, m in 1_i64..1_000_000) {
        let there = add(a, b, m).unwrap();
        let back = subtract(there, b, m).unwrap();
        // Round-tripping lands on the normalized representative of `a`.
        prop_assert_eq!(back, add(a, 0, m).unwrap());
    }

    #[test]
    fn shortest_arc_is_at_most_half_a_circle(d1 in 0_i64..360, d2 in 0_i64..360) {
        let arc = shortest_arc(d1, d2);
        prop_assert!((0..=180).contains(&arc));
        prop_assert_eq!(arc, shortest_arc(d2, d1));
    }

    #[test]
    fn invalid_modulus_is_always_rejected(a in any::<i64>(), b in any::<i64>(), m in -1_000_i64..=0) {
        prop_assert_eq!(add(a, b, m), Err(ModulusError::InvalidModulus(m)));
        prop_assert_eq!(subtract(a, b, m), Err(ModulusError::InvalidModulus(m)));
    }
}
