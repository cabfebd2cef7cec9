use engine::dice::{degree_of_success, Dice, DegreeOfSuccess};
use proptest::prelude::*;

#[test]
fn seeded_dice_is_reproducible_across_instances() {
    let mut a = Dice::from_seed(1234);
    let mut b = Dice::from_seed(1234);
    let rolls_a: Vec<i32> = (0..20).map(|_| a.d20()).collect();
    let rolls_b: Vec<i32> = (0..20).map(|_| b.d20()).collect();
    assert_eq!(rolls_a, rolls_b);
}

#[test]
fn roll_sum_stays_within_bounds() {
    let mut dice = Dice::from_seed(9);
    for _ in 0..200 {
        let total = dice.roll_sum(3, 6);
        assert!((3..=18).contains(&total));
    }
}

proptest! {
    #[test]
    fn degree_of_success_is_monotone_in_total_minus_dc(roll in 1i32..=20, dc in -10i32..30, delta in 0i32..60) {
        let low_total = dc - 20;
        let high_total = low_total + delta;
        let low = degree_of_success(roll, low_total, dc);
        let high = degree_of_success(roll, high_total, dc);
        prop_assert!(high >= low);
    }

    #[test]
    fn nat20_never_produces_critical_failure(total in -50i32..50, dc in -10i32..30) {
        let dos = degree_of_success(20, total, dc);
        prop_assert_ne!(dos, DegreeOfSuccess::CriticalFailure);
    }

    #[test]
    fn nat1_never_produces_critical_success(total in -50i32..80, dc in -10i32..30) {
        let dos = degree_of_success(1, total, dc);
        prop_assert_ne!(dos, DegreeOfSuccess::CriticalSuccess);
    }
}
