use chainring::sans::rollover::{Accumulator, delta};

#[test]
fn delta_across_single_wrap() {
    assert_eq!(delta(Some(200u8), 50), (106, 50));
    assert_eq!(delta(Some(65000u16), 100), (636, 100));
}

#[test]
fn delta_without_previous_sample() {
    assert_eq!(delta::<u8>(None, 77), (0, 77));
    assert_eq!(delta::<u16>(None, 0xFFFF), (0, 0xFFFF));
}

#[test]
fn accumulator_seeds_on_first_sample() {
    let mut a = Accumulator::<u16>::new();
    assert!(!a.is_seeded());

    assert_eq!(a.update(1000), 0);
    assert!(a.is_seeded());
    assert_eq!(a.last(), Some(1000));
    assert_eq!(a.total(), 0);
}

#[test]
fn accumulator_counts_every_wrap() {
    let mut a = Accumulator::<u8>::new();
    a.update(10);

    // Each pair of samples advances a full counter period.
    for _ in 0..5 {
        a.update(138);
        a.update(10);
    }
    a.update(42);

    assert_eq!(a.total(), 5 * 256 + 32);
}

#[test]
fn accumulator_ignores_repeated_sample() {
    let mut a = Accumulator::<u8>::new();
    a.update(3);
    a.update(9);
    assert_eq!(a.update(9), 0);
    assert_eq!(a.total(), 6);
}

#[test]
fn accumulator_never_decreases() {
    let mut a = Accumulator::<u8>::new();
    let mut previous = 0;

    for raw in [250, 251, 0, 7, 7, 6, 255, 1] {
        a.update(raw);
        assert!(a.total() >= previous);
        previous = a.total();
    }

    // 6 after 7 is read as a near-full wrap, not a step backwards.
    assert_eq!(a.total(), 1 + 5 + 7 + 0 + 255 + 249 + 2);
}
