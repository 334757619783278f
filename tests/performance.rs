use nova_pp::{Difficulty, DifficultyAttributes, Error, Performance};
use proptest::prelude::*;

mod common;

fn attrs() -> DifficultyAttributes {
    Difficulty::new()
        .cs(4.0)
        .ar(9.3)
        .od(8.8)
        .calculate(&common::circle_map(200, 150.0))
        .unwrap()
}

#[test]
fn empty_map_is_worth_zero_pp() {
    let empty = Difficulty::new()
        .calculate(&nova_pp::model::hit_object::HitObjects::new(Vec::new()).unwrap())
        .unwrap();

    let perf = Performance::new(empty).calculate().unwrap();

    assert!(perf.pp.abs() < f64::EPSILON);
    assert!(perf.speed_deviation.is_none());
}

#[test]
fn full_combo_ss_is_the_ceiling() {
    let attrs = attrs();

    let ss = Performance::new(attrs.clone()).calculate().unwrap();
    let with_mistakes = Performance::new(attrs).n100(10).misses(3).calculate().unwrap();

    assert!(ss.pp > 0.0);
    assert!(with_mistakes.pp < ss.pp);
}

#[test]
fn misses_never_pay_off() {
    let attrs = attrs();

    let mut prev = f64::INFINITY;

    for misses in [0, 1, 2, 5, 10, 25] {
        let perf = Performance::new(attrs.clone())
            .misses(misses)
            .calculate()
            .unwrap();

        assert!(
            perf.pp < prev,
            "pp did not drop when going to {misses} misses"
        );
        assert!(perf.effective_miss_count >= f64::from(misses));
        prev = perf.pp;
    }
}

#[test]
fn combo_breaks_cost_pp_on_slider_maps() {
    let attrs = Difficulty::new()
        .calculate(&common::mixed_map())
        .unwrap();

    // One imperfect hit so the combo deficit can be attributed to a break.
    let fc = Performance::new(attrs.clone()).n100(1).calculate().unwrap();
    let choked = Performance::new(attrs)
        .n100(1)
        .combo(2)
        .calculate()
        .unwrap();

    assert!(choked.pp < fc.pp);
    assert!(choked.effective_miss_count > fc.effective_miss_count);
}

#[test]
fn score_and_granular_input_agree() {
    let attrs = attrs();

    let score = nova_pp::model::score::ScoreData {
        mods: 8,
        max_combo: attrs.max_combo - 5,
        n300: 190,
        n100: 8,
        n50: 1,
        misses: 1,
    };

    let via_score = Performance::new(attrs.clone()).score(score).calculate().unwrap();
    let via_builder = Performance::new(attrs)
        .mods(8)
        .combo(score.max_combo)
        .n300(190)
        .n100(8)
        .n50(1)
        .misses(1)
        .calculate()
        .unwrap();

    assert_eq!(via_score, via_builder);
}

#[test]
fn invalid_inputs_are_rejected() {
    let attrs = attrs();

    assert!(matches!(
        Performance::new(attrs.clone()).accuracy(-0.1).calculate(),
        Err(Error::InvalidScoreData(_))
    ));
    assert!(matches!(
        Performance::new(attrs.clone())
            .combo(attrs.max_combo + 1)
            .calculate(),
        Err(Error::InvalidScoreData(_))
    ));
    assert!(matches!(
        Performance::new(attrs.clone()).misses(100_000).calculate(),
        Err(Error::InvalidScoreData(_))
    ));

    let mut broken = attrs.clone();
    broken.speed = f64::NEG_INFINITY;
    assert!(matches!(
        Performance::new(broken).calculate(),
        Err(Error::InvalidAttributes(_))
    ));

    // A poisoned hit window must be rejected up front instead of
    // surfacing as NaN pp out of the deviation estimate.
    let mut broken = attrs;
    broken.ok_hit_window = f64::NAN;
    assert!(matches!(
        Performance::new(broken).n100(5).calculate(),
        Err(Error::InvalidAttributes(_))
    ));
}

proptest! {
    #[test]
    fn trading_greats_for_goods_never_gains(n100 in 0_u32..100) {
        let attrs = attrs();

        let better = Performance::new(attrs.clone())
            .n100(n100)
            .calculate()
            .unwrap();
        let worse = Performance::new(attrs)
            .n100(n100 + 1)
            .calculate()
            .unwrap();

        prop_assert!(worse.pp <= better.pp);
    }

    #[test]
    fn pp_is_finite_for_any_valid_score(
        n100 in 0_u32..100,
        n50 in 0_u32..50,
        misses in 0_u32..50,
        combo_deficit in 0_u32..200,
    ) {
        let attrs = attrs();
        let combo = attrs.max_combo.saturating_sub(combo_deficit);

        let perf = Performance::new(attrs)
            .n100(n100)
            .n50(n50)
            .misses(misses)
            .combo(combo)
            .calculate()
            .unwrap();

        prop_assert!(perf.pp.is_finite());
        prop_assert!(perf.pp >= 0.0);
    }
}

#[cfg(feature = "serde")]
mod serde {
    use super::*;

    #[test]
    fn attribute_round_trip_reproduces_identical_pp() {
        let attrs = attrs();

        let json = serde_json::to_string(&attrs).unwrap();
        let restored: DifficultyAttributes = serde_json::from_str(&json).unwrap();

        assert_eq!(attrs, restored);

        let original = Performance::new(attrs).accuracy(0.97).calculate().unwrap();
        let round_tripped = Performance::new(restored)
            .accuracy(0.97)
            .calculate()
            .unwrap();

        assert_eq!(original.pp.to_bits(), round_tripped.pp.to_bits());
    }
}
