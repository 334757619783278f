use nova_pp::{model::hit_object::HitObjects, Difficulty};

mod common;

#[test]
fn empty_map_is_all_zeros() {
    let objects = HitObjects::new(Vec::new()).unwrap();
    let attrs = Difficulty::new().calculate(&objects).unwrap();

    assert!(attrs.stars.abs() < f64::EPSILON);
    assert!(attrs.aim.abs() < f64::EPSILON);
    assert!(attrs.speed.abs() < f64::EPSILON);
    assert!((attrs.slider_factor - 1.0).abs() < f64::EPSILON);
    assert_eq!(attrs.max_combo, 0);
    assert_eq!(attrs.n_objects(), 0);
}

#[test]
fn mixed_map_is_deterministic() {
    let objects = common::mixed_map();
    let difficulty = Difficulty::new().cs(4.0).ar(9.0).od(8.5);

    let first = difficulty.calculate(&objects).unwrap();
    let second = difficulty.calculate(&objects).unwrap();

    assert_eq!(first, second);
    assert!(first.stars > 0.0);
    assert_eq!(first.n_circles, 2);
    assert_eq!(first.n_sliders, 1);
    assert_eq!(first.n_spinners, 1);
    // 4 objects plus 2 nested slider events
    assert_eq!(first.max_combo, 6);
}

#[test]
fn slider_factor_stays_within_unit_range() {
    let attrs = Difficulty::new().calculate(&common::mixed_map()).unwrap();

    assert!(attrs.slider_factor > 0.0);
    assert!(attrs.slider_factor <= 1.0);
}

#[test]
fn denser_rhythm_is_harder() {
    let slow = Difficulty::new()
        .calculate(&common::circle_map(64, 300.0))
        .unwrap();
    let fast = Difficulty::new()
        .calculate(&common::circle_map(64, 120.0))
        .unwrap();

    assert!(fast.speed > slow.speed);
    assert!(fast.stars > slow.stars);
}

#[test]
fn hard_rock_shrinks_hit_windows() {
    let objects = common::circle_map(32, 200.0);

    let nomod = Difficulty::new().od(9.0).calculate(&objects).unwrap();
    let hr = Difficulty::new()
        .od(9.0)
        .mods(1 << 4)
        .calculate(&objects)
        .unwrap();
    let ez = Difficulty::new()
        .od(9.0)
        .mods(1 << 1)
        .calculate(&objects)
        .unwrap();

    assert!(hr.great_hit_window < nomod.great_hit_window);
    assert!(ez.great_hit_window > nomod.great_hit_window);
    assert!(hr.od > nomod.od);
}

#[test]
fn double_time_shows_in_attributes() {
    let objects = common::circle_map(32, 200.0);

    let nomod = Difficulty::new().ar(9.0).od(9.0).calculate(&objects).unwrap();
    let dt = Difficulty::new()
        .ar(9.0)
        .od(9.0)
        .mods(1 << 6)
        .calculate(&objects)
        .unwrap();

    assert!(dt.ar > nomod.ar);
    assert!(dt.od > nomod.od);
    assert!(dt.great_hit_window < nomod.great_hit_window);
    assert!(dt.speed > nomod.speed);
}

#[test]
fn longer_prefixes_never_lose_stars() {
    let objects = common::circle_map(48, 150.0);

    let mut prev = 0.0;

    for take in [1, 8, 16, 32, 48] {
        let attrs = Difficulty::new()
            .passed_objects(take)
            .calculate(&objects)
            .unwrap();

        assert!(
            attrs.stars >= prev,
            "stars dropped from {prev} to {} at {take} objects",
            attrs.stars,
        );
        prev = attrs.stars;
    }
}

#[test]
fn strains_cover_the_whole_map() {
    let objects = common::circle_map(64, 150.0);
    let strains = Difficulty::new().strains(&objects).unwrap();

    assert!((strains.section_length - 400.0).abs() < f64::EPSILON);
    assert!(!strains.aim.is_empty());
    assert_eq!(strains.aim.len(), strains.speed.len());
    assert_eq!(strains.aim.len(), strains.aim_no_sliders.len());

    // 64 objects at 150ms each span roughly 9.45 seconds.
    let expected_sections = (64.0 * 150.0 / 400.0) as usize;
    assert!(strains.aim.len() >= expected_sections.saturating_sub(1));
}
