use nova_pp::model::hit_object::{
    HitObject, HitObjects, NestedObject, NestedObjectKind, Pos, Slider,
};

/// An alternating two-column jump pattern of circles.
pub fn circle_map(n: usize, spacing_ms: f64) -> HitObjects {
    let objects = (0..n)
        .map(|i| {
            HitObject::circle(
                Pos::new(120.0 + 160.0 * (i % 2) as f32, 180.0 + 10.0 * (i % 3) as f32),
                i as f64 * spacing_ms,
            )
        })
        .collect();

    HitObjects::new(objects).unwrap()
}

/// A straight horizontal slider with one tick and a tail.
pub fn slider(x: f32, y: f32, start_time: f64, len: f32, duration: f64) -> HitObject {
    let nested = vec![
        NestedObject {
            pos: Pos::new(x + len / 2.0, y),
            start_time: start_time + duration / 2.0,
            kind: NestedObjectKind::Tick,
        },
        NestedObject {
            pos: Pos::new(x + len, y),
            start_time: start_time + duration,
            kind: NestedObjectKind::Tail,
        },
    ];

    HitObject::slider(
        Pos::new(x, y),
        start_time,
        Slider::new(duration, f64::from(len), nested),
    )
}

/// Small mixed map touching every object kind: two circles, a slider, and a
/// trailing spinner.
pub fn mixed_map() -> HitObjects {
    let objects = vec![
        HitObject::circle(Pos::new(100.0, 150.0), 0.0),
        HitObject::circle(Pos::new(220.0, 150.0), 200.0),
        slider(220.0, 250.0, 400.0, 120.0, 180.0),
        HitObject::spinner(Pos::new(256.0, 192.0), 800.0, 1600.0),
    ];

    HitObjects::new(objects).unwrap()
}
