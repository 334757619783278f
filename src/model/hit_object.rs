pub use crate::util::pos::Pos;

use crate::error::Error;

/// A single beatmap event, as produced by the upstream beatmap loader.
///
/// Positions of slider ticks, repeats, and tails are expected to be already
/// evaluated by the loader's curve machinery; this crate never touches curve
/// geometry itself.
#[derive(Clone, Debug, PartialEq)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: HitObjectKind,
    /// Monotonic insertion counter, used as tie-breaker so that objects
    /// sharing the same start time keep their original relative order.
    pub(crate) sort_index: usize,
    pub(crate) stack_height: i32,
    pub(crate) stack_offset: Pos,
}

impl HitObject {
    pub fn circle(pos: Pos, start_time: f64) -> Self {
        Self::new(pos, start_time, HitObjectKind::Circle)
    }

    pub fn slider(pos: Pos, start_time: f64, slider: Slider) -> Self {
        Self::new(pos, start_time, HitObjectKind::Slider(slider))
    }

    pub fn spinner(pos: Pos, start_time: f64, end_time: f64) -> Self {
        Self::new(pos, start_time, HitObjectKind::Spinner { end_time })
    }

    fn new(pos: Pos, start_time: f64, kind: HitObjectKind) -> Self {
        Self {
            pos,
            start_time,
            kind,
            sort_index: 0,
            stack_height: 0,
            stack_offset: Pos::default(),
        }
    }

    pub fn end_time(&self) -> f64 {
        match self.kind {
            HitObjectKind::Circle => self.start_time,
            HitObjectKind::Slider(ref slider) => slider.end_time(self.start_time),
            HitObjectKind::Spinner { end_time } => end_time,
        }
    }

    pub fn end_pos(&self) -> Pos {
        match self.kind {
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => self.pos,
            HitObjectKind::Slider(ref slider) => {
                slider.tail().map_or(self.pos, |nested| nested.pos)
            }
        }
    }

    pub fn stacked_pos(&self) -> Pos {
        self.pos + self.stack_offset
    }

    pub fn stacked_end_pos(&self) -> Pos {
        self.end_pos() + self.stack_offset
    }

    /// Time the cursor is forced to keep following a slider, i.e. up to its
    /// last nested event rather than its nominal end.
    pub fn lazy_travel_time(&self) -> f64 {
        match self.kind {
            HitObjectKind::Circle | HitObjectKind::Spinner { .. } => 0.0,
            HitObjectKind::Slider(ref slider) => slider
                .nested_objects
                .last()
                .map_or(0.0, |nested| nested.start_time - self.start_time),
        }
    }

    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, HitObjectKind::Circle)
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, HitObjectKind::Slider(_))
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, HitObjectKind::Spinner { .. })
    }

    fn validate(&self, idx: usize) -> Result<(), Error> {
        if !self.start_time.is_finite() {
            return Err(Error::InvalidObject {
                idx,
                reason: "non-finite start time",
            });
        }

        match self.kind {
            HitObjectKind::Circle => Ok(()),
            HitObjectKind::Slider(ref slider) => {
                if !(slider.span_duration.is_finite() && slider.span_duration > 0.0) {
                    Err(Error::InvalidObject {
                        idx,
                        reason: "slider span duration must be positive",
                    })
                } else {
                    Ok(())
                }
            }
            HitObjectKind::Spinner { end_time } => {
                if end_time < self.start_time {
                    Err(Error::InvalidObject {
                        idx,
                        reason: "spinner ends before it starts",
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HitObjectKind {
    Circle,
    Slider(Slider),
    Spinner { end_time: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    /// Duration of a single one-way traversal of the path.
    pub span_duration: f64,
    /// Nominal length of the path in playfield pixels.
    pub pixel_len: f64,
    /// Ticks, repeats, and the tail, in scoring order, with absolute
    /// positions evaluated by the upstream curve machinery.
    pub nested_objects: Vec<NestedObject>,
    /// Cursor position after lazily following the slider; filled by the
    /// difficulty preparation pass.
    pub(crate) lazy_end_pos: Pos,
    /// Distance the cursor lazily travels along the slider; filled by the
    /// difficulty preparation pass.
    pub(crate) lazy_travel_dist: f32,
}

impl Slider {
    pub fn new(span_duration: f64, pixel_len: f64, nested_objects: Vec<NestedObject>) -> Self {
        Self {
            span_duration,
            pixel_len,
            nested_objects,
            lazy_end_pos: Pos::default(),
            lazy_travel_dist: 0.0,
        }
    }

    pub fn repeat_count(&self) -> usize {
        self.nested_objects
            .iter()
            .filter(|nested| matches!(nested.kind, NestedObjectKind::Repeat))
            .count()
    }

    pub fn span_count(&self) -> usize {
        self.repeat_count() + 1
    }

    pub fn end_time(&self, start_time: f64) -> f64 {
        start_time + self.span_count() as f64 * self.span_duration
    }

    pub fn tail(&self) -> Option<&NestedObject> {
        // The tail is not necessarily the last nested object, e.g. on very
        // short and fast buzz sliders.
        self.nested_objects
            .iter()
            .rfind(|nested| matches!(nested.kind, NestedObjectKind::Tail))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NestedObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedObjectKind,
}

impl NestedObject {
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, NestedObjectKind::Repeat)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NestedObjectKind {
    Tick,
    Repeat,
    Tail,
}

/// A validated, time-ordered sequence of [`HitObject`]s.
///
/// Construction fails if any object carries malformed timing; callers must
/// treat the whole load as failed, there are no partial results. After
/// construction the sequence is immutable; the stacking pass of a difficulty
/// calculation operates on its own working copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitObjects {
    pub(crate) objects: Vec<HitObject>,
}

impl HitObjects {
    pub fn new(mut objects: Vec<HitObject>) -> Result<Self, Error> {
        for (idx, h) in objects.iter_mut().enumerate() {
            h.sort_index = idx;

            if let Err(err) = h.validate(idx) {
                #[cfg(feature = "tracing")]
                tracing::error!("rejecting hit object list: {err}");

                return Err(err);
            }
        }

        // The loader already provides time-sorted objects but the strain
        // simulation relies on it, so enforce `(start_time, sort_index)` as
        // strict weak order here. `sort_index` keeps ties stable.
        objects.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then(a.sort_index.cmp(&b.sort_index))
        });

        Ok(Self { objects })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HitObject> {
        self.objects.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&HitObject> {
        self.objects.get(idx)
    }

    pub fn n_circles(&self) -> u32 {
        self.objects.iter().filter(|h| h.is_circle()).count() as u32
    }

    pub fn n_sliders(&self) -> u32 {
        self.objects.iter().filter(|h| h.is_slider()).count() as u32
    }

    pub fn n_spinners(&self) -> u32 {
        self.objects.iter().filter(|h| h.is_spinner()).count() as u32
    }

    /// Maximum achievable combo: one per object plus one per nested slider
    /// event.
    pub fn max_combo(&self) -> u32 {
        self.objects
            .iter()
            .map(|h| match h.kind {
                HitObjectKind::Slider(ref slider) => 1 + slider.nested_objects.len() as u32,
                _ => 1,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_span_slider() {
        let slider = Slider::new(0.0, 100.0, Vec::new());
        let objects = vec![HitObject::slider(Pos::new(0.0, 0.0), 500.0, slider)];

        assert!(matches!(
            HitObjects::new(objects),
            Err(Error::InvalidObject { idx: 0, .. })
        ));
    }

    #[test]
    fn rejects_backwards_spinner() {
        let objects = vec![HitObject::spinner(Pos::new(256.0, 192.0), 1000.0, 500.0)];

        assert!(matches!(
            HitObjects::new(objects),
            Err(Error::InvalidObject { idx: 0, .. })
        ));
    }

    #[test]
    fn equal_start_times_keep_insertion_order() {
        let objects = vec![
            HitObject::circle(Pos::new(0.0, 0.0), 100.0),
            HitObject::circle(Pos::new(1.0, 0.0), 100.0),
            HitObject::circle(Pos::new(2.0, 0.0), 50.0),
        ];

        let objects = HitObjects::new(objects).unwrap();

        assert!((objects.get(0).unwrap().pos.x - 2.0).abs() < f32::EPSILON);
        assert!((objects.get(1).unwrap().pos.x - 0.0).abs() < f32::EPSILON);
        assert!((objects.get(2).unwrap().pos.x - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn max_combo_counts_nested_events() {
        let nested = vec![
            NestedObject {
                pos: Pos::new(50.0, 0.0),
                start_time: 550.0,
                kind: NestedObjectKind::Tick,
            },
            NestedObject {
                pos: Pos::new(100.0, 0.0),
                start_time: 600.0,
                kind: NestedObjectKind::Tail,
            },
        ];

        let objects = HitObjects::new(vec![
            HitObject::circle(Pos::new(0.0, 0.0), 0.0),
            HitObject::slider(Pos::new(0.0, 0.0), 500.0, Slider::new(100.0, 100.0, nested)),
        ])
        .unwrap();

        assert_eq!(objects.max_combo(), 4);
    }
}
